use std::ops::DerefMut;

use chrono::{DateTime, Utc};
use diesel::r2d2::{ConnectionManager, Pool, PooledConnection};
use diesel::{Connection, ExpressionMethods, OptionalExtension, PgConnection, QueryDsl, RunQueryDsl};
use serde_json::Value;

use crate::database::filter::{self, Condition};
use crate::database::models::{DocumentRow, NewDocumentRow};
use crate::database::{merge_patch, stamp_new, Collection, Document, Fields, Repository, Stats, StoreError};
use crate::schema::documents::dsl;

pub type DbPool = Pool<ConnectionManager<PgConnection>>;

/// Stores every collection in the `documents` table, one jsonb row per document.
/// Conditions are evaluated in-process so both backends filter identically.
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<PooledConnection<ConnectionManager<PgConnection>>, StoreError> {
        Ok(self.pool.get()?)
    }
}

fn naive(now: DateTime<Utc>) -> chrono::NaiveDateTime {
    now.naive_utc()
}

impl Repository for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    fn create(&self, collection: Collection, mut fields: Fields) -> Result<Document, StoreError> {
        let mut pooled = self.conn()?;
        let conn = pooled.deref_mut();
        let now = Utc::now();
        let req_id = stamp_new(&mut fields, now);
        let req_data = Value::Object(fields);
        let row = NewDocumentRow {
            collection: collection.as_str(),
            id: req_id.as_str(),
            data: &req_data,
            created_at: naive(now),
            updated_at: naive(now),
        };
        // same id means replace, like the local store
        diesel::insert_into(dsl::documents)
            .values(&row)
            .on_conflict((dsl::collection, dsl::id))
            .do_update()
            .set((dsl::data.eq(&req_data), dsl::updated_at.eq(naive(now))))
            .execute(conn)?;
        Document::from_value(req_data)
    }

    fn get(&self, collection: Collection, req_id: &str) -> Result<Option<Document>, StoreError> {
        let mut pooled = self.conn()?;
        let conn = pooled.deref_mut();
        dsl::documents
            .filter(dsl::collection.eq(collection.as_str()))
            .filter(dsl::id.eq(req_id))
            .first::<DocumentRow>(conn)
            .optional()?
            .map(DocumentRow::into_document)
            .transpose()
    }

    fn query(&self, collection: Collection, conditions: &[Condition]) -> Result<Vec<Document>, StoreError> {
        let mut pooled = self.conn()?;
        let conn = pooled.deref_mut();
        let rows = dsl::documents
            .filter(dsl::collection.eq(collection.as_str()))
            .order((dsl::created_at.asc(), dsl::id.asc()))
            .load::<DocumentRow>(conn)?;
        rows.into_iter()
            .map(DocumentRow::into_document)
            .filter(|doc| match doc {
                Ok(doc) => filter::matches_all(&doc.fields, conditions),
                Err(_) => true,
            })
            .collect()
    }

    fn update(&self, collection: Collection, req_id: &str, patch: Fields) -> Result<bool, StoreError> {
        let mut pooled = self.conn()?;
        let conn = pooled.deref_mut();
        conn.transaction::<_, StoreError, _>(|conn| {
            // load the row and lock it until the merged data is written back
            let row = dsl::documents
                .filter(dsl::collection.eq(collection.as_str()))
                .filter(dsl::id.eq(req_id))
                .for_update()
                .first::<DocumentRow>(conn)
                .optional()?;
            let mut doc = match row {
                Some(row) => row.into_document()?,
                None => return Ok(false),
            };
            let now = Utc::now();
            merge_patch(&mut doc.fields, patch, now);
            diesel::update(
                dsl::documents
                    .filter(dsl::collection.eq(collection.as_str()))
                    .filter(dsl::id.eq(req_id)),
            )
            .set((dsl::data.eq(doc.into_value()), dsl::updated_at.eq(naive(now))))
            .execute(conn)?;
            Ok(true)
        })
    }

    fn delete(&self, collection: Collection, req_id: &str) -> Result<bool, StoreError> {
        let mut pooled = self.conn()?;
        let conn = pooled.deref_mut();
        let deleted = diesel::delete(
            dsl::documents
                .filter(dsl::collection.eq(collection.as_str()))
                .filter(dsl::id.eq(req_id)),
        )
        .execute(conn)?;
        Ok(deleted > 0)
    }

    fn stats(&self, collection: Collection) -> Result<Stats, StoreError> {
        let mut pooled = self.conn()?;
        let conn = pooled.deref_mut();
        let total = dsl::documents
            .filter(dsl::collection.eq(collection.as_str()))
            .count()
            .get_result::<i64>(conn)?;
        Ok(Stats {
            total: usize::try_from(total).unwrap_or_default(),
            collection,
            backend: self.backend(),
        })
    }
}
