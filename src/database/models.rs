use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::database::{Document, StoreError};

#[derive(Queryable)]
pub struct DocumentRow {
    pub collection: String,
    pub id: String,
    pub data: serde_json::Value,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl DocumentRow {
    pub fn into_document(self) -> Result<Document, StoreError> {
        Document::from_value(self.data)
    }
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::documents)]
pub struct NewDocumentRow<'a> {
    pub collection: &'a str,
    pub id: &'a str,
    pub data: &'a serde_json::Value,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
