use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::database::filter::Condition;

pub mod connect;
pub mod filter;
pub mod idgen;
pub mod local;
pub mod models;
pub mod postgres;

pub type Fields = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Users,
    Bookings,
    PrintingOrders,
    CourseEnrollments,
    CafeteriaOrders,
    PaymentHistory,
    Settings,
}

impl Collection {
    pub const ALL: [Collection; 7] = [
        Collection::Users,
        Collection::Bookings,
        Collection::PrintingOrders,
        Collection::CourseEnrollments,
        Collection::CafeteriaOrders,
        Collection::PaymentHistory,
        Collection::Settings,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Users => "users",
            Collection::Bookings => "bookings",
            Collection::PrintingOrders => "printingOrders",
            Collection::CourseEnrollments => "courseEnrollments",
            Collection::CafeteriaOrders => "cafeteriaOrders",
            Collection::PaymentHistory => "paymentHistory",
            Collection::Settings => "settings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| StoreError::Invalid(format!("unknown collection '{s}'")))
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Diesel(#[from] diesel::result::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
    #[error("invalid document: {0}")]
    Invalid(String),
}

/// A stored JSON object. `fields` always carries `id`, `createdAt` and `updatedAt`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn from_value(value: Value) -> Result<Self, StoreError> {
        let fields = match value {
            Value::Object(fields) => fields,
            other => return Err(StoreError::Invalid(format!("expected an object, got {other}"))),
        };
        let id = match fields.get("id") {
            Some(Value::String(id)) if !id.is_empty() => id.clone(),
            _ => return Err(StoreError::Invalid("document without id".to_string())),
        };
        Ok(Self { id, fields })
    }

    /// Reads a possibly dotted path such as `options.urgency`.
    pub fn get(&self, path: &str) -> Option<&Value> {
        filter::lookup(&self.fields, path)
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(Value::Object(self.fields.clone()))?)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

pub fn to_fields<T: Serialize>(record: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        other => Err(StoreError::Invalid(format!("expected an object, got {other}"))),
    }
}

pub fn timestamp(now: DateTime<Utc>) -> Value {
    Value::String(now.to_rfc3339_opts(SecondsFormat::Millis, true))
}

// keeps a caller supplied id, generates one otherwise
pub(crate) fn stamp_new(fields: &mut Fields, now: DateTime<Utc>) -> String {
    let id = match fields.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => idgen::next_id(),
    };
    fields.insert("id".to_string(), Value::String(id.clone()));
    fields.insert("createdAt".to_string(), timestamp(now));
    fields.insert("updatedAt".to_string(), timestamp(now));
    id
}

// shallow merge, `id` and `createdAt` are never overwritten
pub(crate) fn merge_patch(fields: &mut Fields, patch: Fields, now: DateTime<Utc>) {
    for (key, value) in patch {
        if key == "id" || key == "createdAt" {
            continue;
        }
        fields.insert(key, value);
    }
    fields.insert("updatedAt".to_string(), timestamp(now));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub collection: Collection,
    pub backend: &'static str,
}

impl Serialize for Collection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Document storage shared by every service. Implementations are chosen at
/// startup by [`connect::open_repository`].
pub trait Repository: Send + Sync {
    fn backend(&self) -> &'static str;

    fn create(&self, collection: Collection, fields: Fields) -> Result<Document, StoreError>;

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError>;

    fn query(&self, collection: Collection, conditions: &[Condition]) -> Result<Vec<Document>, StoreError>;

    /// Returns `false` when the document does not exist.
    fn update(&self, collection: Collection, id: &str, patch: Fields) -> Result<bool, StoreError>;

    fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError>;

    /// Equality filter on top-level fields.
    fn get_all(&self, collection: Collection, filter: &Fields) -> Result<Vec<Document>, StoreError> {
        let conditions: Vec<Condition> = filter
            .iter()
            .map(|(field, value)| Condition::eq(field, value.clone()))
            .collect();
        self.query(collection, &conditions)
    }

    fn stats(&self, collection: Collection) -> Result<Stats, StoreError> {
        Ok(Stats {
            total: self.query(collection, &[])?.len(),
            collection,
            backend: self.backend(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn fields(value: Value) -> Fields {
        match value {
            Value::Object(fields) => fields,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn test_collection_names() {
        for collection in Collection::ALL {
            assert_eq!(collection.as_str().parse::<Collection>().unwrap(), collection);
        }
        assert_eq!(Collection::PaymentHistory.to_string(), "paymentHistory");
        assert!("payments".parse::<Collection>().is_err());
    }

    #[test]
    fn test_stamp_new_keeps_supplied_id() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let mut doc = fields(json!({"id": "user-1", "name": "Lina"}));
        assert_eq!(stamp_new(&mut doc, now), "user-1");
        assert_eq!(doc["createdAt"], json!("2024-03-01T10:00:00.000Z"));
        assert_eq!(doc["updatedAt"], doc["createdAt"]);

        let mut doc = fields(json!({"name": "Omar"}));
        let id = stamp_new(&mut doc, now);
        assert!(!id.is_empty());
        assert_eq!(doc["id"], json!(id));
    }

    #[test]
    fn test_merge_patch_is_shallow() {
        let created = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        let mut doc = fields(json!({"name": "Lina", "options": {"a": 1, "b": 2}}));
        stamp_new(&mut doc, created);
        merge_patch(
            &mut doc,
            fields(json!({"id": "other", "options": {"a": 3}, "phone": "0790000000"})),
            later,
        );
        assert_ne!(doc["id"], json!("other"));
        assert_eq!(doc["options"], json!({"a": 3}));
        assert_eq!(doc["phone"], json!("0790000000"));
        assert_eq!(doc["createdAt"], json!("2024-03-01T10:00:00.000Z"));
        assert_eq!(doc["updatedAt"], json!("2024-03-02T10:00:00.000Z"));
    }

    #[test]
    fn test_document_requires_id() {
        assert!(Document::from_value(json!({"name": "x"})).is_err());
        assert!(Document::from_value(json!([1, 2])).is_err());
        let doc = Document::from_value(json!({"id": "a", "options": {"urgency": "express"}})).unwrap();
        assert_eq!(doc.get("options.urgency"), Some(&json!("express")));
    }
}
