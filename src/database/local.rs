use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use crate::database::filter::{self, Condition};
use crate::database::{merge_patch, stamp_new, Collection, Document, Fields, Repository, StoreError};

type Collections = BTreeMap<String, Vec<Fields>>;

/// Keeps every collection as an array of JSON objects. With a path the whole
/// map is written to one JSON file after each mutation.
pub struct LocalStore {
    path: Option<PathBuf>,
    collections: Mutex<Collections>,
}

impl LocalStore {
    pub fn in_memory() -> Self {
        Self {
            path: None,
            collections: Mutex::new(Collections::new()),
        }
    }

    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let collections = match fs::read_to_string(&path) {
            Ok(raw) => parse_collections(&path, &raw),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!("local store {} does not exist yet, starting empty", path.display());
                Collections::new()
            }
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path: Some(path),
            collections: Mutex::new(collections),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Collections>, StoreError> {
        self.collections.lock().map_err(|_| StoreError::Poisoned)
    }

    /// Writes the map out. When that fails collection `name` is put back to
    /// `previous`, so memory never holds a change the file does not.
    fn commit(&self, collections: &mut Collections, name: &str, previous: Option<Vec<Fields>>) -> Result<(), StoreError> {
        let result = self.persist(collections);
        if let Err(e) = &result {
            warn!("local store write failed, reverting {name}: {e}");
            match previous {
                Some(docs) => collections.insert(name.to_string(), docs),
                None => collections.remove(name),
            };
        }
        result
    }

    // write to a sibling temp file first so a crash never leaves half a document
    fn persist(&self, collections: &Collections) -> Result<(), StoreError> {
        let path = match &self.path {
            Some(path) => path,
            None => return Ok(()),
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(collections)?)?;
        fs::rename(&tmp, path)?;
        Ok(())
    }
}

// unreadable collections read as empty instead of failing the whole store
fn parse_collections(path: &Path, raw: &str) -> Collections {
    let root = match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(root)) => root,
        Ok(_) | Err(_) => {
            warn!("local store {} is not a JSON object, starting empty", path.display());
            return Collections::new();
        }
    };
    let mut collections = Collections::new();
    for (name, value) in root {
        let docs = match value {
            Value::Array(items) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(fields) if fields.get("id").and_then(Value::as_str).is_some() => Some(fields),
                    _ => None,
                })
                .collect(),
            _ => {
                warn!("collection {name} in {} is not an array, reading it as empty", path.display());
                Vec::new()
            }
        };
        collections.insert(name, docs);
    }
    collections
}

fn document(fields: &Fields) -> Result<Document, StoreError> {
    Document::from_value(Value::Object(fields.clone()))
}

fn same_id(fields: &Fields, id: &str) -> bool {
    fields.get("id").and_then(Value::as_str) == Some(id)
}

impl Repository for LocalStore {
    fn backend(&self) -> &'static str {
        "local"
    }

    fn create(&self, collection: Collection, mut fields: Fields) -> Result<Document, StoreError> {
        let mut collections = self.lock()?;
        let name = collection.as_str();
        let previous = collections.get(name).cloned();
        let id = stamp_new(&mut fields, Utc::now());
        let docs = collections.entry(name.to_string()).or_default();
        match docs.iter_mut().find(|doc| same_id(doc, &id)) {
            Some(existing) => *existing = fields.clone(),
            None => docs.push(fields.clone()),
        }
        self.commit(&mut collections, name, previous)?;
        document(&fields)
    }

    fn get(&self, collection: Collection, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.lock()?;
        collections
            .get(collection.as_str())
            .and_then(|docs| docs.iter().find(|doc| same_id(doc, id)))
            .map(document)
            .transpose()
    }

    fn query(&self, collection: Collection, conditions: &[Condition]) -> Result<Vec<Document>, StoreError> {
        let collections = self.lock()?;
        collections
            .get(collection.as_str())
            .map(|docs| {
                docs.iter()
                    .filter(|doc| filter::matches_all(doc, conditions))
                    .map(document)
                    .collect()
            })
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    fn update(&self, collection: Collection, id: &str, patch: Fields) -> Result<bool, StoreError> {
        let mut collections = self.lock()?;
        let name = collection.as_str();
        let previous = collections.get(name).cloned();
        let doc = collections
            .get_mut(name)
            .and_then(|docs| docs.iter_mut().find(|doc| same_id(doc, id)));
        match doc {
            Some(doc) => merge_patch(doc, patch, Utc::now()),
            None => return Ok(false),
        }
        self.commit(&mut collections, name, previous)?;
        Ok(true)
    }

    fn delete(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let mut collections = self.lock()?;
        let name = collection.as_str();
        let previous = collections.get(name).cloned();
        let removed = match collections.get_mut(name) {
            Some(docs) => {
                let before = docs.len();
                docs.retain(|doc| !same_id(doc, id));
                before != docs.len()
            }
            None => false,
        };
        if removed {
            self.commit(&mut collections, name, previous)?;
        }
        Ok(removed)
    }
}
