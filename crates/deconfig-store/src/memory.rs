//! In-process document store.
//!
//! All handles created from one [`MemoryStore`] (including the ones returned
//! by `create_collection`) share the same maps, so a record written through a
//! collection handle is visible to every other handle on that collection.

use crate::{into_document, Document, DocumentStore, Result, DEFAULT_COLLECTION};
use std::any::Any;
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

type Collections = BTreeMap<String, BTreeMap<String, Document>>;

/// Memory-backed store, encoding documents as JSON.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
    collection: String,
}

impl MemoryStore {
    /// Create an empty store scoped to the default collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records in the default collection.
    pub fn with_documents<I, S>(documents: I) -> Self
    where
        I: IntoIterator<Item = (S, Document)>,
        S: Into<String>,
    {
        let store = Self::new();
        {
            let mut collections = store.write_lock();
            let records = collections
                .entry(DEFAULT_COLLECTION.to_string())
                .or_default();
            for (name, doc) in documents {
                records.insert(name.into(), doc);
            }
        }
        store
    }

    /// Scoped handle with the concrete type.
    pub fn collection(&self, collection: &str) -> Self {
        Self {
            collections: Arc::clone(&self.collections),
            collection: collection.to_string(),
        }
    }

    fn read_lock(&self) -> RwLockReadGuard<'_, Collections> {
        self.collections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_lock(&self) -> RwLockWriteGuard<'_, Collections> {
        self.collections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl DocumentStore for MemoryStore {
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self
            .read_lock()
            .get(&self.collection)
            .is_some_and(|records| records.contains_key(name)))
    }

    fn read(&self, name: &str) -> Result<Option<Document>> {
        Ok(self
            .read_lock()
            .get(&self.collection)
            .and_then(|records| records.get(name))
            .cloned())
    }

    fn write(&self, name: &str, data: &Document) -> Result<bool> {
        self.write_lock()
            .entry(self.collection.clone())
            .or_default()
            .insert(name.to_string(), data.clone());
        Ok(true)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        Ok(self
            .write_lock()
            .get_mut(&self.collection)
            .is_some_and(|records| records.remove(name).is_some()))
    }

    fn rename(&self, name: &str, new_name: &str) -> Result<bool> {
        let mut collections = self.write_lock();
        let Some(records) = collections.get_mut(&self.collection) else {
            return Ok(false);
        };
        match records.remove(name) {
            Some(data) => {
                records.insert(new_name.to_string(), data);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn encode(&self, data: &Document) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(data)?)
    }

    fn decode(&self, raw: &[u8]) -> Result<Document> {
        into_document(serde_json::from_slice(raw)?)
    }

    fn list_all(&self, prefix: &str) -> Result<Vec<String>> {
        // BTreeMap keys come out sorted.
        Ok(self
            .read_lock()
            .get(&self.collection)
            .map(|records| {
                records
                    .keys()
                    .filter(|name| name.starts_with(prefix))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn delete_all(&self, prefix: &str) -> Result<bool> {
        if let Some(records) = self.write_lock().get_mut(&self.collection) {
            records.retain(|name, _| !name.starts_with(prefix));
        }
        Ok(true)
    }

    fn create_collection(&self, collection: &str) -> Box<dyn DocumentStore> {
        Box::new(self.collection(collection))
    }

    fn all_collection_names(&self) -> Result<Vec<String>> {
        Ok(self
            .read_lock()
            .iter()
            .filter(|(name, records)| name.as_str() != DEFAULT_COLLECTION && !records.is_empty())
            .map(|(name, _)| name.clone())
            .collect())
    }

    fn collection_name(&self) -> &str {
        &self.collection
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
