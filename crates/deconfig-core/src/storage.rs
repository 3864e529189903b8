//! The deconfig storage facade.
//!
//! [`DeconfigStorage`] wraps an export store and a live store and is itself a
//! [`DocumentStore`]: writes are redacted on their way to the export store,
//! reads are restored from the live store. Everything else is passed through.

use crate::cache::DeletedCache;
use crate::split::{join, split, Split};
use crate::{hide, unhide, DeconfigError, Result};
use deconfig_store::{Document, DocumentStore, StoreError};
use std::any::Any;
use std::cell::RefCell;
use tracing::{debug, warn};

/// Export store wrapper hiding fields named by each record's specification.
///
/// Holds per-instance mutable state (the deleted-value cache) without
/// locking; use one instance per thread.
pub struct DeconfigStorage {
    storage: Box<dyn DocumentStore>,
    active: Box<dyn DocumentStore>,
    deleted: RefCell<DeletedCache>,
}

impl std::fmt::Debug for DeconfigStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeconfigStorage")
            .field("collection", &self.storage.collection_name())
            .field("pending_deletes", &self.deleted.borrow().len())
            .finish()
    }
}

impl DeconfigStorage {
    /// Wrap `storage` (export), restoring hidden fields from `active` (live).
    pub fn new(storage: Box<dyn DocumentStore>, active: Box<dyn DocumentStore>) -> Self {
        Self {
            storage,
            active,
            deleted: RefCell::new(DeletedCache::new()),
        }
    }

    /// Convenience constructor boxing concrete stores.
    pub fn from_stores<E, L>(storage: E, active: L) -> Self
    where
        E: DocumentStore + 'static,
        L: DocumentStore + 'static,
    {
        Self::new(Box::new(storage), Box::new(active))
    }

    /// The wrapped export store.
    pub fn export_store(&self) -> &dyn DocumentStore {
        self.storage.as_ref()
    }

    /// The live store hidden fields are restored from.
    pub fn live_store(&self) -> &dyn DocumentStore {
        self.active.as_ref()
    }

    /// Number of deleted records whose payload is waiting for a rewrite.
    #[cfg(test)]
    fn pending_deletes(&self) -> usize {
        self.deleted.borrow().len()
    }

    /// Read a record, failing if a strict hidden field leaked into the export store.
    pub fn read(&self, name: &str) -> Result<Option<Document>> {
        self.read_checked(name, true)
    }

    /// Read a record without leak detection, for diagnosis and repair.
    pub fn read_raw(&self, name: &str) -> Result<Option<Document>> {
        self.read_checked(name, false)
    }

    fn read_checked(&self, name: &str, verify: bool) -> Result<Option<Document>> {
        let Some(data) = self.storage.read(name)? else {
            return Ok(None);
        };
        let Split { spec, payload, lax } = split(data);
        let Some(spec) = spec else {
            return Ok(Some(payload));
        };

        // The live record carries its own marker; only its data is a source.
        let active = self.active.read(name)?.map(|doc| split(doc).payload);
        let restored = unhide(&spec, payload, active.as_ref(), verify, lax).map_err(|found| {
            warn!(name, path = %found.path, "Hidden configuration found in export store");
            DeconfigError::ConsistencyViolation {
                name: name.to_string(),
                path: found.path,
            }
        })?;

        debug!(name, verify, lax, "Restored hidden configuration");
        Ok(Some(join(Some(spec), restored, lax)))
    }

    /// Write a record to the export store with hidden fields removed.
    pub fn write(&self, name: &str, data: &Document) -> Result<bool> {
        // Consumed even when the new document has no specification.
        let cached = self.deleted.borrow_mut().take(name);

        let Split { spec, payload, lax } = split(data.clone());
        let Some(spec) = spec else {
            return Ok(self.storage.write(name, data)?);
        };

        let prior = match cached {
            Some(snapshot) => {
                debug!(name, "Using payload captured before delete");
                Some(snapshot)
            }
            None => self.storage.read(name)?.map(|doc| split(doc).payload),
        };

        let hidden = hide(&spec, payload, prior.as_ref(), lax);
        debug!(name, lax, "Hid configuration before export");
        Ok(self.storage.write(name, &join(Some(spec), hidden, lax))?)
    }

    /// Delete a record, remembering its payload for a following rewrite.
    pub fn delete(&self, name: &str) -> Result<bool> {
        if let Some(data) = self.storage.read(name)? {
            let Split { spec, payload, .. } = split(data);
            if spec.is_some() {
                self.deleted.borrow_mut().remember(name, payload);
                debug!(name, "Captured payload before delete");
            }
        }
        Ok(self.storage.delete(name)?)
    }

    /// Delete every record under `prefix` through [`DeconfigStorage::delete`].
    pub fn delete_all(&self, prefix: &str) -> Result<bool> {
        let mut success = true;
        for name in self.storage.list_all(prefix)? {
            success &= self.delete(&name)?;
        }
        Ok(success)
    }

    /// A facade over the same collection of both stores, with its own cache.
    pub fn collection(&self, collection: &str) -> DeconfigStorage {
        DeconfigStorage::new(
            self.storage.create_collection(collection),
            self.active.create_collection(collection),
        )
    }
}

impl DocumentStore for DeconfigStorage {
    fn exists(&self, name: &str) -> deconfig_store::Result<bool> {
        self.storage.exists(name)
    }

    fn read(&self, name: &str) -> deconfig_store::Result<Option<Document>> {
        DeconfigStorage::read(self, name).map_err(StoreError::from)
    }

    fn write(&self, name: &str, data: &Document) -> deconfig_store::Result<bool> {
        DeconfigStorage::write(self, name, data).map_err(StoreError::from)
    }

    fn delete(&self, name: &str) -> deconfig_store::Result<bool> {
        DeconfigStorage::delete(self, name).map_err(StoreError::from)
    }

    fn rename(&self, name: &str, new_name: &str) -> deconfig_store::Result<bool> {
        self.storage.rename(name, new_name)
    }

    fn encode(&self, data: &Document) -> deconfig_store::Result<Vec<u8>> {
        self.storage.encode(data)
    }

    fn decode(&self, raw: &[u8]) -> deconfig_store::Result<Document> {
        self.storage.decode(raw)
    }

    fn list_all(&self, prefix: &str) -> deconfig_store::Result<Vec<String>> {
        self.storage.list_all(prefix)
    }

    fn delete_all(&self, prefix: &str) -> deconfig_store::Result<bool> {
        DeconfigStorage::delete_all(self, prefix).map_err(StoreError::from)
    }

    fn create_collection(&self, collection: &str) -> Box<dyn DocumentStore> {
        Box::new(self.collection(collection))
    }

    fn all_collection_names(&self) -> deconfig_store::Result<Vec<String>> {
        self.storage.all_collection_names()
    }

    fn collection_name(&self) -> &str {
        self.storage.collection_name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deconfig_store::MemoryStore;
    use serde_json::{json, Value};

    fn doc(value: Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_document_without_spec_passes_through() {
        let export = MemoryStore::new();
        let storage = DeconfigStorage::from_stores(export.clone(), MemoryStore::new());

        let data = doc(json!({"simple data": "beta"}));
        assert!(storage.write("test.key", &data).unwrap());
        assert_eq!(export.read("test.key").unwrap(), Some(data.clone()));
        assert_eq!(storage.read("test.key").unwrap(), Some(data));
    }

    #[test]
    fn test_missing_record_reads_none() {
        let storage = DeconfigStorage::from_stores(MemoryStore::new(), MemoryStore::new());
        assert_eq!(storage.read("nope").unwrap(), None);
        assert_eq!(storage.read_raw("nope").unwrap(), None);
    }

    #[test]
    fn test_delete_without_spec_not_cached() {
        let export = MemoryStore::with_documents([("plain", doc(json!({"a": 1})))]);
        let storage = DeconfigStorage::from_stores(export, MemoryStore::new());
        assert!(storage.delete("plain").unwrap());
        assert_eq!(storage.pending_deletes(), 0);
    }

    #[test]
    fn test_write_consumes_cache_entry() {
        let export = MemoryStore::with_documents([(
            "r",
            doc(json!({"_deconfig": {"@k": "x"}, "k": "v"})),
        )]);
        let storage = DeconfigStorage::from_stores(export, MemoryStore::new());

        storage.delete("r").unwrap();
        assert_eq!(storage.pending_deletes(), 1);
        storage.write("r", &doc(json!({"other": 1}))).unwrap();
        assert_eq!(storage.pending_deletes(), 0);
    }

    #[test]
    fn test_trait_read_maps_violation() {
        let export = MemoryStore::with_documents([(
            "leaky",
            doc(json!({"_deconfig": "true", "something": "lala"})),
        )]);
        let storage = DeconfigStorage::from_stores(export, MemoryStore::new());
        let store: &dyn DocumentStore = &storage;

        match store.read("leaky") {
            Err(StoreError::HiddenConfiguration { name, path }) => {
                assert_eq!(name, "leaky");
                assert_eq!(path, crate::RECORD_PATH);
            }
            other => panic!("expected hidden configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_collection_has_independent_cache() {
        let export = MemoryStore::new();
        export
            .collection("language.fr")
            .write("r", &doc(json!({"_deconfig": {"@k": "x"}, "k": "v"})))
            .unwrap();
        let storage = DeconfigStorage::from_stores(export, MemoryStore::new());

        let fr = storage.collection("language.fr");
        fr.delete("r").unwrap();
        assert_eq!(fr.pending_deletes(), 1);
        assert_eq!(storage.pending_deletes(), 0);
        assert_eq!(fr.collection_name(), "language.fr");
    }
}
