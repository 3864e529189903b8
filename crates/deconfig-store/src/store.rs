//! The document-store contract.

use crate::{Document, Result};
use std::any::Any;

/// Name of the collection every store starts in.
pub const DEFAULT_COLLECTION: &str = "";

/// A named-record store, optionally partitioned into collections.
///
/// Receivers are `&self`; backends that mutate shared state use interior
/// mutability so that collection handles can share one backing store.
pub trait DocumentStore {
    /// Whether a record exists.
    fn exists(&self, name: &str) -> Result<bool>;

    /// Read a record, `None` when it does not exist.
    fn read(&self, name: &str) -> Result<Option<Document>>;

    /// Read several records, skipping the ones that do not exist.
    ///
    /// Results keep the order of `names`.
    fn read_multiple(&self, names: &[String]) -> Result<Vec<(String, Document)>> {
        let mut list = Vec::with_capacity(names.len());
        for name in names {
            if let Some(data) = self.read(name)? {
                list.push((name.clone(), data));
            }
        }
        Ok(list)
    }

    /// Write a record, replacing any previous value.
    fn write(&self, name: &str, data: &Document) -> Result<bool>;

    /// Delete a record. Returns `false` if it did not exist.
    fn delete(&self, name: &str) -> Result<bool>;

    /// Rename a record. Returns `false` if the source did not exist.
    fn rename(&self, name: &str, new_name: &str) -> Result<bool>;

    /// Serialize a document into the backend's wire format.
    fn encode(&self, data: &Document) -> Result<Vec<u8>>;

    /// Parse the backend's wire format into a document.
    fn decode(&self, raw: &[u8]) -> Result<Document>;

    /// Sorted names of every record starting with `prefix`.
    fn list_all(&self, prefix: &str) -> Result<Vec<String>>;

    /// Delete every record starting with `prefix`.
    fn delete_all(&self, prefix: &str) -> Result<bool>;

    /// A handle on the same backend scoped to another collection.
    fn create_collection(&self, collection: &str) -> Box<dyn DocumentStore>;

    /// Sorted names of every non-default collection holding records.
    fn all_collection_names(&self) -> Result<Vec<String>>;

    /// The collection this handle is scoped to.
    fn collection_name(&self) -> &str;

    /// Concrete-type access, used to recognise wrapping stores.
    fn as_any(&self) -> &dyn Any;
}
