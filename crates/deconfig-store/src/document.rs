//! The record body type shared by every store.

use crate::{Result, StoreError};
use serde_json::{Map, Value};

/// A configuration record body: an ordered mapping at the root.
pub type Document = Map<String, Value>;

/// Convert a decoded value into a document.
///
/// `null` (an empty file) decodes to an empty document; any other
/// non-mapping root is rejected.
pub fn into_document(value: Value) -> Result<Document> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Document::new()),
        _ => Err(StoreError::NotAMapping),
    }
}
