//! Payloads of records deleted during this run.
//!
//! A full export regeneration deletes every record and writes it again. The
//! rewrite needs the previously exported payload to keep lax fields, but by
//! then the export store no longer has it. The facade therefore snapshots the
//! payload on delete and hands it to the next write of the same name.

use deconfig_store::Document;
use std::collections::HashMap;

/// Pre-delete payloads keyed by record name, consumed once.
#[derive(Debug, Clone, Default)]
pub struct DeletedCache {
    entries: HashMap<String, Document>,
}

impl DeletedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember the payload of a record about to be deleted.
    ///
    /// A later delete of the same name replaces the earlier snapshot.
    pub fn remember(&mut self, name: impl Into<String>, payload: Document) {
        self.entries.insert(name.into(), payload);
    }

    /// Take the snapshot for `name`, leaving nothing behind.
    pub fn take(&mut self, name: &str) -> Option<Document> {
        self.entries.remove(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
