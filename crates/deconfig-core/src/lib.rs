//! Hide and restore engine for exported configuration.
//!
//! Configuration records carry an optional hide specification under the
//! reserved key `_deconfig` (strict) or `@_deconfig` (lax). When a record is
//! written to the export store the fields named by the specification are
//! removed; when it is read back they are filled in from the live store.
//!
//! # Key Features
//!
//! - **Surgical hiding**: only fields named by the specification are touched,
//!   and parents left empty by hiding are pruned.
//! - **Strict and lax fields**: a strict field must come from the live store
//!   and is reported if found in the export store; a lax field (key prefixed
//!   with `@`) falls back to the last exported value.
//! - **Delete/rewrite safety**: the facade remembers pre-delete payloads so a
//!   full export regeneration keeps lax values.
//! - **Repair**: [`maintenance::remove_hidden`] rewrites records whose export
//!   copy leaks hidden values.
//!
//! # Example
//!
//! ```
//! use deconfig_core::DeconfigStorage;
//! use deconfig_store::{DocumentStore, MemoryStore};
//! use serde_json::json;
//!
//! let export = MemoryStore::new();
//! let live = MemoryStore::new();
//! let doc = json!({"_deconfig": {"password": "hide"}, "user": "admin", "password": "hunter2"});
//! let doc = doc.as_object().cloned().unwrap();
//! live.write("db.settings", &doc).unwrap();
//!
//! let storage = DeconfigStorage::from_stores(export.clone(), live);
//! storage.write("db.settings", &doc).unwrap();
//!
//! // The export copy has no password...
//! assert!(!export.read("db.settings").unwrap().unwrap().contains_key("password"));
//! // ...but reading through deconfig restores it from the live store.
//! assert_eq!(storage.read("db.settings").unwrap(), Some(doc));
//! ```

pub mod cache;
pub mod error;
pub mod hide;
pub mod maintenance;
pub mod split;
pub mod storage;
pub mod unhide;

pub use cache::DeletedCache;
pub use error::{DeconfigError, Result};
pub use hide::hide;
pub use maintenance::{check, regenerate, remove_hidden, ExportReport, SweepOutcome, SweepReport, Violation};
pub use split::{join, split, split_key, Marker, Split, KEY, LAX_KEY, LAX_PREFIX};
pub use storage::DeconfigStorage;
pub use unhide::{is_blank, unhide, HiddenValueFound, RECORD_PATH};
