//! Document storage for deconfig.
//!
//! This crate defines the contract every configuration store implements
//! ([`DocumentStore`]) and ships two backends:
//!
//! - [`MemoryStore`]: in-process maps, shared between collection handles.
//! - [`FileStore`]: one YAML file per record, one sub-directory per collection.
//!
//! Records are named with dotted strings (`system.site`) and hold a
//! [`Document`], an ordered mapping of string keys to JSON-shaped values.
//!
//! # Example
//!
//! ```
//! use deconfig_store::{DocumentStore, MemoryStore};
//! use serde_json::json;
//!
//! let store = MemoryStore::new();
//! let doc = json!({"name": "example"}).as_object().cloned().unwrap();
//! store.write("system.site", &doc).unwrap();
//! assert!(store.exists("system.site").unwrap());
//! ```

pub mod document;
pub mod error;
pub mod file;
pub mod memory;
pub mod store;

pub use document::{into_document, Document};
pub use error::{Result, StoreError};
pub use file::{FileStore, FILE_EXTENSION};
pub use memory::MemoryStore;
pub use store::{DocumentStore, DEFAULT_COLLECTION};
