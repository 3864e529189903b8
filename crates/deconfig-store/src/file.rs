//! Directory-backed document store.
//!
//! Layout: record `system.site` of the default collection lives at
//! `<root>/system.site.yml`; collection `language.fr` maps to the
//! sub-directory `<root>/language/fr/`.

use crate::{into_document, Document, DocumentStore, Result, StoreError};
use std::any::Any;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Extension of record files.
pub const FILE_EXTENSION: &str = "yml";

/// Store keeping one YAML file per record.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    collection: String,
}

impl FileStore {
    /// Create a store rooted at `root`, scoped to the default collection.
    ///
    /// The directory is created lazily on first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            collection: String::new(),
        }
    }

    /// Scoped handle with the concrete type.
    pub fn collection(&self, collection: &str) -> Self {
        Self {
            root: self.root.clone(),
            collection: collection.to_string(),
        }
    }

    /// Root directory shared by all collections.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding this collection's records.
    ///
    /// Every dot-separated segment must be a plain directory name, so the
    /// result always stays under [`root`](Self::root).
    pub fn collection_dir(&self) -> Result<PathBuf> {
        if self.collection.is_empty() {
            return Ok(self.root.clone());
        }
        let mut dir = self.root.clone();
        for part in self.collection.split('.') {
            if !is_plain_segment(part) {
                return Err(StoreError::InvalidName(self.collection.clone()));
            }
            dir.push(part);
        }
        Ok(dir)
    }

    /// Path of the file backing `name`.
    pub fn file_path(&self, name: &str) -> Result<PathBuf> {
        if !is_plain_segment(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        Ok(self
            .collection_dir()?
            .join(format!("{name}.{FILE_EXTENSION}")))
    }
}

/// A single path component that cannot climb out of its parent.
fn is_plain_segment(part: &str) -> bool {
    !(part.is_empty() || part.contains(['/', '\\', '\0']) || part.starts_with('.'))
}

/// Record name of a file in a collection directory, if it is a record file.
fn record_name(path: &Path) -> Option<String> {
    if path.extension()? != FILE_EXTENSION || !path.is_file() {
        return None;
    }
    path.file_stem()?.to_str().map(str::to_string)
}

fn collect_collections(dir: &Path, prefix: &str, names: &mut Vec<String>) -> Result<()> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(StoreError::io(dir, e)),
    };

    for entry in entries {
        let entry = entry.map_err(|e| StoreError::io(dir, e))?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let Some(part) = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| is_plain_segment(n) && !n.contains('.'))
        else {
            continue;
        };
        let name = if prefix.is_empty() {
            part.to_string()
        } else {
            format!("{prefix}.{part}")
        };

        let has_records = fs::read_dir(&path)
            .map_err(|e| StoreError::io(&path, e))?
            .flatten()
            .any(|child| record_name(&child.path()).is_some());
        if has_records {
            names.push(name.clone());
        }
        collect_collections(&path, &name, names)?;
    }
    Ok(())
}

impl DocumentStore for FileStore {
    fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.file_path(name)?.is_file())
    }

    fn read(&self, name: &str) -> Result<Option<Document>> {
        let path = self.file_path(name)?;
        match fs::read(&path) {
            Ok(raw) => {
                trace!(path = %path.display(), bytes = raw.len(), "Read record file");
                self.decode(&raw).map(Some)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn write(&self, name: &str, data: &Document) -> Result<bool> {
        let path = self.file_path(name)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        let raw = self.encode(data)?;
        fs::write(&path, &raw).map_err(|e| StoreError::io(&path, e))?;
        debug!(path = %path.display(), bytes = raw.len(), "Wrote record file");
        Ok(true)
    }

    fn delete(&self, name: &str) -> Result<bool> {
        let path = self.file_path(name)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Deleted record file");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(path, e)),
        }
    }

    fn rename(&self, name: &str, new_name: &str) -> Result<bool> {
        let from = self.file_path(name)?;
        let to = self.file_path(new_name)?;
        match fs::rename(&from, &to) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StoreError::io(from, e)),
        }
    }

    fn encode(&self, data: &Document) -> Result<Vec<u8>> {
        Ok(serde_yaml::to_string(data)?.into_bytes())
    }

    fn decode(&self, raw: &[u8]) -> Result<Document> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Document::new());
        }
        into_document(serde_yaml::from_slice(raw)?)
    }

    fn list_all(&self, prefix: &str) -> Result<Vec<String>> {
        let dir = self.collection_dir()?;
        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(dir, e)),
        };

        let mut names = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::io(&dir, e))?;
            if let Some(name) = record_name(&entry.path()) {
                if name.starts_with(prefix) {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }

    fn delete_all(&self, prefix: &str) -> Result<bool> {
        let mut success = true;
        for name in self.list_all(prefix)? {
            success &= self.delete(&name)?;
        }
        Ok(success)
    }

    fn create_collection(&self, collection: &str) -> Box<dyn DocumentStore> {
        Box::new(self.collection(collection))
    }

    fn all_collection_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        collect_collections(&self.root, "", &mut names)?;
        names.sort();
        Ok(names)
    }

    fn collection_name(&self) -> &str {
        &self.collection
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
