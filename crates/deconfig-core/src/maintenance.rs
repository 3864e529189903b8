//! Whole-store maintenance: leak repair, leak check and export regeneration.

use crate::{DeconfigError, DeconfigStorage, Result};
use deconfig_store::{DocumentStore, DEFAULT_COLLECTION};
use std::collections::BTreeSet;
use tracing::{debug, error, info};

/// A record whose export copy held a strict hidden value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Collection of the record (`""` for the default collection).
    pub collection: String,
    /// Record name.
    pub name: String,
    /// Dotted path of the leaked field.
    pub path: String,
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.collection.is_empty() {
            write!(f, "{} ({})", self.name, self.path)
        } else {
            write!(f, "{}:{} ({})", self.collection, self.name, self.path)
        }
    }
}

/// Counters and findings of a walk over every collection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Collections visited, including the default one.
    pub collections: usize,
    /// Records read.
    pub records: usize,
    /// Records rewritten because they leaked hidden values.
    pub repaired: Vec<Violation>,
}

/// Result of [`remove_hidden`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The store is not a [`DeconfigStorage`]; nothing was done.
    Misconfigured,
    /// The sweep ran to completion.
    Completed(SweepReport),
}

/// Counters of [`regenerate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub collections: usize,
    /// Records written from the live store.
    pub written: usize,
    /// Export records with no live counterpart, now gone.
    pub removed: usize,
}

/// Default collection followed by every named collection of the export store.
fn collections(storage: &DeconfigStorage) -> Result<Vec<String>> {
    let mut names = vec![DEFAULT_COLLECTION.to_string()];
    names.extend(storage.export_store().all_collection_names()?);
    Ok(names)
}

/// Rewrite every record whose export copy leaks a hidden value.
///
/// Each record gets a verified read; on a violation the raw read is written
/// back, which re-applies hiding against the current live store. Stores that
/// are not a [`DeconfigStorage`] are logged and left alone.
pub fn remove_hidden(store: &dyn DocumentStore) -> Result<SweepOutcome> {
    let Some(storage) = store.as_any().downcast_ref::<DeconfigStorage>() else {
        error!(
            collection = store.collection_name(),
            "Export store is not wrapped by deconfig; nothing to repair"
        );
        return Ok(SweepOutcome::Misconfigured);
    };

    let mut report = SweepReport::default();
    for collection in collections(storage)? {
        let scoped = storage.collection(&collection);
        report.collections += 1;

        for name in scoped.list_all("")? {
            report.records += 1;
            match scoped.read(&name) {
                Ok(_) => {}
                Err(DeconfigError::ConsistencyViolation { name, path }) => {
                    if let Some(raw) = scoped.read_raw(&name)? {
                        scoped.write(&name, &raw)?;
                    }
                    info!(
                        collection = %collection,
                        name = %name,
                        path = %path,
                        "Removed hidden configuration"
                    );
                    report.repaired.push(Violation {
                        collection: collection.clone(),
                        name,
                        path,
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }

    info!(
        collections = report.collections,
        records = report.records,
        repaired = report.repaired.len(),
        "Hidden configuration sweep finished"
    );
    Ok(SweepOutcome::Completed(report))
}

/// Find every record whose export copy leaks a hidden value, changing nothing.
pub fn check(storage: &DeconfigStorage) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();
    for collection in collections(storage)? {
        let scoped = storage.collection(&collection);
        for name in scoped.list_all("")? {
            match scoped.read(&name) {
                Ok(_) => debug!(collection = %collection, name = %name, "Record clean"),
                Err(DeconfigError::ConsistencyViolation { name, path }) => {
                    violations.push(Violation {
                        collection: collection.clone(),
                        name,
                        path,
                    });
                }
                Err(e) => return Err(e),
            }
        }
    }
    Ok(violations)
}

/// Rebuild the export store from the live store.
///
/// For every collection known to either store, all export records are
/// deleted through the facade and every live record is written back through
/// it. Lax fields that only ever existed in the export store survive via the
/// facade's deleted-value cache.
pub fn regenerate(storage: &DeconfigStorage) -> Result<ExportReport> {
    let mut all = BTreeSet::new();
    all.extend(storage.export_store().all_collection_names()?);
    all.extend(storage.live_store().all_collection_names()?);

    let mut report = ExportReport::default();
    let ordered = std::iter::once(DEFAULT_COLLECTION.to_string())
        .chain(all.into_iter().filter(|name| name != DEFAULT_COLLECTION));

    for collection in ordered {
        let scoped = storage.collection(&collection);
        let (written, removed) = regenerate_collection(&scoped)?;
        report.collections += 1;
        report.written += written;
        report.removed += removed;
        debug!(
            collection = %collection,
            written,
            removed,
            "Regenerated export collection"
        );
    }

    info!(
        collections = report.collections,
        written = report.written,
        removed = report.removed,
        "Export regenerated"
    );
    Ok(report)
}

/// Rebuild one collection, returning the records written and removed.
fn regenerate_collection(scoped: &DeconfigStorage) -> Result<(usize, usize)> {
    let live_names = scoped.live_store().list_all("")?;
    let removed = scoped
        .export_store()
        .list_all("")?
        .iter()
        .filter(|name| !live_names.contains(*name))
        .count();

    scoped.delete_all("")?;
    let mut written = 0;
    for name in &live_names {
        if let Some(doc) = scoped.live_store().read(name)? {
            scoped.write(name, &doc)?;
            written += 1;
        }
    }
    Ok((written, removed))
}
