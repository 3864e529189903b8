//! Opening the configured document stores.

use crate::config::DeconfigConfig;
use deconfig_core::DeconfigStorage;
use deconfig_store::{DocumentStore, FileStore};
use tracing::debug;

/// The export store as the commands see it.
#[derive(Debug)]
pub enum Backend {
    /// Export store wrapped by the redaction facade.
    Deconfig(DeconfigStorage),
    /// Export store used as-is (`redaction: false`).
    Plain(FileStore),
}

impl Backend {
    /// Open file stores at the configured directories.
    pub fn open(config: &DeconfigConfig) -> Self {
        let export = FileStore::new(&config.export_dir);
        if !config.redaction {
            debug!(export_dir = %config.export_dir.display(), "Redaction disabled");
            return Backend::Plain(export);
        }

        debug!(
            export_dir = %config.export_dir.display(),
            live_dir = %config.live_dir.display(),
            "Opening deconfig storage"
        );
        let live = FileStore::new(&config.live_dir);
        Backend::Deconfig(DeconfigStorage::from_stores(export, live))
    }

    /// The export store through whatever wrapping is configured.
    pub fn store(&self) -> &dyn DocumentStore {
        match self {
            Backend::Deconfig(storage) => storage,
            Backend::Plain(store) => store,
        }
    }

    /// The redaction facade, when redaction is enabled.
    pub fn deconfig(&self) -> Option<&DeconfigStorage> {
        match self {
            Backend::Deconfig(storage) => Some(storage),
            Backend::Plain(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_redaction_selects_facade() {
        let config = DeconfigConfig {
            export_dir: PathBuf::from("/tmp/deconfig-export"),
            live_dir: PathBuf::from("/tmp/deconfig-live"),
            redaction: true,
        };
        let backend = Backend::open(&config);
        assert!(backend.deconfig().is_some());
        assert!(backend.store().as_any().is::<DeconfigStorage>());
    }

    #[test]
    fn test_plain_backend() {
        let config = DeconfigConfig {
            redaction: false,
            ..DeconfigConfig::default()
        };
        let backend = Backend::open(&config);
        assert!(backend.deconfig().is_none());
        assert!(backend.store().as_any().is::<FileStore>());
    }
}
