use std::io::Write;
use std::path::PathBuf;

use monitor_core::snapshot::Snapshot;
use thiserror::Error;

/// Persistence failure. Transient: the scheduler logs it and retries on
/// the next cycle.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("status file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("status record encoding: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Durable store for exactly one snapshot record at a well-known path.
///
/// Writes go to a sibling temp file first, are synced, and renamed into
/// place, so a concurrent reader, or a restart after a crash, only ever
/// observes a fully-formed record. The
/// scheduler is the single writer; the HTTP publisher and the `status`
/// subcommand are readers.
#[derive(Debug, Clone)]
pub struct StatusStore {
    path: PathBuf,
}

impl StatusStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Atomically replaces the current record.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let bytes = serde_json::to_vec_pretty(snapshot)?;
        // Temp file must live in the same directory so the rename stays on
        // one filesystem.
        let tmp = self.path.with_extension("tmp");
        let mut file = std::fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        // Sync before the rename: a crash must not publish a truncated
        // record under the final name.
        file.sync_all()?;
        drop(file);
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Most recent persisted record, or `None` before the first save.
    pub fn load(&self) -> Result<Option<Snapshot>, PersistenceError> {
        match std::fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
