//! File-backed snapshot store

use std::fs;
use std::path::PathBuf;

use tracing::{debug, warn};

use super::snapshot::{Snapshot, SNAPSHOT_VERSION};
use super::SnapshotStore;

/// Stores the snapshot as a single JSON document at a fixed path.
///
/// The whole snapshot is written in one `fs::write` call, so a reader never
/// observes a partially updated set of fields.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Option<Snapshot> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) => {
                debug!("No snapshot at {}: {}", self.path.display(), e);
                return None;
            }
        };

        let snapshot: Snapshot = match serde_json::from_slice(&data) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("Discarding unreadable snapshot at {}: {}", self.path.display(), e);
                return None;
            }
        };

        if snapshot.version != SNAPSHOT_VERSION {
            warn!(
                "Discarding snapshot with unsupported version {} (expected {})",
                snapshot.version, SNAPSHOT_VERSION
            );
            return None;
        }

        Some(snapshot)
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), String> {
        let data = serde_json::to_vec(snapshot)
            .map_err(|e| format!("Failed to serialize snapshot: {}", e))?;

        fs::write(&self.path, data)
            .map_err(|e| format!("Failed to write snapshot to {}: {}", self.path.display(), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("insert-coin-{}-{}.json", name, std::process::id()))
    }

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            time_remaining: 780,
            quarters_used: 1,
            lost_quarters: 0,
            last_quarter_timestamp: None,
            last_quarter_time_value: 900,
            saved_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn save_then_load_returns_the_same_snapshot() {
        let path = temp_path("roundtrip");
        let store = FileStore::new(path.clone());

        store.save(&sample_snapshot()).unwrap();
        assert_eq!(store.load(), Some(sample_snapshot()));

        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let store = FileStore::new(temp_path("missing-nonexistent"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn corrupt_file_loads_as_none() {
        let path = temp_path("corrupt");
        fs::write(&path, b"{ not json").unwrap();

        let store = FileStore::new(path.clone());
        assert_eq!(store.load(), None);

        let _ = fs::remove_file(path);
    }

    #[test]
    fn unsupported_version_loads_as_none() {
        let path = temp_path("version");
        let mut snapshot = sample_snapshot();
        snapshot.version = 99;
        fs::write(&path, serde_json::to_vec(&snapshot).unwrap()).unwrap();

        let store = FileStore::new(path.clone());
        assert_eq!(store.load(), None);

        let _ = fs::remove_file(path);
    }
}
