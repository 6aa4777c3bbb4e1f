//! In-memory snapshot store

use std::sync::Mutex;

use super::snapshot::Snapshot;
use super::SnapshotStore;

/// Keeps the snapshot in a mutex-guarded slot. Used by tests and by runs
/// that don't want any state to survive the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    slot: Mutex<Option<Snapshot>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemoryStore {
    fn load(&self) -> Option<Snapshot> {
        self.slot.lock().ok()?.clone()
    }

    fn save(&self, snapshot: &Snapshot) -> Result<(), String> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|e| format!("Failed to lock snapshot slot: {}", e))?;
        *slot = Some(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::snapshot::SNAPSHOT_VERSION;

    #[test]
    fn starts_empty_and_remembers_the_last_save() {
        let store = MemoryStore::new();
        assert_eq!(store.load(), None);

        let first = Snapshot {
            version: SNAPSHOT_VERSION,
            time_remaining: 900,
            quarters_used: 1,
            lost_quarters: 0,
            last_quarter_timestamp: Some(1_000),
            last_quarter_time_value: 900,
            saved_at: 1_000,
        };
        store.save(&first).unwrap();

        let second = Snapshot {
            time_remaining: 899,
            saved_at: 2_000,
            ..first
        };
        store.save(&second).unwrap();

        assert_eq!(store.load(), Some(second));
    }
}
