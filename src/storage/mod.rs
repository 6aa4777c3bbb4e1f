//! Snapshot persistence module
//!
//! The session timer writes its full state on every mutation and reads it
//! back once at startup. Stores are deliberately forgiving on the read side:
//! anything that cannot be loaded is reported as "no snapshot" and the timer
//! cold-starts.

pub mod file;
pub mod memory;
pub mod snapshot;

// Re-export main types
pub use file::FileStore;
pub use memory::MemoryStore;
pub use snapshot::{Snapshot, SNAPSHOT_VERSION};

/// Storage backend for the persisted session snapshot.
///
/// A store is owned by exactly one timer instance; no cross-instance
/// coordination is provided.
pub trait SnapshotStore: Send + Sync {
    /// Load the previously saved snapshot, or `None` if nothing usable exists.
    fn load(&self) -> Option<Snapshot>;

    /// Persist the snapshot, replacing any previous one.
    fn save(&self, snapshot: &Snapshot) -> Result<(), String>;
}
