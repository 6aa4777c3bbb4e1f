//! Insert Coin - A state-managed HTTP server for arcade play-time sessions
//!
//! This library owns the quarter economy of an arcade session: inserted
//! quarters become seconds of playtime, a countdown drains the balance, and
//! abandonment accounting decides whether the most recent quarter survives a
//! shutdown. State is persisted on every mutation and restored with the
//! offline time reconciled.

pub mod api;
pub mod config;
pub mod state;
pub mod storage;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use state::{AppState, SessionTimer, TimerView};
pub use storage::{FileStore, MemoryStore, SnapshotStore};
pub use utils::{format_playtime, shutdown_signal};
