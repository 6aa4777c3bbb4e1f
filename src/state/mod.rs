//! State management module
//!
//! This module contains the session timer core and its service wrapper.

pub mod app_state;
pub mod session_timer;
pub mod timer_view;

// Re-export main types
pub use app_state::AppState;
pub use session_timer::{PendingQuarter, SessionTimer, ABANDON_WINDOW_SECONDS, QUARTER_VALUE_SECONDS};
pub use timer_view::TimerView;
