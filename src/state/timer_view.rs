//! Read-model of the session timer for channels and API responses

use serde::{Deserialize, Serialize};

use super::session_timer::SessionTimer;

/// Cheap cloneable view of the timer, published on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerView {
    pub active: bool,
    pub time_remaining_seconds: u64,
    pub quarters_used: u64,
    pub lost_quarters: u64,
    pub available_quarters: u64,
}

impl TimerView {
    /// View of an idle timer with no history.
    pub fn idle() -> Self {
        Self {
            active: false,
            time_remaining_seconds: 0,
            quarters_used: 0,
            lost_quarters: 0,
            available_quarters: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }
}

impl From<&SessionTimer> for TimerView {
    fn from(timer: &SessionTimer) -> Self {
        Self {
            active: timer.is_active(),
            time_remaining_seconds: timer.time_remaining_seconds,
            quarters_used: timer.quarters_used,
            lost_quarters: timer.quarters_lost,
            available_quarters: timer.available_quarters,
        }
    }
}

impl Default for TimerView {
    fn default() -> Self {
        Self::idle()
    }
}
