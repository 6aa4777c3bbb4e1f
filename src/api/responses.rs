//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::TimerView;

/// Body of POST /quarters/credit, sent by the purchase collaborator after a
/// purchase settles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditRequest {
    pub count: u64,
}

/// API response structure for timer mutation endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerView,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: String, message: String, timer: TimerView) -> Self {
        Self {
            status,
            message,
            timestamp: Utc::now(),
            timer,
        }
    }

    /// A quarter was accepted and playtime added
    pub fn accepted(message: String, timer: TimerView) -> Self {
        Self::new("accepted".to_string(), message, timer)
    }

    /// The request was valid but declined (e.g. empty quarter balance)
    pub fn rejected(message: String, timer: TimerView) -> Self {
        Self::new("rejected".to_string(), message, timer)
    }
}

/// Status response with the full timer picture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub timer: TimerView,
    /// `M:SS` rendering of the playtime balance
    pub time_display: String,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
