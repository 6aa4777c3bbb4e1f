//! Versioned snapshot schema for the persisted session state

use serde::{Deserialize, Serialize};

/// Current snapshot schema version. Snapshots carrying any other version are
/// discarded on load and the timer cold-starts.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Persisted session timer state, written on every mutation.
///
/// `availableQuarters` is deliberately absent: the quarter balance belongs to
/// the purchase collaborator and is re-credited after a restart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: u32,
    /// Playtime left, in seconds.
    pub time_remaining: u64,
    /// Quarters inserted and retained.
    pub quarters_used: u64,
    /// Quarters reclassified as abandoned.
    pub lost_quarters: u64,
    /// Insertion time of the pending quarter, if one is still at risk.
    pub last_quarter_timestamp: Option<i64>,
    /// Playtime value of the most recently inserted quarter, in seconds.
    pub last_quarter_time_value: u64,
    /// Wall-clock time this snapshot was written, epoch milliseconds.
    pub saved_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_serializes_with_wire_field_names() {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            time_remaining: 835,
            quarters_used: 2,
            lost_quarters: 1,
            last_quarter_timestamp: Some(1_700_000_000_000),
            last_quarter_time_value: 900,
            saved_at: 1_700_000_060_000,
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["timeRemaining"], 835);
        assert_eq!(json["quartersUsed"], 2);
        assert_eq!(json["lostQuarters"], 1);
        assert_eq!(json["lastQuarterTimestamp"], 1_700_000_000_000i64);
        assert_eq!(json["lastQuarterTimeValue"], 900);
        assert_eq!(json["savedAt"], 1_700_000_060_000i64);
        assert_eq!(json["version"], 1);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = Snapshot {
            version: SNAPSHOT_VERSION,
            time_remaining: 900,
            quarters_used: 1,
            lost_quarters: 0,
            last_quarter_timestamp: None,
            last_quarter_time_value: 900,
            saved_at: 42,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        let parsed: Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
