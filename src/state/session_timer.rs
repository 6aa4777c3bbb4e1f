//! Arcade session timer state machine
//!
//! A quarter buys a fixed block of playtime. The timer drains one second per
//! tick, remembers the most recently inserted quarter while it is inside its
//! abandonment risk window, and can rebuild itself from a persisted snapshot
//! with the offline time already subtracted.
//!
//! Every operation takes the current wall-clock time as an explicit
//! epoch-millisecond argument, so the machine is fully deterministic under
//! test and never reads a clock itself.

use crate::storage::snapshot::{Snapshot, SNAPSHOT_VERSION};

/// Playtime granted by one quarter, in seconds (15 minutes).
pub const QUARTER_VALUE_SECONDS: u64 = 900;

/// How long a freshly inserted quarter stays at risk of being reclassified
/// as abandoned, in seconds.
pub const ABANDON_WINDOW_SECONDS: i64 = 60;

/// The most recently inserted quarter, tracked until it survives the
/// abandonment window or the process ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuarter {
    pub inserted_at_ms: i64,
    pub value_seconds: u64,
}

/// Authoritative owner of the play-time balance and the quarter accounting.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    /// Playtime left, decremented once per tick while positive.
    pub time_remaining_seconds: u64,
    /// Quarters inserted and retained.
    pub quarters_used: u64,
    /// Quarters reclassified as abandoned.
    pub quarters_lost: u64,
    /// Externally supplied balance of quarters not yet inserted. Owned by
    /// the purchase collaborator, mirrored here only to gate insertion.
    pub available_quarters: u64,
    pub pending_quarter: Option<PendingQuarter>,
}

/// Whole seconds from `then_ms` to `now_ms`, rounded toward negative
/// infinity.
fn seconds_since(now_ms: i64, then_ms: i64) -> i64 {
    (now_ms - then_ms).div_euclid(1000)
}

impl SessionTimer {
    /// Fresh state: no playtime, no history, no balance.
    pub fn new() -> Self {
        Self {
            time_remaining_seconds: 0,
            quarters_used: 0,
            quarters_lost: 0,
            available_quarters: 0,
            pending_quarter: None,
        }
    }

    /// Rebuild the timer from a persisted snapshot, draining the playtime
    /// that elapsed while no process was running. A missing snapshot yields
    /// fresh state.
    pub fn restore(snapshot: Option<Snapshot>, now_ms: i64) -> Self {
        let Some(snap) = snapshot else {
            return Self::new();
        };

        let elapsed = seconds_since(now_ms, snap.saved_at).max(0) as u64;
        let mut timer = Self {
            time_remaining_seconds: snap.time_remaining.saturating_sub(elapsed),
            quarters_used: snap.quarters_used,
            quarters_lost: snap.lost_quarters,
            available_quarters: 0,
            pending_quarter: None,
        };

        if let Some(inserted_at_ms) = snap.last_quarter_timestamp {
            let since = seconds_since(now_ms, inserted_at_ms);
            // Inside the risk window the quarter stays pending. Between the
            // window and the full quarter value it is cleared as safe with
            // no penalty. Note the termination path checks the 60s threshold
            // alone; the 900s upper bound exists only on this path.
            if since < ABANDON_WINDOW_SECONDS || since >= QUARTER_VALUE_SECONDS as i64 {
                timer.pending_quarter = Some(PendingQuarter {
                    inserted_at_ms,
                    value_seconds: snap.last_quarter_time_value,
                });
            }
        }

        timer
    }

    /// The timer is active while any playtime remains.
    pub fn is_active(&self) -> bool {
        self.time_remaining_seconds > 0
    }

    /// Drain one second of playtime, floored at zero.
    pub fn tick(&mut self) {
        self.time_remaining_seconds = self.time_remaining_seconds.saturating_sub(1);
    }

    /// Spend one quarter from the mirrored balance. Returns `false` with no
    /// state change when the balance is empty; this is the only way the
    /// playtime balance ever increases.
    pub fn insert_quarter(&mut self, now_ms: i64) -> bool {
        if self.available_quarters == 0 {
            return false;
        }

        self.available_quarters -= 1;
        self.quarters_used += 1;
        self.time_remaining_seconds += QUARTER_VALUE_SECONDS;
        self.pending_quarter = Some(PendingQuarter {
            inserted_at_ms: now_ms,
            value_seconds: QUARTER_VALUE_SECONDS,
        });
        true
    }

    /// Credit quarters supplied by the purchase collaborator.
    pub fn credit_quarters(&mut self, count: u64) {
        self.available_quarters += count;
    }

    /// Foreground-restore check: a pending quarter that has outlived its
    /// risk window is cleared with no penalty. No-op otherwise.
    pub fn check_abandonment(&mut self, now_ms: i64) {
        if let Some(pending) = &self.pending_quarter {
            if seconds_since(now_ms, pending.inserted_at_ms) >= ABANDON_WINDOW_SECONDS {
                self.pending_quarter = None;
            }
        }
    }

    /// Termination check: a quarter still inside its risk window is
    /// reclassified as abandoned and its playtime revoked. Returns whether
    /// the penalty was applied; the caller must persist either way before
    /// the process exits.
    pub fn finalize_on_termination(&mut self, now_ms: i64) -> bool {
        let Some(pending) = self.pending_quarter.take() else {
            return false;
        };

        if seconds_since(now_ms, pending.inserted_at_ms) < ABANDON_WINDOW_SECONDS {
            self.quarters_lost += 1;
            self.time_remaining_seconds =
                self.time_remaining_seconds.saturating_sub(pending.value_seconds);
            true
        } else {
            false
        }
    }

    /// Produce the snapshot persisted after every mutation.
    pub fn snapshot(&self, now_ms: i64) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            time_remaining: self.time_remaining_seconds,
            quarters_used: self.quarters_used,
            lost_quarters: self.quarters_lost,
            last_quarter_timestamp: self.pending_quarter.as_ref().map(|p| p.inserted_at_ms),
            last_quarter_time_value: self
                .pending_quarter
                .as_ref()
                .map(|p| p.value_seconds)
                .unwrap_or(QUARTER_VALUE_SECONDS),
            saved_at: now_ms,
        }
    }
}

impl Default for SessionTimer {
    fn default() -> Self {
        Self::new()
    }
}
