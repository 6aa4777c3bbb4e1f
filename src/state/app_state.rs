//! Main application state management

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::storage::SnapshotStore;

use super::{SessionTimer, TimerView};

/// Current wall-clock time as epoch milliseconds, the clock fed to the
/// session timer core.
fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Main application state: the session timer, its snapshot store, and the
/// channels that fan out timer changes to background tasks and observers.
pub struct AppState {
    /// The session timer core; every mutation goes through this lock.
    pub timer: Arc<Mutex<SessionTimer>>,
    /// Snapshot store, written synchronously with each mutation.
    pub store: Arc<dyn SnapshotStore>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
    /// Announces quarter insertions so the countdown task can wake up
    pub state_change_tx: broadcast::Sender<TimerView>,
    /// Carries the latest timer view for any observer
    pub timer_update_tx: watch::Sender<TimerView>,
    /// Keep the receiver alive to prevent channel closure
    pub _timer_update_rx: watch::Receiver<TimerView>,
}

impl AppState {
    /// Create the application state, restoring the timer from the store.
    /// Anything the store cannot load means a cold start.
    pub fn new(port: u16, host: String, store: Arc<dyn SnapshotStore>) -> Self {
        let now = now_ms();
        let snapshot = store.load();
        let had_snapshot = snapshot.is_some();
        let timer = SessionTimer::restore(snapshot, now);

        if had_snapshot {
            info!(
                "Restored session: {}s of playtime, {} quarters used, {} lost, pending quarter: {}",
                timer.time_remaining_seconds,
                timer.quarters_used,
                timer.quarters_lost,
                timer.pending_quarter.is_some(),
            );
        } else {
            info!("No usable session snapshot, starting fresh");
        }

        let (state_change_tx, _) = broadcast::channel(100);
        let (timer_update_tx, timer_update_rx) = watch::channel(TimerView::from(&timer));

        Self {
            timer: Arc::new(Mutex::new(timer)),
            store,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
            state_change_tx,
            timer_update_tx,
            _timer_update_rx: timer_update_rx,
        }
    }

    /// Spend one quarter from the mirrored balance. Returns the acceptance
    /// flag and the resulting view; rejection is a value, not an error.
    pub fn insert_quarter(&self) -> Result<(bool, TimerView), String> {
        let now = now_ms();
        let mut timer = self
            .timer
            .lock()
            .map_err(|e| format!("Failed to lock session timer: {}", e))?;

        let accepted = timer.insert_quarter(now);
        if accepted {
            self.persist(&timer, now);
        }
        let view = TimerView::from(&*timer);
        drop(timer);

        if accepted {
            info!(
                "Quarter inserted: {}s of playtime, {} quarters used",
                view.time_remaining_seconds, view.quarters_used
            );
            self.track_action("insert-quarter");

            // Wake the countdown task; it is the only subscriber, and it may
            // not be listening yet during startup.
            if let Err(e) = self.state_change_tx.send(view.clone()) {
                warn!("Failed to send state change notification: {}", e);
            }
            self.push_timer_update(view.clone());
        } else {
            info!("Quarter rejected: no quarters available");
        }

        Ok((accepted, view))
    }

    /// Credit quarters decided by the purchase collaborator. The balance is
    /// mirrored only, never persisted.
    pub fn credit_quarters(&self, count: u64) -> Result<TimerView, String> {
        let mut timer = self
            .timer
            .lock()
            .map_err(|e| format!("Failed to lock session timer: {}", e))?;

        timer.credit_quarters(count);
        let view = TimerView::from(&*timer);
        drop(timer);

        info!("Credited {} quarter(s), balance now {}", count, view.available_quarters);
        self.track_action("credit-quarters");
        self.push_timer_update(view.clone());

        Ok(view)
    }

    /// Drain one second of playtime and persist the result. Driven at 1 Hz
    /// by the countdown task while the timer is active.
    pub fn tick(&self) -> Result<TimerView, String> {
        let now = now_ms();
        let mut timer = self
            .timer
            .lock()
            .map_err(|e| format!("Failed to lock session timer: {}", e))?;

        timer.tick();
        self.persist(&timer, now);
        let view = TimerView::from(&*timer);
        drop(timer);

        self.push_timer_update(view.clone());
        Ok(view)
    }

    /// Lifecycle callback for the host environment: the process came back to
    /// the foreground. Clears a pending quarter that outlived its risk
    /// window.
    pub fn on_foregrounded(&self) -> Result<TimerView, String> {
        let now = now_ms();
        let mut timer = self
            .timer
            .lock()
            .map_err(|e| format!("Failed to lock session timer: {}", e))?;

        let was_pending = timer.pending_quarter.is_some();
        timer.check_abandonment(now);
        if was_pending && timer.pending_quarter.is_none() {
            info!("Pending quarter survived its risk window, now safe");
            self.persist(&timer, now);
        }
        let view = TimerView::from(&*timer);
        drop(timer);

        self.push_timer_update(view.clone());
        Ok(view)
    }

    /// Lifecycle callback for the host environment: the process is about to
    /// terminate. Applies the abandonment penalty if a quarter is still
    /// inside its risk window and writes the final snapshot before
    /// returning. Best-effort only; a hard kill skips this entirely.
    pub fn on_terminating(&self) -> Result<(), String> {
        let now = now_ms();
        let mut timer = self
            .timer
            .lock()
            .map_err(|e| format!("Failed to lock session timer: {}", e))?;

        if timer.finalize_on_termination(now) {
            info!(
                "Quarter abandoned inside its risk window: {} lost, {}s of playtime left",
                timer.quarters_lost, timer.time_remaining_seconds
            );
        }
        // the final write must land even when nothing was reclassified
        self.persist(&timer, now);

        Ok(())
    }

    /// Current timer view.
    pub fn view(&self) -> Result<TimerView, String> {
        self.timer
            .lock()
            .map(|timer| TimerView::from(&*timer))
            .map_err(|e| format!("Failed to lock session timer: {}", e))
    }

    /// Write the snapshot for the state just mutated. Persistence failures
    /// are logged and swallowed; they must never fail an operation.
    fn persist(&self, timer: &SessionTimer, now_ms: i64) {
        if let Err(e) = self.store.save(&timer.snapshot(now_ms)) {
            warn!("Failed to persist session snapshot: {}", e);
        }
    }

    fn push_timer_update(&self, view: TimerView) {
        if let Err(e) = self.timer_update_tx.send(view) {
            warn!("Failed to send timer update: {}", e);
        }
    }

    fn track_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn app_state() -> (AppState, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(0, "127.0.0.1".to_string(), store.clone());
        (state, store)
    }

    #[test]
    fn insert_persists_and_reports_acceptance() {
        let (state, store) = app_state();
        state.credit_quarters(1).unwrap();

        let (accepted, view) = state.insert_quarter().unwrap();
        assert!(accepted);
        assert!(view.active);
        assert_eq!(view.time_remaining_seconds, 900);
        assert_eq!(view.available_quarters, 0);

        let snapshot = store.load().expect("insert must write a snapshot");
        assert_eq!(snapshot.time_remaining, 900);
        assert_eq!(snapshot.quarters_used, 1);
        assert!(snapshot.last_quarter_timestamp.is_some());
    }

    #[test]
    fn insert_with_empty_balance_is_rejected_without_persisting() {
        let (state, store) = app_state();

        let (accepted, view) = state.insert_quarter().unwrap();
        assert!(!accepted);
        assert!(!view.active);
        assert_eq!(view.time_remaining_seconds, 0);
        assert_eq!(store.load(), None);
    }

    #[test]
    fn tick_drains_and_persists() {
        let (state, store) = app_state();
        state.credit_quarters(1).unwrap();
        state.insert_quarter().unwrap();

        let view = state.tick().unwrap();
        assert_eq!(view.time_remaining_seconds, 899);
        assert_eq!(store.load().unwrap().time_remaining, 899);
    }

    #[test]
    fn terminating_right_after_insert_revokes_the_quarter() {
        let (state, store) = app_state();
        state.credit_quarters(1).unwrap();
        state.insert_quarter().unwrap();

        state.on_terminating().unwrap();

        let snapshot = store.load().unwrap();
        assert_eq!(snapshot.lost_quarters, 1);
        assert_eq!(snapshot.time_remaining, 0);
        assert_eq!(snapshot.last_quarter_timestamp, None);
    }

    #[test]
    fn state_survives_a_restart_through_the_store() {
        let store = Arc::new(MemoryStore::new());
        {
            let state = AppState::new(0, "127.0.0.1".to_string(), store.clone());
            state.credit_quarters(2).unwrap();
            state.insert_quarter().unwrap();
            state.tick().unwrap();
        }

        let reborn = AppState::new(0, "127.0.0.1".to_string(), store);
        let view = reborn.view().unwrap();
        // at most a second of wall clock passed between save and restore
        assert!(view.time_remaining_seconds >= 897 && view.time_remaining_seconds <= 899);
        assert_eq!(view.quarters_used, 1);
        // the balance is mirrored, never persisted
        assert_eq!(view.available_quarters, 0);
    }

    #[test]
    fn foreground_check_keeps_a_fresh_quarter_pending() {
        let (state, _store) = app_state();
        state.credit_quarters(1).unwrap();
        state.insert_quarter().unwrap();

        state.on_foregrounded().unwrap();
        let timer = state.timer.lock().unwrap();
        assert!(timer.pending_quarter.is_some());
    }
}
