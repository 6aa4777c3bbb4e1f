//! Wake recovery background task

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::time::interval;
use tracing::{debug, info, warn};

use crate::state::AppState;

const CHECK_INTERVAL_SECONDS: u64 = 15;

/// A wall-clock jump larger than this between checks means the process was
/// frozen or the machine slept.
const GAP_THRESHOLD_SECONDS: i64 = 45;

/// Background task that detects the process returning to the foreground.
///
/// Tokio intervals run on the monotonic clock, so a machine sleep shows up
/// as a wall-clock gap between consecutive checks. A detected gap is treated
/// as the "visibility restored" lifecycle event and runs the pending-quarter
/// abandonment check.
pub async fn wake_recovery_task(state: Arc<AppState>) {
    info!("Starting wake recovery task");

    let mut check_interval = interval(Duration::from_secs(CHECK_INTERVAL_SECONDS));
    let mut last_seen = Utc::now();

    loop {
        check_interval.tick().await;

        let now = Utc::now();
        let gap = (now - last_seen).num_seconds();

        if gap >= GAP_THRESHOLD_SECONDS {
            info!("Wall-clock gap of {}s detected, running foreground check", gap);

            match state.on_foregrounded() {
                Ok(view) => {
                    debug!(
                        "Foreground check complete: {}s of playtime, {} quarters lost",
                        view.time_remaining_seconds, view.lost_quarters
                    );
                }
                Err(e) => {
                    warn!("Failed to run foreground check: {}", e);
                }
            }
        }

        last_seen = now;
    }
}
