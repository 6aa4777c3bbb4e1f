//! Countdown background task

use std::{sync::Arc, time::Duration};

use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};

use crate::state::AppState;

/// Background task that drains the playtime balance at 1 Hz.
///
/// No interval exists while the timer is idle; the task parks on the state
/// change channel and builds a fresh interval each time the balance becomes
/// positive. Quarter insertions during an active run only extend the balance
/// the running interval is already draining.
pub async fn countdown_task(state: Arc<AppState>) {
    info!("Starting countdown task");

    let mut state_rx = state.state_change_tx.subscribe();

    // A restored snapshot may already hold playtime; don't wait for an
    // insertion to begin draining it.
    let mut startup_view = match state.view() {
        Ok(view) if view.is_active() => Some(view),
        _ => None,
    };

    loop {
        let view = if let Some(view) = startup_view.take() {
            view
        } else {
            match state_rx.recv().await {
                Ok(view) => view,
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Countdown task lagged, skipped {} state changes", skipped);
                    continue;
                }
                Err(RecvError::Closed) => {
                    error!("State change channel closed, stopping countdown task");
                    return;
                }
            }
        };

        if !view.is_active() {
            debug!("State change with no playtime, countdown stays parked");
            continue;
        }

        info!("Countdown active: {}s of playtime", view.time_remaining_seconds);

        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // the first interval tick completes immediately; consume it so the
        // first real drain happens a full second after activation
        interval.tick().await;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match state.tick() {
                        Ok(view) if !view.is_active() => {
                            info!("Playtime exhausted, countdown going idle");
                            break;
                        }
                        Ok(view) => {
                            debug!("{}s of playtime remaining", view.time_remaining_seconds);
                        }
                        Err(e) => {
                            error!("Failed to tick session timer: {}", e);
                        }
                    }
                }

                recv = state_rx.recv() => {
                    match recv {
                        Ok(view) => {
                            debug!(
                                "State change during countdown: {}s of playtime",
                                view.time_remaining_seconds
                            );
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!("Countdown task lagged, skipped {} state changes", skipped);
                        }
                        Err(RecvError::Closed) => {
                            error!("State change channel closed, stopping countdown task");
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, SnapshotStore};

    #[tokio::test(start_paused = true)]
    async fn drains_one_second_per_second_while_active() {
        let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
        let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), store));
        state.credit_quarters(1).unwrap();
        let (accepted, _) = state.insert_quarter().unwrap();
        assert!(accepted);

        let task = tokio::spawn(countdown_task(Arc::clone(&state)));

        tokio::time::sleep(Duration::from_secs(10)).await;
        let view = state.view().unwrap();
        // the interval and the sleep race by at most one tick
        assert!(
            (889..=891).contains(&view.time_remaining_seconds),
            "unexpected balance: {}",
            view.time_remaining_seconds
        );

        task.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn stays_parked_while_idle() {
        let store: Arc<dyn SnapshotStore> = Arc::new(MemoryStore::new());
        let state = Arc::new(AppState::new(0, "127.0.0.1".to_string(), store));

        let task = tokio::spawn(countdown_task(Arc::clone(&state)));

        tokio::time::sleep(Duration::from_secs(30)).await;
        let view = state.view().unwrap();
        assert!(!view.active);
        assert_eq!(view.time_remaining_seconds, 0);

        task.abort();
    }
}
