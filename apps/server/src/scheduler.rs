//! Background sweep of idle sessions.

use std::sync::{Arc, Weak};
use tokio::time::{interval, Duration};
use tracing::{debug, info};

use crate::main_lib::AppState;

/// Longest pause between two sweeps.
const MAX_SWEEP_INTERVAL_SECS: u64 = 60;

/// Starts the session sweeper. It stops once the state has been dropped.
pub fn start_session_sweeper(state: &Arc<AppState>, idle_timeout: Duration) {
    let state: Weak<AppState> = Arc::downgrade(state);
    let period = (idle_timeout / 4)
        .min(Duration::from_secs(MAX_SWEEP_INTERVAL_SECS))
        .max(Duration::from_secs(1));

    tokio::spawn(async move {
        info!("Session sweeper started (idle timeout {:?})", idle_timeout);
        let mut sweep_interval = interval(period);

        loop {
            sweep_interval.tick().await;
            let Some(state) = state.upgrade() else {
                break;
            };
            let removed = state.sessions.evict_idle(idle_timeout);
            if removed > 0 {
                debug!("Evicted {} idle sessions, {} remain", removed, state.sessions.len());
            }
        }
    });
}
