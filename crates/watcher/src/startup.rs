//! Startup gate: wait for the list to appear

use std::time::Duration;
use thiserror::Error;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

/// The list never became ready
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StartupError {
    #[error("item list did not appear within {0:?}")]
    TimedOut(Duration),
}

/// Poll `probe` every `poll_interval` until it reports ready
///
/// The first check happens immediately. Gives up after `limit`, returning
/// the number of checks made on success.
pub async fn wait_until_ready<F>(
    mut probe: F,
    poll_interval: Duration,
    limit: Duration,
) -> Result<u32, StartupError>
where
    F: FnMut() -> bool,
{
    debug!(?poll_interval, ?limit, "waiting for item list");

    let polling = async {
        let mut ticker = interval(poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut attempts = 0u32;
        loop {
            ticker.tick().await;
            attempts += 1;
            if probe() {
                return attempts;
            }
        }
    };

    match timeout(limit, polling).await {
        Ok(attempts) => {
            info!(attempts, "item list detected");
            Ok(attempts)
        }
        Err(_) => {
            warn!(?limit, "item list never appeared, giving up");
            Err(StartupError::TimedOut(limit))
        }
    }
}
