//! Background heartbeat task
//!
//! Keeps the registry's `lastSeen` fresh while the server runs. Failures
//! are logged and swallowed: losing connectivity must never take the
//! local API down.

use crate::registry::RegistryClient;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// Default heartbeat period
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(30);

/// Spawn the heartbeat loop
///
/// Sends one heartbeat per period, forever. The first tick fires after
/// one full period; registration already wrote a fresh `lastSeen`.
/// Dropping the handle does not stop the task; abort it for shutdown.
pub fn spawn_heartbeat(
    client: RegistryClient,
    phone_id: String,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        // Consume the immediate first tick
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = client.heartbeat(&phone_id).await {
                debug!(phone_id = %phone_id, error = %e, "heartbeat failed");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::RegistryConfig;

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_survives_unreachable_registry() {
        let config = RegistryConfig {
            base_url: "http://localhost:9999/v1".to_string(),
            project: "p".to_string(),
            api_key: "k".to_string(),
        };
        let client = RegistryClient::new(config).unwrap();
        let handle = spawn_heartbeat(client, "p1".to_string(), Duration::from_secs(30));

        // Let a few periods elapse; the task must still be alive even
        // though every heartbeat fails.
        tokio::time::sleep(Duration::from_secs(95)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
