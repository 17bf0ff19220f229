use std::time::Duration;

use tokio::task::JoinHandle;

/// Periodically GET `url` so idle hosting does not put the process to sleep.
/// Fire and forget: failures are logged and the loop keeps going.
pub fn spawn(url: String, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let client = reqwest::Client::new();
        let mut interval = tokio::time::interval(period);
        // First tick completes immediately; the server is obviously awake at startup
        interval.tick().await;

        loop {
            interval.tick().await;
            match client.get(&url).send().await {
                Ok(resp) => tracing::debug!(status = %resp.status(), "keepalive ping"),
                Err(e) => tracing::debug!("keepalive ping failed (ignored): {}", e),
            }
        }
    })
}
