//! Periodic eviction of expired OAuth state tokens and connected sessions.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::oauth::OAuthStateStore;

/// How often the eviction sweep runs.
pub const EVICTION_INTERVAL: Duration = Duration::from_secs(60);

/// Run the eviction loop until `cancel` is triggered.
pub async fn run(store: Arc<OAuthStateStore>, interval: Duration, cancel: CancellationToken) {
    tracing::info!(
        interval_secs = interval.as_secs(),
        "OAuth state eviction job started"
    );

    let mut ticker = tokio::time::interval(interval);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("OAuth state eviction job stopping");
                break;
            }
            _ = ticker.tick() => {
                let evicted = store.evict_expired().await;
                if evicted > 0 {
                    tracing::info!(evicted, "OAuth state eviction: dropped expired entries");
                } else {
                    tracing::debug!("OAuth state eviction: nothing to drop");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sweeps_expired_entries_and_stops_on_cancel() {
        let store = Arc::new(OAuthStateStore::new(Duration::ZERO, Duration::from_secs(3600)));
        store.issue("spotify").await;

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(run(
            Arc::clone(&store),
            Duration::from_millis(10),
            cancel.clone(),
        ));

        // The first tick fires immediately.
        for _ in 0..50 {
            if store.pending_count().await == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.pending_count().await, 0);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("eviction task should stop after cancellation")
            .unwrap();
    }
}
