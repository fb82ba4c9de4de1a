use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use soapbox_db::Store;

/// Background task that prunes expired keys (mostly redeemed-session markers).
///
/// Expired keys are already invisible to reads; this only reclaims space.
pub async fn run_cleanup_loop(store: Arc<dyn Store>, every: Duration) {
    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;

        match cleanup_expired(store.clone()).await {
            Ok(count) => {
                if count > 0 {
                    info!("Cleanup: pruned {} expired keys", count);
                }
            }
            Err(e) => {
                warn!("Cleanup error: {}", e);
            }
        }
    }
}

async fn cleanup_expired(store: Arc<dyn Store>) -> anyhow::Result<usize> {
    tokio::task::spawn_blocking(move || store.purge_expired()).await?
}
