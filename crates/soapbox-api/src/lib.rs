pub mod error;
pub mod filter;
pub mod payment;
pub mod reader;
pub mod redeem;
pub mod routes;

#[cfg(test)]
mod testing;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use soapbox_db::Store;

use crate::reader::MessageReader;
use crate::redeem::RedemptionService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub redemption: RedemptionService,
    pub reader: MessageReader,
}

/// Public routes. Callers add CORS and tracing layers.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::current_message))
        .route("/api/update-message", post(routes::update_message))
        .route("/health", get(routes::health))
        .with_state(state)
}

/// Run a blocking store call off the async runtime.
pub(crate) async fn run_blocking<F, T>(store: &Arc<dyn Store>, f: F) -> anyhow::Result<T>
where
    F: FnOnce(&dyn Store) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone();
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| anyhow::anyhow!("spawn_blocking join error: {}", e))?
}
