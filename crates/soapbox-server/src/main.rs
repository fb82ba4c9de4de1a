mod cleanup;
mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use soapbox_api::filter::ContentFilter;
use soapbox_api::payment::StripeVerifier;
use soapbox_api::reader::MessageReader;
use soapbox_api::redeem::RedemptionService;
use soapbox_api::{AppState, AppStateInner};
use soapbox_db::{SqliteStore, Store};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "soapbox=debug,soapbox_api=debug,soapbox_db=debug,tower_http=debug".into()),
        )
        .init();

    let config = Config::from_env()?;

    // Init store and payment verifier
    let store: Arc<dyn Store> = Arc::new(SqliteStore::open(&config.db_path)?);
    let verifier = Arc::new(StripeVerifier::new(
        config.stripe_secret_key.clone(),
        &config.stripe_api_base,
    )?);

    let filter = ContentFilter::new(&config.banned_words);
    if filter.is_empty() {
        warn!("No banned words configured, content filter is disabled");
    } else {
        info!("Content filter loaded with {} banned words", filter.len());
    }

    if config.cleanup_interval.is_zero() {
        warn!("SOAPBOX_CLEANUP_INTERVAL_SECS is 0, expired keys will not be purged");
    } else {
        tokio::spawn(cleanup::run_cleanup_loop(store.clone(), config.cleanup_interval));
    }

    let state: AppState = Arc::new(AppStateInner {
        redemption: RedemptionService::new(store.clone(), verifier, filter),
        reader: MessageReader::new(store, config.message_fresh_for),
    });

    let app = soapbox_api::router(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Soapbox listening on {}", addr);
    info!(
        "Display revalidates every {}s, markers kept 30 days",
        config.message_fresh_for.as_secs()
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
