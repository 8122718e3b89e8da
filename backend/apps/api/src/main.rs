//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    http::{Method, header},
};
use registry::application::event_feed::LogFeed;
use registry::application::pending_requests::PendingRequestsUseCase;
use registry::application::pending_watcher::PendingWatcher;
use registry::application::subscription::EventHub;
use registry::{ChainConfig, ContractClient, RegistryConfig, registry_router};
use relay::{HttpMailTransport, MailConfig, PinataClient, UploadConfig, relay_router};
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::ServerConfig;

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=info,registry=info,relay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // The chain endpoint is the only fatal omission
    let chain_config = match ChainConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Chain configuration invalid");
            std::process::exit(1);
        }
    };
    let registry_config = RegistryConfig::from_env()?;
    let upload_config = UploadConfig::from_env()?;
    let mail_config = MailConfig::from_env();
    let server_config = ServerConfig::from_env()?;

    let contract = Arc::new(ContractClient::new(&chain_config)?);
    match contract.contract_address() {
        Some(address) => tracing::info!(rpc_url = %chain_config.rpc_url, contract = %address, "Chain client ready"),
        None => tracing::warn!("CONTRACT_ADDRESS not set; registry endpoints will fail"),
    }

    // Registry events feed the pending-request watcher
    let hub = EventHub::default();
    let watcher = PendingWatcher::spawn(
        PendingRequestsUseCase::new(contract.clone(), chain_config.deploy_block),
        hub.subscribe(),
    );
    let feed = LogFeed::spawn(
        contract.clone(),
        hub.clone(),
        None,
        registry_config.event_poll_interval,
    );

    let mut changes = watcher.changes();
    let reporter = tokio::spawn(async move {
        while changes.changed().await.is_ok() {
            let snapshot = changes.borrow_and_update().clone();
            match &snapshot.last_error {
                Some(e) => tracing::warn!(error = %e, version = snapshot.version, "Pending refresh failed"),
                None => tracing::info!(
                    pending = snapshot.institutes.len(),
                    version = snapshot.version,
                    "Pending requests refreshed"
                ),
            }
        }
    });

    // Relay providers
    let mail = Arc::new(HttpMailTransport::new(&mail_config)?);
    if mail_config.api_url.is_none() || mail_config.from.is_none() {
        tracing::warn!("Mail provider not fully configured; /api/send-email will fail");
    }
    std::fs::create_dir_all(&upload_config.upload_dir)?;

    if !upload_config.has_pinata_credentials() {
        tracing::warn!("Pinata credentials not set; /upload will fail");
    }
    let pinning = Arc::new(PinataClient::new(&upload_config)?);
    let relay = relay_router(pinning, mail, &upload_config, &mail_config);

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(server_config.frontend_origins.clone())
        .allow_methods(AllowMethods::list([
            Method::GET,
            Method::POST,
            Method::OPTIONS,
        ]))
        .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT]));

    // Build router
    let app = Router::new()
        .merge(registry_router(contract.clone(), chain_config.deploy_block))
        .merge(relay)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    tracing::info!("Server running on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    feed.shutdown().await;
    watcher.shutdown().await;
    reporter.abort();
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
