//! Registry Router

use std::sync::Arc;

use axum::{Router, routing::get};

use crate::domain::repository::ChainReader;
use crate::presentation::handlers::{self, RegistryAppState};

/// Create the registry read router for any chain reader
pub fn registry_router<R>(reader: Arc<R>, deploy_block: u64) -> Router
where
    R: ChainReader + Send + Sync + 'static,
{
    let state = RegistryAppState {
        reader,
        deploy_block,
    };

    Router::new()
        .route("/api/isRegistered", get(handlers::is_registered::<R>))
        .route("/api/pending", get(handlers::pending::<R>))
        .route("/api/certificate", get(handlers::certificate::<R>))
        .route("/api/owner", get(handlers::owner::<R>))
        .with_state(state)
}
