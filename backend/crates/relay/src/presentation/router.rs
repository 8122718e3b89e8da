//! Relay Router

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{Router, routing::post};

use crate::application::config::{MailConfig, UploadConfig};
use crate::application::notify::NotificationUseCase;
use crate::application::upload::UploadUseCase;
use crate::domain::repository::{MailTransport, PinningService};
use crate::presentation::handlers::{self, RelayAppState};

/// Create the relay router for any pinning service and mail transport
pub fn relay_router<P, M>(
    pinning: Arc<P>,
    mail: Arc<M>,
    upload_config: &UploadConfig,
    mail_config: &MailConfig,
) -> Router
where
    P: PinningService + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
{
    let state = RelayAppState {
        upload: Arc::new(UploadUseCase::new(pinning)),
        notify: Arc::new(NotificationUseCase::new(mail, mail_config.from.clone())),
        upload_dir: upload_config.upload_dir.clone(),
    };

    let body_limit = match upload_config.body_limit {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    Router::new()
        .route("/upload", post(handlers::upload::<P, M>).layer(body_limit))
        .route("/api/send-email", post(handlers::send_email::<P, M>))
        .with_state(state)
}
