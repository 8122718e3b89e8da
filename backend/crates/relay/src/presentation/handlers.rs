//! HTTP Handlers

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderMap, StatusCode};
use platform::client::RequestOrigin;

use crate::application::notify::NotificationUseCase;
use crate::application::upload::{StagedUpload, UploadUseCase};
use crate::domain::entities::CertificateNotice;
use crate::domain::repository::{MailTransport, PinningService};
use crate::error::{NotificationError, NotificationResult, UploadError, UploadResult};
use crate::presentation::dto::{SendEmailRequest, SendEmailResponse, UploadResponse};

/// Multipart field carrying the file
pub const UPLOAD_FIELD: &str = "image";

/// Shared state for relay handlers
pub struct RelayAppState<P, M>
where
    P: PinningService + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
{
    pub upload: Arc<UploadUseCase<P>>,
    pub notify: Arc<NotificationUseCase<M>>,
    pub upload_dir: PathBuf,
}

impl<P, M> Clone for RelayAppState<P, M>
where
    P: PinningService + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            upload: self.upload.clone(),
            notify: self.notify.clone(),
            upload_dir: self.upload_dir.clone(),
        }
    }
}

fn multipart_error(err: MultipartError) -> UploadError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge
    } else {
        UploadError::InvalidMultipart(err.body_text())
    }
}

/// Stream the `image` field into a staging file; other fields are skipped
async fn stage_upload(multipart: &mut Multipart, dir: &Path) -> UploadResult<StagedUpload> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let mut staged = StagedUpload::create(dir, field.file_name(), field.content_type()).await?;
        while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
            staged.write_chunk(&chunk).await?;
        }
        return Ok(staged);
    }
    Err(UploadError::MissingFile)
}

/// POST /upload
pub async fn upload<P, M>(
    State(state): State<RelayAppState<P, M>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> UploadResult<Json<UploadResponse>>
where
    P: PinningService + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
{
    let origin = RequestOrigin::from_headers(&headers);
    let mut multipart = multipart.map_err(|_| UploadError::MissingFile)?;

    let staged = stage_upload(&mut multipart, &state.upload_dir).await?;
    tracing::debug!(
        origin = %origin,
        user_agent = ?origin.user_agent,
        file_name = %staged.file_name(),
        size = staged.len(),
        "Upload staged"
    );

    let hash = state.upload.execute(staged).await?;
    Ok(Json(UploadResponse { hash }))
}

/// POST /api/send-email
pub async fn send_email<P, M>(
    State(state): State<RelayAppState<P, M>>,
    headers: HeaderMap,
    body: Result<Json<SendEmailRequest>, JsonRejection>,
) -> NotificationResult<Json<SendEmailResponse>>
where
    P: PinningService + Send + Sync + 'static,
    M: MailTransport + Send + Sync + 'static,
{
    let Json(request) = body.map_err(|e| NotificationError::validation(e.body_text()))?;
    let notice = CertificateNotice::from(request);
    let origin = RequestOrigin::from_headers(&headers);
    tracing::debug!(
        origin = %origin,
        user_agent = ?origin.user_agent,
        certificate_hash = %notice.certificate_hash,
        "Email requested"
    );

    let receipt = state.notify.execute(&notice).await?;
    Ok(Json(SendEmailResponse::sent(receipt)))
}
