//! Provider Interfaces
//!
//! Implementations live in the infrastructure layer.

use crate::domain::entities::{EmailMessage, MailReceipt, PinContent};
use crate::error::{NotificationResult, UploadResult};

/// Content-addressed file storage
#[trait_variant::make(PinningService: Send)]
pub trait LocalPinningService {
    /// Store `content`; returns its content identifier
    async fn pin(&self, content: PinContent) -> UploadResult<String>;
}

/// Transactional mail delivery
#[trait_variant::make(MailTransport: Send)]
pub trait LocalMailTransport {
    /// Deliver once; never retried
    async fn send(&self, message: &EmailMessage) -> NotificationResult<MailReceipt>;
}
