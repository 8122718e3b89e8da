//! Notification Relay Use Case

use std::sync::Arc;

use crate::domain::entities::{CertificateNotice, EmailMessage, MailReceipt};
use crate::domain::repository::MailTransport;
use crate::domain::services::{SUBJECT, render_certificate_email, sender};
use crate::error::{NotificationError, NotificationResult};

/// Certificate email use case
pub struct NotificationUseCase<M>
where
    M: MailTransport,
{
    transport: Arc<M>,
    from: Option<String>,
}

impl<M> NotificationUseCase<M>
where
    M: MailTransport,
{
    pub fn new(transport: Arc<M>, from: Option<String>) -> Self {
        Self { transport, from }
    }

    /// Build the message without sending it
    pub fn compose(&self, notice: &CertificateNotice) -> NotificationResult<EmailMessage> {
        let to = notice.recipient_email.trim();
        if to.is_empty() {
            return Err(NotificationError::validation("Recipient email is required"));
        }
        if !is_plausible_address(to) {
            return Err(NotificationError::validation(format!(
                "Invalid recipient email: {}",
                to
            )));
        }
        let from = self
            .from
            .as_deref()
            .ok_or(NotificationError::NotConfigured("MAIL_FROM"))?;

        Ok(EmailMessage {
            from: sender(from),
            to: to.to_string(),
            subject: SUBJECT.to_string(),
            html: render_certificate_email(notice),
        })
    }

    /// Render and send once
    pub async fn execute(&self, notice: &CertificateNotice) -> NotificationResult<MailReceipt> {
        let message = self.compose(notice)?;
        let receipt = self.transport.send(&message).await?;

        tracing::info!(
            to = %message.to,
            certificate_hash = %notice.certificate_hash,
            message_id = ?receipt.message_id,
            "Certificate email sent"
        );
        Ok(receipt)
    }
}

/// One `@` with text on both sides and no whitespace or header breaks
fn is_plausible_address(address: &str) -> bool {
    let mut parts = address.splitn(2, '@');
    let (Some(local), Some(domain)) = (parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !address.chars().any(|c| c.is_whitespace() || c.is_control())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_address() {
        assert!(is_plausible_address("ada@example.com"));
        assert!(!is_plausible_address("ada.example.com"));
        assert!(!is_plausible_address("@example.com"));
        assert!(!is_plausible_address("ada@"));
        assert!(!is_plausible_address("ada@a@b"));
        assert!(!is_plausible_address("ada@example.com\r\nBcc: x@y"));
    }
}
