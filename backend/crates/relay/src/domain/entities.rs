//! Domain Entities

use serde::Serialize;

/// File content handed to a pinning service
#[derive(Debug, Clone)]
pub struct PinContent {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Certificate email fields, as submitted by the issuing institute
#[derive(Debug, Clone, Default)]
pub struct CertificateNotice {
    pub recipient_email: String,
    pub student_name: String,
    pub course_name: String,
    pub institute_name: String,
    pub department: String,
    pub completion_date: String,
    pub certificate_hash: String,
    pub verification_url: String,
    /// `data:image/...` URL of the verification QR code
    pub qr_code_image: String,
    pub additional_message: Option<String>,
}

/// Rendered message ready for a mail transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Provider acknowledgement of a sent message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MailReceipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    pub accepted: Vec<String>,
}
