//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::domain::entities::{CertificateNotice, MailReceipt};

/// Response for POST /upload
#[derive(Debug, Clone, Serialize)]
pub struct UploadResponse {
    /// Content identifier returned by the pinning service
    pub hash: String,
}

/// Request body for POST /api/send-email
///
/// Absent fields render as empty text; only the recipient is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendEmailRequest {
    pub recipient_email: String,
    pub student_name: String,
    pub course_name: String,
    pub institute_name: String,
    pub department: String,
    pub completion_date: String,
    pub certificate_hash: String,
    pub verification_url: String,
    pub qr_code_image: String,
    pub additional_message: Option<String>,
}

impl From<SendEmailRequest> for CertificateNotice {
    fn from(req: SendEmailRequest) -> Self {
        Self {
            recipient_email: req.recipient_email,
            student_name: req.student_name,
            course_name: req.course_name,
            institute_name: req.institute_name,
            department: req.department,
            completion_date: req.completion_date,
            certificate_hash: req.certificate_hash,
            verification_url: req.verification_url,
            qr_code_image: req.qr_code_image,
            additional_message: req.additional_message,
        }
    }
}

/// Response for POST /api/send-email
#[derive(Debug, Clone, Serialize)]
pub struct SendEmailResponse {
    pub message: &'static str,
    pub info: MailReceipt,
}

impl SendEmailResponse {
    pub fn sent(info: MailReceipt) -> Self {
        Self {
            message: "Email sent successfully",
            info,
        }
    }
}
