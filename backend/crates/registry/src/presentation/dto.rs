//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

use crate::application::check_registration::OwnerStatus;
use crate::application::verify_certificate::CertificateView;
use crate::domain::entities::InstituteRequest;

/// Query for GET /api/isRegistered and GET /api/owner
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddressQuery {
    #[serde(default)]
    pub address: Option<String>,
}

/// Response for GET /api/isRegistered
#[derive(Debug, Clone, Serialize)]
pub struct IsRegisteredResponse {
    /// Echoed as given
    pub address: String,
    pub registered: bool,
}

/// Entry of GET /api/pending
#[derive(Debug, Clone, Serialize)]
pub struct PendingInstitute {
    pub address: String,
    pub name: String,
    pub acronym: String,
    pub website: String,
}

impl From<InstituteRequest> for PendingInstitute {
    fn from(request: InstituteRequest) -> Self {
        Self {
            address: request.address.to_string(),
            name: request.name,
            acronym: request.acronym,
            website: request.website,
        }
    }
}

/// Response for GET /api/pending
#[derive(Debug, Clone, Serialize)]
pub struct PendingResponse {
    pub pending: Vec<PendingInstitute>,
}

/// Query for GET /api/certificate
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CertificateQuery {
    #[serde(default)]
    pub hash: Option<String>,
    /// Account to compare against the issuer
    #[serde(default)]
    pub viewer: Option<String>,
}

/// Response for GET /api/certificate
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateResponse {
    pub certificate_hash: String,
    pub is_valid: bool,
    pub institute_name: String,
    pub department: String,
    pub first_name: String,
    pub last_name: String,
    pub certificant_id: String,
    pub email: String,
    pub course_completed: String,
    /// Unix seconds
    pub completion_date: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub notes: String,
    pub ipfs_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewer_is_issuer: Option<bool>,
}

impl From<CertificateView> for CertificateResponse {
    fn from(view: CertificateView) -> Self {
        let cert = view.certificate;
        Self {
            certificate_hash: cert.hash.to_string(),
            is_valid: cert.is_valid,
            completed_at: cert.completed_at().map(|t| t.to_rfc3339()),
            issuer: cert.issuer.map(|a| a.to_string()),
            institute_name: cert.institute_name,
            department: cert.department,
            first_name: cert.first_name,
            last_name: cert.last_name,
            certificant_id: cert.certificant_id,
            email: cert.email,
            course_completed: cert.course,
            completion_date: cert.completion_timestamp,
            notes: cert.notes,
            ipfs_hash: cert.ipfs_hash,
            viewer_is_issuer: view.viewer_is_issuer,
        }
    }
}

/// Response for GET /api/owner
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerResponse {
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_owner: Option<bool>,
}

impl From<OwnerStatus> for OwnerResponse {
    fn from(status: OwnerStatus) -> Self {
        Self {
            owner: status.owner.to_string(),
            is_owner: status.is_owner,
        }
    }
}
