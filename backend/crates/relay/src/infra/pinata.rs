//! Pinata Pinning Client
//!
//! Posts the file as multipart field `file` to `pinFileToIPFS` and reads
//! `IpfsHash` from the response. One attempt per upload.

use platform::http_client::build_http_client;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use crate::application::config::UploadConfig;
use crate::domain::entities::PinContent;
use crate::domain::repository::PinningService;
use crate::error::{UploadError, UploadResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinFileResponse {
    ipfs_hash: String,
}

/// Pinata `pinFileToIPFS` client
#[derive(Debug, Clone)]
pub struct PinataClient {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    secret_api_key: Option<String>,
}

impl PinataClient {
    pub fn new(config: &UploadConfig) -> UploadResult<Self> {
        let client = build_http_client(config.request_timeout)
            .map_err(|e| UploadError::Network(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            api_url: config.pinata_api_url.clone(),
            api_key: config.pinata_api_key.clone(),
            secret_api_key: config.pinata_secret_api_key.clone(),
        })
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn credentials(&self) -> UploadResult<(&str, &str)> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(UploadError::NotConfigured("PINATA_API_KEY"))?;
        let secret = self
            .secret_api_key
            .as_deref()
            .ok_or(UploadError::NotConfigured("PINATA_SECRET_API_KEY"))?;
        Ok((key, secret))
    }
}

/// `type/subtype` with RFC 7230 token characters only
fn is_simple_mime(value: &str) -> bool {
    let token = |s: &str| {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$&-^_.+".contains(c))
    };
    let essence = value.split(';').next().unwrap_or_default().trim();
    matches!(essence.split_once('/'), Some((t, s)) if token(t) && token(s))
}

fn file_part(content: PinContent) -> UploadResult<Part> {
    let part = Part::bytes(content.bytes).file_name(content.file_name);
    match content.content_type.as_deref() {
        Some(ct) if is_simple_mime(ct) => part
            .mime_str(ct)
            .map_err(|e| UploadError::InvalidMultipart(format!("invalid content type: {}", e))),
        _ => Ok(part),
    }
}

/// Pull a human-readable reason out of a Pinata error body
///
/// Pinata answers either `{"error": "..."}` or
/// `{"error": {"reason": "...", "details": "..."}}`.
fn provider_reason(status: u16, body: &str) -> String {
    let fallback = || format!("Pinning service returned HTTP {}", status);
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        let trimmed = body.trim();
        return if trimmed.is_empty() {
            fallback()
        } else {
            trimmed.to_string()
        };
    };

    let error = &value["error"];
    error
        .as_str()
        .or_else(|| error["details"].as_str())
        .or_else(|| error["reason"].as_str())
        .or_else(|| value["message"].as_str())
        .map(str::to_owned)
        .unwrap_or_else(fallback)
}

impl PinningService for PinataClient {
    async fn pin(&self, content: PinContent) -> UploadResult<String> {
        let (key, secret) = self.credentials()?;
        let form = Form::new().part("file", file_part(content)?);

        let response = self
            .client
            .post(&self.api_url)
            .header("pinata_api_key", key)
            .header("pinata_secret_api_key", secret)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(UploadError::Provider(provider_reason(status.as_u16(), &body)));
        }

        let parsed: PinFileResponse = serde_json::from_str(&body).map_err(|e| {
            UploadError::Provider(format!("Unexpected pinning service response: {}", e))
        })?;
        Ok(parsed.ipfs_hash)
    }
}
