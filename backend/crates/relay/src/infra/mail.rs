//! HTTP Mail Transport
//!
//! Posts `{from, to, subject, html}` as JSON with a bearer key. Works with
//! transactional providers exposing a single send endpoint.

use platform::http_client::build_http_client;
use serde::Deserialize;

use crate::application::config::MailConfig;
use crate::domain::entities::{EmailMessage, MailReceipt};
use crate::domain::repository::MailTransport;
use crate::error::{NotificationError, NotificationResult};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    message_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HttpMailTransport {
    client: reqwest::Client,
    api_url: Option<String>,
    api_key: Option<String>,
}

impl HttpMailTransport {
    pub fn new(config: &MailConfig) -> NotificationResult<Self> {
        let client = build_http_client(config.request_timeout).map_err(|e| {
            NotificationError::Network(format!("failed to create HTTP client: {}", e))
        })?;
        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
        })
    }
}

impl MailTransport for HttpMailTransport {
    async fn send(&self, message: &EmailMessage) -> NotificationResult<MailReceipt> {
        let url = self
            .api_url
            .as_deref()
            .ok_or(NotificationError::NotConfigured("MAIL_API_URL"))?;
        let key = self
            .api_key
            .as_deref()
            .ok_or(NotificationError::NotConfigured("MAIL_API_KEY"))?;

        let response = self
            .client
            .post(url)
            .bearer_auth(key)
            .json(message)
            .send()
            .await
            .map_err(|e| NotificationError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| NotificationError::Network(format!("failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(NotificationError::Provider(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        // Providers differ in their acknowledgement; an unparseable body
        // after a 2xx still counts as sent.
        let parsed: SendResponse = serde_json::from_str(&body).unwrap_or_default();
        Ok(MailReceipt {
            message_id: parsed.message_id.or(parsed.id),
            accepted: vec![message.to.clone()],
        })
    }
}
