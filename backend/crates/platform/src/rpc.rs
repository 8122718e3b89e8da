//! JSON-RPC 2.0 over HTTP
//!
//! Thin transport used for both the read node and the wallet signer
//! endpoint. It never retries: callers decide whether a method is
//! idempotent.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_client::build_http_client;

/// Transport and protocol failures
#[derive(Debug, Clone, Error)]
pub enum RpcError {
    #[error("request timed out")]
    Timeout,

    #[error("endpoint unreachable: {0}")]
    Unreachable(String),

    #[error("HTTP error: {0}")]
    Http(u16),

    #[error("malformed response: {0}")]
    Malformed(String),

    /// Error object returned by the node
    #[error("RPC error {code}: {message}")]
    Rpc {
        code: i64,
        message: String,
        data: Option<serde_json::Value>,
    },
}

impl RpcError {
    /// The request may not have reached the node at all
    pub fn is_transport(&self) -> bool {
        matches!(self, RpcError::Timeout | RpcError::Unreachable(_) | RpcError::Http(_))
    }
}

#[derive(Debug, Serialize)]
struct JsonRpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'a str,
    params: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct JsonRpcResponse {
    #[serde(default)]
    result: serde_json::Value,
    #[serde(default)]
    error: Option<JsonRpcErrorObject>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcErrorObject {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// JSON-RPC client bound to one endpoint
#[derive(Debug)]
pub struct JsonRpcClient {
    url: String,
    client: reqwest::Client,
    next_id: AtomicU64,
}

impl JsonRpcClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, RpcError> {
        let client = build_http_client(timeout)
            .map_err(|e| RpcError::Unreachable(format!("failed to create HTTP client: {}", e)))?;
        Ok(Self::with_client(url, client))
    }

    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call `method` and deserialize `result` into `R`
    ///
    /// A missing or `null` result deserializes as JSON `null`, so `R` may be
    /// an `Option<_>` for methods such as `eth_getTransactionReceipt`.
    pub async fn request<R>(&self, method: &str, params: serde_json::Value) -> Result<R, RpcError>
    where
        R: DeserializeOwned,
    {
        let request = JsonRpcRequest {
            jsonrpc: "2.0",
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            method,
            params,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RpcError::Timeout
                } else {
                    RpcError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(RpcError::Http(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                RpcError::Timeout
            } else {
                RpcError::Unreachable(format!("failed to read response: {}", e))
            }
        })?;

        let rpc_response: JsonRpcResponse = serde_json::from_str(&body)
            .map_err(|e| RpcError::Malformed(format!("failed to parse response: {}", e)))?;

        if let Some(error) = rpc_response.error {
            tracing::debug!(
                method,
                code = error.code,
                message = %error.message,
                "JSON-RPC call returned an error"
            );
            return Err(RpcError::Rpc {
                code: error.code,
                message: error.message,
                data: error.data,
            });
        }

        serde_json::from_value(rpc_response.result)
            .map_err(|e| RpcError::Malformed(format!("unexpected result for {}: {}", method, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> JsonRpcClient {
        JsonRpcClient::new(server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_request_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"method": "eth_blockNumber"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"jsonrpc":"2.0","id":1,"result":"0x10"}"#),
            )
            .mount(&server)
            .await;

        let result: String = client(&server)
            .request("eth_blockNumber", json!([]))
            .await
            .unwrap();
        assert_eq!(result, "0x10");
    }

    #[tokio::test]
    async fn test_request_null_result_as_option() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"jsonrpc":"2.0","id":1,"result":null}"#),
            )
            .mount(&server)
            .await;

        let result: Option<String> = client(&server)
            .request("eth_getTransactionReceipt", json!(["0x00"]))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_request_rpc_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"jsonrpc":"2.0","id":1,"error":{"code":3,"message":"execution reverted","data":"0x"}}"#,
            ))
            .mount(&server)
            .await;

        let err = client(&server)
            .request::<String>("eth_call", json!([]))
            .await
            .unwrap_err();
        match err {
            RpcError::Rpc { code, message, .. } => {
                assert_eq!(code, 3);
                assert_eq!(message, "execution reverted");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_request_http_and_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        let err = client(&server)
            .request::<String>("eth_call", json!([]))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Http(502)));
        assert!(err.is_transport());

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;
        let err = client(&server)
            .request::<String>("eth_call", json!([]))
            .await
            .unwrap_err();
        assert!(matches!(err, RpcError::Malformed(_)));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_request_unreachable() {
        let rpc = JsonRpcClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = rpc.request::<String>("eth_call", json!([])).await.unwrap_err();
        assert!(err.is_transport());
    }
}
