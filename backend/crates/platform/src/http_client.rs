//! Outbound HTTP client construction

use std::time::Duration;

/// User-Agent sent to the chain node and SaaS providers
pub const USER_AGENT: &str = concat!("certiq-relay/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` with a whole-request timeout
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(Duration::from_secs(5)).is_ok());
        assert!(USER_AGENT.starts_with("certiq-relay/"));
    }
}
