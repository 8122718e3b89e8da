//! Client identification utilities
//!
//! Relay requests are anonymous; these helpers only attribute them in logs.

use axum::http::{HeaderMap, header};
use std::fmt;
use std::net::IpAddr;

/// Where a relay request came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOrigin {
    /// First X-Forwarded-For hop, if it parses
    pub ip: Option<IpAddr>,
    /// Raw User-Agent header
    pub user_agent: Option<String>,
}

impl RequestOrigin {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            ip: forwarded_ip(headers),
            user_agent: headers
                .get(header::USER_AGENT)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned),
        }
    }
}

impl fmt::Display for RequestOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip {
            Some(ip) => write!(f, "{}", ip),
            None => f.write_str("unknown"),
        }
    }
}

/// First address in X-Forwarded-For (reverse proxy setups)
pub fn forwarded_ip(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .and_then(|first| first.trim().parse::<IpAddr>().ok())
}
