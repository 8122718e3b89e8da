//! Server Configuration

use axum::http::HeaderValue;

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:3000,http://127.0.0.1:3000";

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Browser origins allowed by CORS
    pub frontend_origins: Vec<HeaderValue>,
}

impl ServerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub fn from_vars<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(v) => v
                .trim()
                .parse()
                .map_err(|e| anyhow::anyhow!("PORT is invalid: {}", e))?,
            None => DEFAULT_PORT,
        };

        let origins = var("FRONTEND_ORIGINS").unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string());
        let frontend_origins = origins
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        Ok(Self {
            port,
            frontend_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_vars(|_| None).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.frontend_origins.len(), 2);
    }

    #[test]
    fn test_from_vars() {
        let config = ServerConfig::from_vars(|key| match key {
            "PORT" => Some("8080".into()),
            "FRONTEND_ORIGINS" => Some("https://certiq.example, https://admin.certiq.example".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.frontend_origins[1], "https://admin.certiq.example");

        assert!(ServerConfig::from_vars(|key| (key == "PORT").then(|| "http".into())).is_err());
    }
}
