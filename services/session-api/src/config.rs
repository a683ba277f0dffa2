//! Configuration for the Session API service.

use tessera_core::TesseraConfig;

const DEFAULT_HTTP_PORT: u16 = 8080;

/// Session API configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub http_port: u16,

    /// Signing key and cookie settings
    pub auth: TesseraConfig,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let http_port = match lookup("HTTP_PORT").filter(|v| !v.is_empty()) {
            Some(port) => port.parse().map_err(|_| ConfigError::Invalid("HTTP_PORT"))?,
            None => DEFAULT_HTTP_PORT,
        };

        let auth = TesseraConfig::from_lookup(&lookup)?;

        Ok(Self { http_port, auth })
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error(transparent)]
    Auth(#[from] tessera_core::ConfigError),
}
