//! Application state

use axum::extract::FromRef;
use tessera_axum::SessionAuth;

use crate::config::Config;

/// Application state shared across handlers
#[derive(Debug, Clone)]
pub struct AppState {
    /// Session resolver and cookie policy
    pub auth: SessionAuth,
}

impl AppState {
    pub fn new(config: &Config) -> Result<Self, tessera_core::ConfigError> {
        Ok(Self {
            auth: SessionAuth::from_config(&config.auth)?,
        })
    }
}

impl FromRef<AppState> for SessionAuth {
    fn from_ref(state: &AppState) -> Self {
        state.auth.clone()
    }
}
