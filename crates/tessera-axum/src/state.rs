//! Shared session components for handlers

use std::sync::Arc;

use tessera_core::{ConfigError, CookiePolicy, SessionResolver, TesseraConfig};

/// Resolver and cookie policy, built once at startup.
///
/// Extractors find it through `FromRef`, so it can be the router state
/// itself or a field of a larger application state.
#[derive(Debug, Clone)]
pub struct SessionAuth {
    pub resolver: Arc<SessionResolver>,
    pub policy: Arc<CookiePolicy>,
}

impl SessionAuth {
    pub fn new(resolver: SessionResolver, policy: CookiePolicy) -> Self {
        Self {
            resolver: Arc::new(resolver),
            policy: Arc::new(policy),
        }
    }

    /// Build both components from a validated configuration
    pub fn from_config(config: &TesseraConfig) -> Result<Self, ConfigError> {
        let policy = CookiePolicy::new(config.cookies().clone())?;
        Ok(Self::new(SessionResolver::new(config), policy))
    }
}
