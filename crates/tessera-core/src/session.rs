//! Session resolution
//!
//! Turns request headers into a verified [`Session`] or nothing. Every
//! failure (no cookie, bad token, expired token) collapses to `None`; the
//! reason is only logged.

use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

use tessera_types::{Session, User};

use crate::clock::Clock;
use crate::config::TesseraConfig;
use crate::cookie::parse_cookie_header;
use crate::headers::{HeaderSource, COOKIE};
use crate::token::{Claims, TokenCodec};
use crate::TokenError;

/// Resolves the session cookie of a request into a [`Session`]
#[derive(Debug, Clone)]
pub struct SessionResolver {
    codec: TokenCodec,
    session_cookie_name: String,
}

impl SessionResolver {
    /// Create a resolver using the wall clock
    pub fn new(config: &TesseraConfig) -> Self {
        Self::with_codec(config, TokenCodec::new(config.signing_key().clone()))
    }

    /// Create a resolver with a custom time source
    pub fn with_clock(config: &TesseraConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_codec(
            config,
            TokenCodec::with_clock(config.signing_key().clone(), clock),
        )
    }

    fn with_codec(config: &TesseraConfig, codec: TokenCodec) -> Self {
        Self {
            codec,
            session_cookie_name: config.cookies().session_cookie_name.clone(),
        }
    }

    /// Codec used for verification (same key and clock)
    pub fn codec(&self) -> &TokenCodec {
        &self.codec
    }

    /// Resolve a session from request headers
    pub fn resolve(&self, headers: &impl HeaderSource) -> Option<Session> {
        let header = headers.header(COOKIE);
        self.resolve_cookie_header(header.as_deref())
    }

    /// Resolve a session from a raw `Cookie` header value
    pub fn resolve_cookie_header(&self, header: Option<&str>) -> Option<Session> {
        let mut cookies = parse_cookie_header(header);
        let token = cookies
            .remove(&self.session_cookie_name)
            .filter(|t| !t.is_empty())?;

        match self.session_from_token(token) {
            Ok(session) => Some(session),
            Err(e) => {
                tracing::debug!(error_code = e.error_code(), "Session token rejected");
                None
            }
        }
    }

    fn session_from_token(&self, token: String) -> Result<Session, TokenError> {
        let claims = self.codec.verify(&token)?;
        let user = identity_from_claims(&claims)?;
        let issued_at = claims.issued_at().unwrap_or_else(|| self.codec.now());
        let expires_at = claims.expires_at().unwrap_or(issued_at);

        Ok(Session {
            user,
            issued_at,
            expires_at,
            access_token: token,
        })
    }
}

/// Identity placed on sessions whose token names no subject
pub const UNKNOWN_SUBJECT: &str = "unknown";

/// Structured `user` claim, else a minimal user synthesized from `sub`.
///
/// The `sub` fallback keeps minimal tokens working; whether it should stay
/// is pending product confirmation. A missing or non-string `sub` becomes
/// [`UNKNOWN_SUBJECT`]; an empty one is kept as is.
fn identity_from_claims(claims: &Claims) -> Result<User, TokenError> {
    match claims.get(Claims::USER) {
        Some(Value::Null) | None => Ok(User::new(claims.subject().unwrap_or(UNKNOWN_SUBJECT))),
        Some(user) => User::deserialize(user).map_err(|_| TokenError::Malformed),
    }
}
