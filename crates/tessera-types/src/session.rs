//! Session and token types

use serde::{Deserialize, Serialize};

use crate::User;

/// Verified, request-scoped view of a session token.
///
/// Only produced by the session resolver from a token whose signature and
/// expiry have been checked. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    /// Authenticated identity
    pub user: User,
    /// Issue timestamp (epoch seconds)
    pub issued_at: i64,
    /// Expiration timestamp (epoch seconds)
    pub expires_at: i64,
    /// Raw access token the session was derived from
    #[serde(skip)]
    pub access_token: String,
}

impl Session {
    /// Seconds of validity left at `now`, zero once expired
    pub fn remaining_secs(&self, now: i64) -> i64 {
        (self.expires_at - now).max(0)
    }
}

/// Token bundle issued by a login or refresh flow, ready for cookie transport
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct AuthTokens {
    /// Signed access token (session cookie)
    pub access_token: String,
    /// Refresh token (refresh cookie)
    pub refresh_token: String,
    /// CSRF token (script-readable cookie)
    pub csrf_token: String,
}

impl AuthTokens {
    /// Bundle the three tokens
    pub fn new(
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
        csrf_token: impl Into<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
            csrf_token: csrf_token.into(),
        }
    }
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens").finish_non_exhaustive()
    }
}
