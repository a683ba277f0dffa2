//! Axum extractors for session authentication and CSRF checks.
//!
//! # Usage
//!
//! ```ignore
//! use tessera_axum::{CsrfVerified, MaybeSession, RequireSession};
//!
//! // 401 if there is no valid session cookie
//! async fn protected(RequireSession(session): RequireSession) -> String {
//!     format!("Hello, {}!", session.user.id)
//! }
//!
//! // Never rejects
//! async fn landing(MaybeSession(session): MaybeSession) -> String {
//!     match session {
//!         Some(s) => format!("Hello, {}!", s.user.id),
//!         None => "Hello, guest!".to_string(),
//!     }
//! }
//!
//! // 403 unless the CSRF cookie is echoed in `X-CSRF-Token`
//! async fn update(_: CsrfVerified, RequireSession(session): RequireSession) {}
//! ```

use std::convert::Infallible;
use std::ops::Deref;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum::http::Method;

use tessera_core::{csrf_tokens_match, parse_cookie_header, CookieRole, HeaderSource, COOKIE};
use tessera_types::Session;

use crate::error::AuthError;
use crate::state::SessionAuth;

/// Request header the client echoes the CSRF cookie value in
pub const CSRF_HEADER: &str = "x-csrf-token";

/// Extractor that requires a valid session.
///
/// Returns 401 Unauthorized if no valid session cookie is present.
#[derive(Debug, Clone)]
pub struct RequireSession(pub Session);

impl Deref for RequireSession {
    type Target = Session;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequireSession
where
    SessionAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = SessionAuth::from_ref(state);
        auth.resolver
            .resolve(&parts.headers)
            .map(Self)
            .ok_or(AuthError::Unauthenticated)
    }
}

/// Extractor for optional authentication.
///
/// Returns `None` for a missing, invalid or expired session rather than failing.
#[derive(Debug, Clone)]
pub struct MaybeSession(pub Option<Session>);

impl Deref for MaybeSession {
    type Target = Option<Session>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    SessionAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let auth = SessionAuth::from_ref(state);
        Ok(Self(auth.resolver.resolve(&parts.headers)))
    }
}

/// Double-submit CSRF guard.
///
/// Safe methods (GET, HEAD, OPTIONS, TRACE) pass. Anything else must carry
/// an [`CSRF_HEADER`] equal to the CSRF cookie, or gets 403.
#[derive(Debug, Clone, Copy)]
pub struct CsrfVerified;

#[async_trait]
impl<S> FromRequestParts<S> for CsrfVerified
where
    SessionAuth: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if is_safe_method(&parts.method) {
            return Ok(Self);
        }

        let auth = SessionAuth::from_ref(state);
        let cookie_name = auth.policy.cookie_name(CookieRole::Csrf);
        let cookie_header = parts.headers.header(COOKIE);
        let cookies = parse_cookie_header(cookie_header.as_deref());

        let echoed = parts
            .headers
            .get(CSRF_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        let expected = cookies.get(cookie_name).map(String::as_str).unwrap_or_default();

        if csrf_tokens_match(expected, echoed) {
            Ok(Self)
        } else {
            tracing::debug!(method = %parts.method, "CSRF check failed");
            Err(AuthError::CsrfMismatch)
        }
    }
}

fn is_safe_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::OPTIONS | Method::TRACE
    )
}
