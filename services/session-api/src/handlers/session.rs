//! Session handlers (who am I, CSRF token, logout)

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tessera_axum::{ClearAuthCookies, CsrfVerified, RequireSession, SetCsrfCookie};
use tessera_core::generate_csrf_token;
use tessera_types::User;

use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub issued_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Serialize)]
pub struct CsrfResponse {
    pub csrf_token: String,
}

#[derive(Debug, Serialize)]
pub struct LogoutResponse {
    pub success: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/session
///
/// Identity carried by the session cookie
pub async fn session(RequireSession(session): RequireSession) -> Json<SessionResponse> {
    Json(SessionResponse {
        user: session.user,
        issued_at: session.issued_at,
        expires_at: session.expires_at,
    })
}

/// GET /api/v1/csrf
///
/// Issue a fresh CSRF token as both cookie and body
pub async fn csrf(State(state): State<AppState>) -> (SetCsrfCookie, Json<CsrfResponse>) {
    let token = generate_csrf_token();
    (
        SetCsrfCookie::new(&state.auth, token.clone()),
        Json(CsrfResponse { csrf_token: token }),
    )
}

/// POST /api/v1/logout
///
/// Expire all auth cookies. Works without a valid session so stale
/// cookies can always be cleared.
pub async fn logout(
    State(state): State<AppState>,
    _csrf: CsrfVerified,
) -> (ClearAuthCookies, Json<LogoutResponse>) {
    tracing::debug!("Clearing auth cookies");
    (
        ClearAuthCookies::new(&state.auth),
        Json(LogoutResponse { success: true }),
    )
}
