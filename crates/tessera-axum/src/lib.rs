//! Tessera Axum Integration
//!
//! Axum extractors and response parts for stateless cookie sessions.
//!
//! # Quick Start
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use tessera_axum::{RequireSession, SessionAuth};
//!
//! async fn me(RequireSession(session): RequireSession) -> String {
//!     format!("Hello, {}!", session.user.id)
//! }
//!
//! let auth = SessionAuth::from_config(&tessera_core::TesseraConfig::from_env()?)?;
//! let app = Router::new().route("/me", get(me)).with_state(auth);
//! ```
//!
//! # Extractors
//!
//! - [`RequireSession`] - Requires a valid session cookie (401 if missing)
//! - [`MaybeSession`] - Optional session (None if missing or invalid)
//! - [`CsrfVerified`] - Double-submit CSRF check on unsafe methods (403 on mismatch)
//!
//! # Response parts
//!
//! - [`SetAuthCookies`], [`ClearAuthCookies`], [`SetCsrfCookie`]

pub mod cookies;
pub mod error;
pub mod extractors;
pub mod state;

pub use cookies::{ClearAuthCookies, SetAuthCookies, SetCsrfCookie};
pub use error::AuthError;
pub use extractors::{CsrfVerified, MaybeSession, RequireSession, CSRF_HEADER};
pub use state::SessionAuth;
