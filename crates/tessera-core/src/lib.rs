//! Tessera Core - Stateless cookie session authentication
//!
//! Signed tokens carry identity and expiry, so every request is verified
//! without a session store. The crate is split into:
//! - [`token`]: HS256 token signing and verification
//! - [`cookie`]: `Set-Cookie` construction per cookie role and `Cookie` header parsing
//! - [`session`]: turning request headers into a [`Session`] or nothing
//! - [`config`]: startup-validated signing key and cookie names

pub mod clock;
pub mod config;
pub mod cookie;
pub mod crypto;
pub mod csrf;
pub mod error;
pub mod headers;
pub mod session;
pub mod token;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CookieConfig, TesseraConfig};
pub use cookie::{parse_cookie_header, CookieMaxAge, CookiePolicy, CookieRole, SameSite};
pub use crypto::{constant_time_eq, constant_time_str_eq, HmacKey, HmacKeyError};
pub use csrf::{csrf_tokens_match, generate_csrf_token};
pub use error::{ConfigError, ConfigIssue, TokenError};
pub use headers::{HeaderSource, SetCookieSink, COOKIE, SET_COOKIE};
pub use session::{SessionResolver, UNKNOWN_SUBJECT};
pub use token::{Claims, TokenCodec};

pub use tessera_types::{AuthTokens, Session, User};
