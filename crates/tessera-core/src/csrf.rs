//! CSRF double-submit tokens

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};

use crate::crypto::constant_time_str_eq;

/// Random bytes per CSRF token
pub const CSRF_TOKEN_BYTES: usize = 32;

/// Generate a fresh CSRF token: 32 bytes from the OS CSPRNG, base64url-encoded
pub fn generate_csrf_token() -> String {
    let mut bytes = [0u8; CSRF_TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Compare the CSRF cookie with the value echoed in a request header.
///
/// Constant-time; an empty value on either side never matches.
pub fn csrf_tokens_match(cookie_value: &str, header_value: &str) -> bool {
    !cookie_value.is_empty() && constant_time_str_eq(cookie_value, header_value)
}
