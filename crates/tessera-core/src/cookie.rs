//! Cookie policy and `Cookie` header parsing
//!
//! Each cookie role has a fixed attribute set:
//!
//! | Role    | Path          | SameSite | HttpOnly |
//! |---------|---------------|----------|----------|
//! | session | `/`           | Lax      | yes      |
//! | refresh | API prefix    | Strict   | yes      |
//! | csrf    | `/`           | Lax      | no       |
//!
//! All three are always `Secure`. Only `Max-Age` varies per call.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::collections::HashMap;

use tessera_types::AuthTokens;

use crate::config::CookieConfig;
use crate::headers::SetCookieSink;
use crate::ConfigError;

/// Characters left unescaped in cookie values (same set as JavaScript's
/// `encodeURIComponent`)
const COOKIE_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// `SameSite` cookie attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Lax,
    Strict,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lax => "Lax",
            Self::Strict => "Strict",
            Self::None => "None",
        }
    }
}

impl std::fmt::Display for SameSite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Purpose of a cookie, which fixes its attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CookieRole {
    /// Access token, sent on top-level navigation
    Session,
    /// Refresh token, narrow path, never sent cross-site
    Refresh,
    /// CSRF token, readable by client script
    Csrf,
}

impl CookieRole {
    /// Roles in the order cookies are emitted
    pub const ALL: [CookieRole; 3] = [Self::Session, Self::Refresh, Self::Csrf];

    pub fn same_site(&self) -> SameSite {
        match self {
            Self::Session | Self::Csrf => SameSite::Lax,
            Self::Refresh => SameSite::Strict,
        }
    }

    pub fn http_only(&self) -> bool {
        !matches!(self, Self::Csrf)
    }
}

/// Optional `Max-Age` values for [`CookiePolicy::build_set_cookies_with_max_age`].
///
/// `None` issues a browser-session cookie. Negative values are clamped to 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CookieMaxAge {
    /// Session (access token) cookie lifetime in seconds
    pub access: Option<i64>,
    /// Refresh cookie lifetime in seconds
    pub refresh: Option<i64>,
}

/// Builds `Set-Cookie` header values for the three auth cookies
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    config: CookieConfig,
}

impl CookiePolicy {
    /// Create a policy, rejecting an invalid cookie configuration
    pub fn new(config: CookieConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CookieConfig {
        &self.config
    }

    /// Cookie name for a role
    pub fn cookie_name(&self, role: CookieRole) -> &str {
        match role {
            CookieRole::Session => &self.config.session_cookie_name,
            CookieRole::Refresh => &self.config.refresh_cookie_name,
            CookieRole::Csrf => &self.config.csrf_cookie_name,
        }
    }

    /// `Path` attribute for a role
    pub fn path(&self, role: CookieRole) -> &str {
        match role {
            CookieRole::Session | CookieRole::Csrf => "/",
            CookieRole::Refresh => &self.config.refresh_path,
        }
    }

    /// Session, refresh and CSRF cookies, in that order, without `Max-Age`
    pub fn build_set_cookies(&self, tokens: &AuthTokens) -> [String; 3] {
        self.build_set_cookies_with_max_age(tokens, CookieMaxAge::default())
    }

    /// Session, refresh and CSRF cookies with explicit lifetimes.
    ///
    /// The CSRF cookie never carries `Max-Age`.
    pub fn build_set_cookies_with_max_age(
        &self,
        tokens: &AuthTokens,
        max_age: CookieMaxAge,
    ) -> [String; 3] {
        [
            self.render(CookieRole::Session, &tokens.access_token, max_age.access),
            self.render(CookieRole::Refresh, &tokens.refresh_token, max_age.refresh),
            self.render(CookieRole::Csrf, &tokens.csrf_token, None),
        ]
    }

    /// Empty-valued, `Max-Age=0` variants of all three cookies
    pub fn build_clear_cookies(&self) -> [String; 3] {
        CookieRole::ALL.map(|role| self.render(role, "", Some(0)))
    }

    /// A single cookie for `role`
    pub fn build_cookie(&self, role: CookieRole, value: &str, max_age: Option<i64>) -> String {
        self.render(role, value, max_age)
    }

    /// Append the three auth cookies to a response
    pub fn write_set_cookies(
        &self,
        sink: &mut impl SetCookieSink,
        tokens: &AuthTokens,
        max_age: CookieMaxAge,
    ) {
        for cookie in self.build_set_cookies_with_max_age(tokens, max_age) {
            sink.append_set_cookie(cookie);
        }
    }

    /// Append the three clearing cookies to a response
    pub fn write_clear_cookies(&self, sink: &mut impl SetCookieSink) {
        for cookie in self.build_clear_cookies() {
            sink.append_set_cookie(cookie);
        }
    }

    fn render(&self, role: CookieRole, value: &str, max_age: Option<i64>) -> String {
        let mut parts = Vec::with_capacity(7);
        parts.push(format!(
            "{}={}",
            self.cookie_name(role),
            utf8_percent_encode(value, COOKIE_VALUE)
        ));
        if let Some(domain) = &self.config.domain {
            parts.push(format!("Domain={domain}"));
        }
        parts.push(format!("Path={}", self.path(role)));
        if let Some(max_age) = max_age {
            parts.push(format!("Max-Age={}", max_age.max(0)));
        }
        parts.push(format!("SameSite={}", role.same_site()));
        parts.push("Secure".to_string());
        if role.http_only() {
            parts.push("HttpOnly".to_string());
        }
        parts.join("; ")
    }
}

/// Decode a `Cookie` request header into a name → value map.
///
/// Never fails: an absent or empty header yields an empty map, and pairs
/// without `=`, with an empty name, or with undecodable percent-encoding are
/// skipped. A repeated name keeps its last value.
pub fn parse_cookie_header(header: Option<&str>) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    let Some(header) = header else {
        return cookies;
    };

    for pair in header.split(';') {
        let Some((name, value)) = pair.trim().split_once('=') else {
            continue;
        };
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        match percent_decode_str(value.trim()).decode_utf8() {
            Ok(decoded) => {
                cookies.insert(name.to_string(), decoded.into_owned());
            }
            Err(_) => {
                tracing::debug!(cookie = name, "Skipping cookie with invalid percent-encoding");
            }
        }
    }

    cookies
}
