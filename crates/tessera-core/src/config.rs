//! Configuration types
//!
//! Loaded and validated once at startup. A [`TesseraConfig`] that exists is
//! valid; components take it by reference and never re-check it.

use crate::crypto::{HmacKey, HmacKeyError};
use crate::error::{ConfigError, ConfigIssue};

pub const ENV_SIGNING_KEY: &str = "JWT_SIGNING_KEY";
pub const ENV_SESSION_COOKIE_NAME: &str = "SESSION_COOKIE_NAME";
pub const ENV_REFRESH_COOKIE_NAME: &str = "REFRESH_COOKIE_NAME";
pub const ENV_CSRF_COOKIE_NAME: &str = "CSRF_COOKIE_NAME";
pub const ENV_COOKIE_DOMAIN: &str = "COOKIE_DOMAIN";
pub const ENV_REFRESH_COOKIE_PATH: &str = "REFRESH_COOKIE_PATH";

pub const DEFAULT_SESSION_COOKIE_NAME: &str = "at";
pub const DEFAULT_REFRESH_COOKIE_NAME: &str = "rt";
pub const DEFAULT_CSRF_COOKIE_NAME: &str = "csrf";
pub const DEFAULT_REFRESH_COOKIE_PATH: &str = "/api";

/// Cookie names and scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieConfig {
    /// Cookie carrying the access token
    pub session_cookie_name: String,
    /// Cookie carrying the refresh token
    pub refresh_cookie_name: String,
    /// Script-readable cookie carrying the CSRF token
    pub csrf_cookie_name: String,
    /// `Domain` attribute; `None` scopes cookies to the exact host
    pub domain: Option<String>,
    /// `Path` attribute of the refresh cookie (the API prefix)
    pub refresh_path: String,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: DEFAULT_SESSION_COOKIE_NAME.to_string(),
            refresh_cookie_name: DEFAULT_REFRESH_COOKIE_NAME.to_string(),
            csrf_cookie_name: DEFAULT_CSRF_COOKIE_NAME.to_string(),
            domain: None,
            refresh_path: DEFAULT_REFRESH_COOKIE_PATH.to_string(),
        }
    }
}

impl CookieConfig {
    /// Set the cookie domain
    #[must_use]
    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// Set the refresh cookie path
    #[must_use]
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }

    /// Set all three cookie names
    #[must_use]
    pub fn with_names(
        mut self,
        session: impl Into<String>,
        refresh: impl Into<String>,
        csrf: impl Into<String>,
    ) -> Self {
        self.session_cookie_name = session.into();
        self.refresh_cookie_name = refresh.into();
        self.csrf_cookie_name = csrf.into();
        self
    }

    /// Check every field, reporting all problems at once
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut issues = Vec::new();
        self.collect_issues(&mut issues);
        ConfigError::check(issues)
    }

    fn collect_issues(&self, issues: &mut Vec<ConfigIssue>) {
        let names = [
            (ENV_SESSION_COOKIE_NAME, &self.session_cookie_name),
            (ENV_REFRESH_COOKIE_NAME, &self.refresh_cookie_name),
            (ENV_CSRF_COOKIE_NAME, &self.csrf_cookie_name),
        ];

        for (field, name) in names {
            if name.is_empty() {
                issues.push(ConfigIssue::new(field, "must not be empty"));
            } else if !name.bytes().all(is_cookie_token_byte) {
                issues.push(ConfigIssue::new(
                    field,
                    format!("{name:?} is not a valid cookie name"),
                ));
            }
        }

        for (i, &(field, name)) in names.iter().enumerate() {
            if names[..i].iter().any(|&(_, earlier)| earlier == name) {
                issues.push(ConfigIssue::new(
                    field,
                    format!("duplicates another cookie name ({name:?})"),
                ));
            }
        }

        if let Some(domain) = &self.domain {
            if domain.is_empty() || !domain.bytes().all(is_attribute_value_byte) {
                issues.push(ConfigIssue::new(
                    ENV_COOKIE_DOMAIN,
                    format!("{domain:?} is not a valid cookie domain"),
                ));
            }
        }

        if !self.refresh_path.starts_with('/') || !self.refresh_path.bytes().all(is_attribute_value_byte)
        {
            issues.push(ConfigIssue::new(
                ENV_REFRESH_COOKIE_PATH,
                format!("{:?} must be an absolute path without ';' or whitespace", self.refresh_path),
            ));
        }
    }
}

/// RFC 6265 cookie-name: visible ASCII minus separators
fn is_cookie_token_byte(b: u8) -> bool {
    b.is_ascii_graphic()
        && !matches!(
            b,
            b'(' | b')' | b'<' | b'>' | b'@' | b',' | b';' | b':' | b'\\' | b'"' | b'/' | b'['
                | b']' | b'?' | b'=' | b'{' | b'}'
        )
}

/// Attribute values may not contain `;`, `,`, whitespace or control bytes
fn is_attribute_value_byte(b: u8) -> bool {
    b.is_ascii_graphic() && b != b';' && b != b','
}

/// Process-wide authentication configuration
#[derive(Debug, Clone)]
pub struct TesseraConfig {
    signing_key: HmacKey,
    cookies: CookieConfig,
}

impl TesseraConfig {
    /// Validate and build a configuration
    pub fn new(signing_key: impl AsRef<[u8]>, cookies: CookieConfig) -> Result<Self, ConfigError> {
        let mut issues = Vec::new();
        let signing_key = match HmacKey::new(signing_key) {
            Ok(key) => Some(key),
            Err(e) => {
                issues.push(signing_key_issue(&e));
                None
            }
        };
        cookies.collect_issues(&mut issues);

        match signing_key {
            Some(signing_key) if issues.is_empty() => Ok(Self {
                signing_key,
                cookies,
            }),
            _ => Err(ConfigError::Invalid(issues)),
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let cookies = CookieConfig {
            session_cookie_name: get(ENV_SESSION_COOKIE_NAME)
                .unwrap_or_else(|| DEFAULT_SESSION_COOKIE_NAME.to_string()),
            refresh_cookie_name: get(ENV_REFRESH_COOKIE_NAME)
                .unwrap_or_else(|| DEFAULT_REFRESH_COOKIE_NAME.to_string()),
            csrf_cookie_name: get(ENV_CSRF_COOKIE_NAME)
                .unwrap_or_else(|| DEFAULT_CSRF_COOKIE_NAME.to_string()),
            domain: get(ENV_COOKIE_DOMAIN),
            refresh_path: get(ENV_REFRESH_COOKIE_PATH)
                .unwrap_or_else(|| DEFAULT_REFRESH_COOKIE_PATH.to_string()),
        };

        match get(ENV_SIGNING_KEY) {
            Some(key) => Self::new(key, cookies),
            None => {
                let mut issues = vec![ConfigIssue::new(ENV_SIGNING_KEY, "required")];
                cookies.collect_issues(&mut issues);
                Err(ConfigError::Invalid(issues))
            }
        }
    }

    pub fn signing_key(&self) -> &HmacKey {
        &self.signing_key
    }

    pub fn cookies(&self) -> &CookieConfig {
        &self.cookies
    }
}

fn signing_key_issue(err: &HmacKeyError) -> ConfigIssue {
    match err {
        HmacKeyError::KeyTooShort { len, min } => ConfigIssue::new(
            ENV_SIGNING_KEY,
            format!("must be at least {min} bytes (got {len})"),
        ),
        HmacKeyError::Rejected => ConfigIssue::new(ENV_SIGNING_KEY, err.to_string()),
    }
}
