//! Error types

use thiserror::Error;

/// Token verification errors.
///
/// These reach the direct caller of the codec for logging and metrics. The
/// session resolver collapses all of them into "no session".
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Wrong segment count, bad encoding, or undecodable header/payload
    #[error("malformed token")]
    Malformed,

    /// Recomputed digest does not match the supplied one
    #[error("invalid token signature")]
    SignatureInvalid,

    /// Signature is valid but `exp` has passed
    #[error("token expired")]
    Expired,
}

impl TokenError {
    /// Get a stable error code for logs
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Malformed => "TOKEN_MALFORMED",
            Self::SignatureInvalid => "SIGNATURE_INVALID",
            Self::Expired => "TOKEN_EXPIRED",
        }
    }
}

/// A single invalid configuration field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Name of the offending setting (environment variable name)
    pub field: &'static str,
    /// What is wrong with it
    pub message: String,
}

impl ConfigIssue {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Startup configuration error, fatal to the process
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// One or more settings failed validation
    #[error("invalid configuration: {}", join_issues(.0))]
    Invalid(Vec<ConfigIssue>),
}

impl ConfigError {
    /// Every invalid field, in the order they were checked
    pub fn issues(&self) -> &[ConfigIssue] {
        match self {
            Self::Invalid(issues) => issues,
        }
    }

    /// Turn collected issues into a result
    pub(crate) fn check(issues: Vec<ConfigIssue>) -> Result<(), Self> {
        if issues.is_empty() {
            Ok(())
        } else {
            Err(Self::Invalid(issues))
        }
    }
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
