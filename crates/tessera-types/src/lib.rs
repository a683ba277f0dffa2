//! Tessera Types - Shared domain types
//!
//! This crate contains the plain data types passed between tessera crates:
//! - User identity carried inside a session token
//! - The request-scoped session derived from a verified token
//! - The outbound token bundle handed to the cookie policy

pub mod session;
pub mod user;

pub use session::*;
pub use user::*;
