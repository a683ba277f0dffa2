//! HTTP handlers

mod health;
mod session;

pub use health::health;
pub use session::{csrf, logout, session};
