//! Router assembly

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/session", get(handlers::session))
        .route("/api/v1/csrf", get(handlers::csrf))
        .route("/api/v1/logout", post(handlers::logout))
        .with_state(state)
}
