use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;
use crate::handlers::{generate, health};

/// Create all v1 API routes
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/generate", post(generate::generate_keypairs))
        .route("/health", get(health::health))
}
