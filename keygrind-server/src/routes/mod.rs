pub mod v1;

use crate::AppState;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Create the main API router with all versions
pub fn create_api_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", v1::create_v1_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
