//! HTTP surface of the Keygrind search service.

pub mod errors;
pub mod handlers;
pub mod infra;
pub mod routes;

pub use infra::app_state::AppState;
pub use infra::config::ServerConfig;
