//! # Keygrind Server
//!
//! Vanity keypair search service.
//!
//! ## Overview
//!
//! Keygrind brute-forces ed25519 keypairs on OpenCL accelerators until
//! the base58 address matches a requested prefix/suffix pattern, and
//! exposes the search as a request/response HTTP API:
//!
//! - **`POST /api/v1/generate`**: run a search until the requested
//!   number of keypairs has been accepted and written to disk
//! - **`GET /api/v1/health`**: liveness probe
//!
//! ## Architecture
//!
//! The server is built on Axum; the search itself lives in
//! `keygrind-core` and runs on a dedicated worker pool, one worker per
//! accelerator, in synchronized rounds.

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use keygrind_server::{AppState, ServerConfig, routes};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "keygrind-server")]
#[command(about = "Vanity keypair search service over OpenCL accelerators")]
struct Cli {
    /// Server host (overrides config)
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port (overrides config)
    #[arg(short, long, env = "SERVER_PORT", default_value_t = 8000)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let config = ServerConfig {
        host: cli.host,
        port: cli.port,
    };
    let bind_address = config.bind_address();

    let state = AppState::new(config);
    let router = routes::create_api_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("failed to bind {bind_address}"))?;
    info!("Keygrind server listening on {bind_address}");

    axum::serve(listener, router)
        .await
        .context("server exited with an error")?;

    Ok(())
}
