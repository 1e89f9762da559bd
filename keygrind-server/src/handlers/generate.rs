use std::path::PathBuf;

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::info;

use keygrind_core::config::DEFAULT_ITERATION_BITS;
use keygrind_core::{SearchSpec, device, run_search};

use crate::AppState;
use crate::errors::{ApiError, ApiResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerateRequest {
    pub starts_with: String,
    pub ends_with: String,
    pub count: usize,
    pub output_dir: String,
    pub select_device: bool,
    pub iteration_bits: u8,
    pub is_case_sensitive: bool,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        Self {
            starts_with: String::new(),
            ends_with: String::new(),
            count: 1,
            output_dir: "./".to_string(),
            select_device: false,
            iteration_bits: DEFAULT_ITERATION_BITS,
            is_case_sensitive: true,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub message: String,
    pub count: usize,
}

/// Search for vanity keypairs until the requested count is reached.
///
/// Validation happens before any device is touched; the search itself
/// runs on a blocking thread since the round loop blocks on its worker
/// pool between rounds.
pub async fn generate_keypairs(
    State(_state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> ApiResult<Json<GenerateResponse>> {
    let spec = SearchSpec::new(
        request.starts_with,
        request.ends_with,
        request.is_case_sensitive,
        request.count,
        request.iteration_bits,
    )?;

    let output_dir = PathBuf::from(&request.output_dir);
    tokio::fs::create_dir_all(&output_dir)
        .await
        .map_err(|e| ApiError::bad_request(format!("cannot create output directory: {e}")))?;

    info!(
        "Searching keypairs with starts_with='{}', ends_with='{}', case_sensitive={}",
        spec.prefix(),
        spec.suffix(),
        if spec.case_sensitive() { "on" } else { "off" }
    );

    let select_device = request.select_device;
    let summary = tokio::task::spawn_blocking(move || -> keygrind_core::Result<_> {
        let roster = if select_device {
            device::choose_interactively()?
        } else {
            device::enumerate_all()?
        };
        info!("Using {} OpenCL device(s)", roster.len());
        run_search(spec, &roster, &output_dir)
    })
    .await
    .map_err(|e| ApiError::internal(format!("search task panicked: {e}")))??;

    Ok(Json(GenerateResponse {
        message: format!("Generated {} keypair(s)", summary.accepted),
        count: summary.accepted,
    }))
}
