//! The round-based search engine: signal, workers, orchestrator.

pub mod orchestrator;
pub mod signal;
pub mod worker;

pub use orchestrator::{RoundOrchestrator, SearchSummary};
pub use signal::RoundSignal;
pub use worker::{GpuWorker, KeyCandidate, SearchWorker, WorkerOutcome};

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::device::ResolvedDevice;
use crate::error::Result;
use crate::kernel::build_kernel_source;
use crate::ledger::KeypairLedger;
use crate::spec::SearchSpec;

/// Run one full search request on the given device roster.
///
/// Compiles the search program once, binds one GPU worker per roster
/// entry, and drives the round loop until the spec's quota is met.
/// Blocking; callers on an async runtime should run it on a blocking
/// thread.
pub fn run_search(
    spec: SearchSpec,
    roster: &[ResolvedDevice],
    output_dir: &Path,
) -> Result<SearchSummary> {
    let spec = Arc::new(spec);
    let kernel_source = build_kernel_source(&spec);

    let workers = roster
        .iter()
        .enumerate()
        .map(|(index, device)| GpuWorker::bind(index, device, Arc::clone(&spec), &kernel_source))
        .collect::<Result<Vec<_>>>()?;

    info!("Worker pool ready: {} device(s)", workers.len());

    let ledger = KeypairLedger::new(Arc::clone(&spec));
    let orchestrator = RoundOrchestrator::new(spec, workers, ledger)?;
    orchestrator.run(output_dir)
}
