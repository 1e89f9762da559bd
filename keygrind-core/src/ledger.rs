//! Acceptance and persistence of found keypairs.

use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::address::{derive_address, derive_public_key};
use crate::error::Result;
use crate::search::worker::WorkerOutcome;
use crate::spec::SearchSpec;

/// Sink for the outcomes of one round.
///
/// Called once per round from the orchestrator thread, strictly between
/// rounds, and returns how many results it newly accepted.
pub trait ResultLedger {
    fn persist(&self, outcomes: &[WorkerOutcome], output_dir: &Path) -> Result<usize>;
}

/// Ledger that writes accepted keypairs to disk, one JSON file per
/// address, in the 64-byte `[secret || public]` array layout wallets
/// import directly.
///
/// Every candidate is re-derived on the CPU and re-checked against the
/// spec before it counts; a candidate that raced the kernel's match
/// test or came back corrupted is dropped, not persisted.
#[derive(Debug)]
pub struct KeypairLedger {
    spec: Arc<SearchSpec>,
    seen: Mutex<HashSet<String>>,
}

impl KeypairLedger {
    pub fn new(spec: Arc<SearchSpec>) -> Self {
        Self {
            spec,
            seen: Mutex::new(HashSet::new()),
        }
    }
}

impl ResultLedger for KeypairLedger {
    fn persist(&self, outcomes: &[WorkerOutcome], output_dir: &Path) -> Result<usize> {
        let mut accepted = 0usize;
        let mut seen = self.seen.lock();

        for (index, outcome) in outcomes.iter().enumerate() {
            let WorkerOutcome::Found(candidate) = outcome else {
                continue;
            };

            let address = derive_address(&candidate.seed);
            if !self.spec.matches(&address) {
                warn!("Worker {index} reported {address}, which does not match; dropping");
                continue;
            }

            if seen.contains(&address) {
                debug!("Duplicate result for {address}, already accepted this request");
                continue;
            }

            let path = output_dir.join(format!("{address}.json"));
            if path.exists() {
                debug!("Result for {address} already on disk, skipping");
                seen.insert(address);
                continue;
            }

            let keypair = keypair_bytes(&candidate.seed);
            fs::write(&path, serde_json::to_string(&keypair.to_vec())?)?;
            seen.insert(address.clone());
            accepted += 1;
            info!("Accepted {address} -> {}", path.display());
        }

        Ok(accepted)
    }
}

fn keypair_bytes(seed: &[u8; 32]) -> [u8; 64] {
    let mut keypair = [0u8; 64];
    keypair[..32].copy_from_slice(seed);
    keypair[32..].copy_from_slice(&derive_public_key(seed));
    keypair
}
