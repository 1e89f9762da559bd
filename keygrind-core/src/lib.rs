//! # Keygrind Core
//!
//! Brute-force vanity keypair search across OpenCL accelerators.
//!
//! A request is described by a [`SearchSpec`] and executed by the
//! [`search::RoundOrchestrator`]: one worker per accelerator, driven in
//! synchronized rounds with cooperative early-stop inside a round, until
//! the requested number of results has been accepted and persisted by
//! the [`ledger::KeypairLedger`].

pub mod address;
pub mod config;
pub mod device;
pub mod error;
pub mod kernel;
pub mod ledger;
pub mod search;
pub mod spec;

pub use device::ResolvedDevice;
pub use error::{KeygrindError, Result};
pub use search::{run_search, SearchSummary};
pub use spec::SearchSpec;
