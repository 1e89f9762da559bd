//! Tunables for the search host.
//!
//! Iteration bits size a single kernel dispatch: every dispatch sweeps
//! `2^iteration_bits` candidate seeds. A worker strings together
//! [`DISPATCHES_PER_ROUND`] dispatches per round, polling the round's
//! stop signal in between, so raising the bits trades cancellation
//! latency for per-dispatch throughput.

/// Default width of one kernel dispatch (2^24 candidates).
pub const DEFAULT_ITERATION_BITS: u8 = 24;

/// Lower bound keeps a dispatch large enough to amortize launch overhead.
pub const MIN_ITERATION_BITS: u8 = 8;

/// Upper bound keeps the candidate buffer within common device limits.
pub const MAX_ITERATION_BITS: u8 = 28;

/// Kernel dispatches a worker performs in one round before reporting back.
pub const DISPATCHES_PER_ROUND: usize = 16;
