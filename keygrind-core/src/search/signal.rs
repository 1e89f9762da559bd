//! Round-scoped cooperative stop signal.

use parking_lot::Mutex;

/// Shared stop flag for the workers of a single round.
///
/// The orchestrator allocates a fresh signal at the start of every
/// round and drops it at the end, so a stop from one round can never
/// truncate the next. All reads and writes go through the mutex; a
/// worker that finds a match requests a stop, and its siblings observe
/// it between kernel dispatches.
#[derive(Debug, Default)]
pub struct RoundSignal {
    stop: Mutex<bool>,
}

impl RoundSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every sibling worker to wind down. Idempotent.
    pub fn request_stop(&self) {
        *self.stop.lock() = true;
    }

    /// Whether some worker already found a match this round.
    pub fn should_stop(&self) -> bool {
        *self.stop.lock()
    }
}
