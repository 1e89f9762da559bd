//! Round-based multi-worker search orchestrator.
//!
//! The orchestrator owns a worker pool of fixed width for the lifetime
//! of one request and drives it in strictly sequential rounds until the
//! ledger has accepted the requested number of results. Each round gets
//! a fresh [`RoundSignal`]; the per-round barrier guarantees that no
//! partial round ever reaches the ledger and that a stale stop cannot
//! leak into the next round.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{KeygrindError, Result};
use crate::ledger::ResultLedger;
use crate::search::signal::RoundSignal;
use crate::search::worker::{SearchWorker, WorkerOutcome};
use crate::spec::SearchSpec;

/// Final accounting for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSummary {
    /// Total results accepted by the ledger.
    pub accepted: usize,
    /// Rounds it took to reach the quota.
    pub rounds: usize,
}

/// Drives `workers` in rounds until `spec.quota()` results are accepted.
pub struct RoundOrchestrator<W, L> {
    spec: Arc<SearchSpec>,
    workers: Vec<W>,
    ledger: L,
    pool: rayon::ThreadPool,
}

impl<W, L> RoundOrchestrator<W, L>
where
    W: SearchWorker,
    L: ResultLedger + Sync,
{
    /// Build the pool. Width is fixed to `workers.len()` for the whole
    /// request; an empty roster is a caller bug surfaced as
    /// [`KeygrindError::NoDevices`] rather than a loop that spins on
    /// empty rounds.
    pub fn new(spec: Arc<SearchSpec>, workers: Vec<W>, ledger: L) -> Result<Self> {
        if workers.is_empty() {
            return Err(KeygrindError::NoDevices);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers.len())
            .thread_name(|index| format!("keygrind-worker-{index}"))
            .build()?;

        Ok(Self {
            spec,
            workers,
            ledger,
            pool,
        })
    }

    pub fn pool_width(&self) -> usize {
        self.workers.len()
    }

    /// Run rounds until the quota is met.
    ///
    /// Returns the total accepted count, which is never below the
    /// quota on success. Any worker or ledger error aborts the request;
    /// results persisted by earlier rounds stay on disk.
    pub fn run(&self, output_dir: &Path) -> Result<SearchSummary> {
        let quota = self.spec.quota();
        let mut accepted = 0usize;
        let mut rounds = 0usize;

        while accepted < quota {
            let signal = RoundSignal::new();
            let outcomes = self.run_round(&signal)?;
            rounds += 1;

            let newly_accepted = self.ledger.persist(&outcomes, output_dir)?;
            accepted += newly_accepted;

            debug!(
                "Round {rounds}: {} of {} workers matched, {newly_accepted} accepted \
                 ({accepted}/{quota} total)",
                outcomes.iter().filter(|o| o.is_found()).count(),
                self.workers.len(),
            );
        }

        info!("Search finished: {accepted} accepted over {rounds} round(s)");
        Ok(SearchSummary { accepted, rounds })
    }

    /// Dispatch one attempt per worker and wait for all of them.
    ///
    /// The broadcast runs worker `i` on pool thread `i` and returns in
    /// thread order, so the round result is already in worker-index
    /// order no matter which worker finished first. A single failure
    /// discards the whole round.
    fn run_round(&self, signal: &RoundSignal) -> Result<Vec<WorkerOutcome>> {
        let results = self
            .pool
            .broadcast(|ctx| self.workers[ctx.index()].search_once(signal));

        let mut outcomes = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    return Err(KeygrindError::WorkerFailed {
                        index,
                        message: e.to_string(),
                    });
                }
            }
        }
        Ok(outcomes)
    }
}

impl<W, L> std::fmt::Debug for RoundOrchestrator<W, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundOrchestrator")
            .field("pool_width", &self.workers.len())
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::worker::KeyCandidate;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::time::Duration;

    fn spec_with_quota(quota: usize) -> Arc<SearchSpec> {
        Arc::new(SearchSpec::new("a", "", true, quota, 24).unwrap())
    }

    fn found(tag: u8) -> WorkerOutcome {
        WorkerOutcome::Found(KeyCandidate { seed: [tag; 32] })
    }

    /// Worker that replays one scripted outcome per round and records
    /// the signal state it observed when the round started.
    struct ScriptedWorker {
        script: Mutex<VecDeque<Result<WorkerOutcome>>>,
        stop_seen_at_round_start: Mutex<Vec<bool>>,
        delay: Duration,
    }

    impl ScriptedWorker {
        fn new(script: Vec<Result<WorkerOutcome>>) -> Self {
            Self {
                script: Mutex::new(script.into_iter().collect()),
                stop_seen_at_round_start: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    impl SearchWorker for ScriptedWorker {
        fn search_once(&self, signal: &RoundSignal) -> Result<WorkerOutcome> {
            self.stop_seen_at_round_start.lock().push(signal.should_stop());
            if !self.delay.is_zero() {
                std::thread::sleep(self.delay);
            }

            let outcome = self
                .script
                .lock()
                .pop_front()
                .unwrap_or(Ok(WorkerOutcome::NotFound))?;
            if outcome.is_found() {
                signal.request_stop();
            }
            Ok(outcome)
        }
    }

    /// Ledger that counts every `Found` outcome as accepted and keeps
    /// each round it was handed.
    #[derive(Default)]
    struct RecordingLedger {
        rounds: Mutex<Vec<Vec<WorkerOutcome>>>,
    }

    impl ResultLedger for RecordingLedger {
        fn persist(&self, outcomes: &[WorkerOutcome], _output_dir: &Path) -> Result<usize> {
            self.rounds.lock().push(outcomes.to_vec());
            Ok(outcomes.iter().filter(|o| o.is_found()).count())
        }
    }

    struct FailingLedger;

    impl ResultLedger for FailingLedger {
        fn persist(&self, _outcomes: &[WorkerOutcome], _output_dir: &Path) -> Result<usize> {
            Err(std::io::Error::other("disk full").into())
        }
    }

    fn output_dir() -> PathBuf {
        PathBuf::from("unused")
    }

    #[test]
    fn test_empty_pool_is_rejected_before_any_round() {
        let result = RoundOrchestrator::new(
            spec_with_quota(1),
            Vec::<ScriptedWorker>::new(),
            RecordingLedger::default(),
        );
        assert!(matches!(result, Err(KeygrindError::NoDevices)));
    }

    #[test]
    fn test_runs_rounds_until_quota_reached() {
        // Q=1, N=2: round one misses on both workers, round two hits
        // on worker 0.
        let workers = vec![
            ScriptedWorker::new(vec![Ok(WorkerOutcome::NotFound), Ok(found(1))]),
            ScriptedWorker::new(vec![Ok(WorkerOutcome::NotFound), Ok(WorkerOutcome::NotFound)]),
        ];
        let orchestrator =
            RoundOrchestrator::new(spec_with_quota(1), workers, RecordingLedger::default())
                .unwrap();

        let summary = orchestrator.run(&output_dir()).unwrap();
        assert_eq!(summary, SearchSummary { accepted: 1, rounds: 2 });

        let rounds = orchestrator.ledger.rounds.lock();
        assert_eq!(rounds.len(), 2);
        assert!(rounds[0].iter().all(|o| !o.is_found()));
        assert!(rounds[1][0].is_found());
    }

    #[test]
    fn test_accepted_count_accumulates_across_rounds() {
        // Q=3, N=4: two hits in round one, one in round two.
        let workers = vec![
            ScriptedWorker::new(vec![Ok(WorkerOutcome::NotFound), Ok(found(0))]),
            ScriptedWorker::new(vec![Ok(found(1))]),
            ScriptedWorker::new(vec![Ok(found(2))]),
            ScriptedWorker::new(vec![Ok(WorkerOutcome::NotFound)]),
        ];
        let orchestrator =
            RoundOrchestrator::new(spec_with_quota(3), workers, RecordingLedger::default())
                .unwrap();

        let summary = orchestrator.run(&output_dir()).unwrap();
        assert_eq!(summary, SearchSummary { accepted: 3, rounds: 2 });

        // The total equals the sum of per-round ledger reports.
        let rounds = orchestrator.ledger.rounds.lock();
        let per_round: Vec<usize> = rounds
            .iter()
            .map(|r| r.iter().filter(|o| o.is_found()).count())
            .collect();
        assert_eq!(per_round, vec![2, 1]);
    }

    #[test]
    fn test_miss_round_leaves_count_unchanged_and_continues() {
        let workers = vec![ScriptedWorker::new(vec![
            Ok(WorkerOutcome::NotFound),
            Ok(WorkerOutcome::NotFound),
            Ok(found(9)),
        ])];
        let orchestrator =
            RoundOrchestrator::new(spec_with_quota(1), workers, RecordingLedger::default())
                .unwrap();

        let summary = orchestrator.run(&output_dir()).unwrap();
        assert_eq!(summary.rounds, 3);
        assert_eq!(summary.accepted, 1);
    }

    #[test]
    fn test_signal_is_fresh_every_round() {
        // Worker 0 finds a match (and stops the round) twice in a row;
        // both workers must still observe a cleared signal at the start
        // of every round.
        let workers = vec![
            ScriptedWorker::new(vec![Ok(found(1)), Ok(found(2))]),
            ScriptedWorker::new(vec![]),
        ];
        let orchestrator =
            RoundOrchestrator::new(spec_with_quota(2), workers, RecordingLedger::default())
                .unwrap();

        orchestrator.run(&output_dir()).unwrap();

        // The finder's own entry reads are deterministic: a leaked
        // signal would show up as `true` at the start of round two.
        let observed = orchestrator.workers[0].stop_seen_at_round_start.lock();
        assert_eq!(*observed, vec![false, false]);
    }

    #[test]
    fn test_round_result_is_in_worker_index_order() {
        // Completion order is reversed via delays; the ledger must
        // still see outcomes ordered by worker index.
        let workers: Vec<ScriptedWorker> = (0u8..4)
            .map(|index| {
                ScriptedWorker::new(vec![Ok(found(index))])
                    .with_delay(Duration::from_millis(40 - 10 * u64::from(index)))
            })
            .collect();
        let orchestrator =
            RoundOrchestrator::new(spec_with_quota(4), workers, RecordingLedger::default())
                .unwrap();

        orchestrator.run(&output_dir()).unwrap();

        let rounds = orchestrator.ledger.rounds.lock();
        assert_eq!(rounds.len(), 1);
        for (index, outcome) in rounds[0].iter().enumerate() {
            assert_eq!(outcome, &found(index as u8), "worker {index} out of place");
        }
    }

    #[test]
    fn test_worker_failure_aborts_request_and_discards_round() {
        // Round one persists a hit; the failure in round two must fail
        // the request without the ledger ever seeing round two.
        let workers = vec![
            ScriptedWorker::new(vec![
                Ok(found(1)),
                Err(std::io::Error::other("kernel launch failed").into()),
            ]),
            ScriptedWorker::new(vec![]),
        ];
        let orchestrator =
            RoundOrchestrator::new(spec_with_quota(2), workers, RecordingLedger::default())
                .unwrap();

        let err = orchestrator.run(&output_dir()).unwrap_err();
        match err {
            KeygrindError::WorkerFailed { index, message } => {
                assert_eq!(index, 0);
                assert!(message.contains("kernel launch failed"));
            }
            other => panic!("unexpected error: {other}"),
        }

        // Round one's accounting survives the abort.
        let rounds = orchestrator.ledger.rounds.lock();
        assert_eq!(rounds.len(), 1);
        assert!(rounds[0][0].is_found());
    }

    #[test]
    fn test_ledger_failure_propagates() {
        let workers = vec![ScriptedWorker::new(vec![Ok(found(1))])];
        let orchestrator =
            RoundOrchestrator::new(spec_with_quota(1), workers, FailingLedger).unwrap();

        let err = orchestrator.run(&output_dir()).unwrap_err();
        assert!(matches!(err, KeygrindError::Io(_)));
    }

    #[test]
    fn test_pool_width_matches_roster() {
        let workers = vec![
            ScriptedWorker::new(vec![Ok(found(1))]),
            ScriptedWorker::new(vec![]),
            ScriptedWorker::new(vec![]),
        ];
        let orchestrator =
            RoundOrchestrator::new(spec_with_quota(1), workers, RecordingLedger::default())
                .unwrap();
        assert_eq!(orchestrator.pool_width(), 3);
    }
}
