//! Per-accelerator search workers.

use ocl::{Buffer, Context, Kernel, Program, Queue};
use rand::RngCore;
use tracing::{debug, trace};

use crate::config::DISPATCHES_PER_ROUND;
use crate::device::ResolvedDevice;
use crate::error::Result;
use crate::search::signal::RoundSignal;
use crate::spec::SearchSpec;
use std::sync::Arc;

/// A matching seed reported by a worker. The ledger re-derives the
/// address before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCandidate {
    pub seed: [u8; 32],
}

/// Outcome of one bounded search attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerOutcome {
    Found(KeyCandidate),
    NotFound,
}

impl WorkerOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, WorkerOutcome::Found(_))
    }
}

/// One search unit of the pool.
///
/// `search_once` performs exactly one bounded attempt: it must return
/// after a fixed amount of work whether or not anything matched, and it
/// must honor the round signal between sub-batches. Finding a match
/// obliges the worker to request a stop before returning so its
/// siblings can wind down.
pub trait SearchWorker: Send + Sync {
    fn search_once(&self, signal: &RoundSignal) -> Result<WorkerOutcome>;
}

/// OpenCL-backed worker bound to a single device.
///
/// The program is compiled once at pool construction and reused for
/// every round of the request.
pub struct GpuWorker {
    index: usize,
    device_name: String,
    spec: Arc<SearchSpec>,
    queue: Queue,
    program: Program,
}

impl GpuWorker {
    /// Compile the search program for `device` and bind worker `index`
    /// to it.
    pub fn bind(
        index: usize,
        device: &ResolvedDevice,
        spec: Arc<SearchSpec>,
        kernel_source: &str,
    ) -> Result<Self> {
        let context = Context::builder()
            .platform(device.platform)
            .devices(device.device)
            .build()?;
        let queue = Queue::new(&context, device.device, None)?;
        let program = Program::builder()
            .src(kernel_source)
            .devices(device.device)
            .build(&context)?;

        debug!("Worker {index} bound to {}", device.name);
        Ok(Self {
            index,
            device_name: device.name.clone(),
            spec,
            queue,
            program,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Run one kernel dispatch over `2^iteration_bits` candidates.
    fn dispatch(&self, base_seed: &[u8; 32], dispatch_index: usize) -> Result<Option<[u8; 32]>> {
        let global_size = 1usize << self.spec.iteration_bits();

        let seed_buffer = Buffer::<u8>::builder()
            .queue(self.queue.clone())
            .len(base_seed.len())
            .copy_host_slice(base_seed)
            .build()?;
        let flag_buffer = Buffer::<i32>::builder()
            .queue(self.queue.clone())
            .len(1)
            .fill_val(0)
            .build()?;
        let found_buffer = Buffer::<u8>::builder()
            .queue(self.queue.clone())
            .len(32)
            .fill_val(0u8)
            .build()?;

        let kernel = Kernel::builder()
            .program(&self.program)
            .name("grind")
            .queue(self.queue.clone())
            .global_work_size(global_size)
            .arg(&seed_buffer)
            .arg((dispatch_index as u64) * (global_size as u64))
            .arg(&flag_buffer)
            .arg(&found_buffer)
            .build()?;

        unsafe {
            kernel.enq()?;
        }

        let mut flag = [0i32];
        flag_buffer.read(&mut flag[..]).enq()?;
        if flag[0] == 0 {
            return Ok(None);
        }

        let mut seed = [0u8; 32];
        found_buffer.read(&mut seed[..]).enq()?;
        Ok(Some(seed))
    }
}

impl SearchWorker for GpuWorker {
    fn search_once(&self, signal: &RoundSignal) -> Result<WorkerOutcome> {
        let mut base_seed = [0u8; 32];
        rand::rng().fill_bytes(&mut base_seed);

        for dispatch_index in 0..DISPATCHES_PER_ROUND {
            if signal.should_stop() {
                debug!(
                    "Worker {} ({}) observed stop, winding down",
                    self.index, self.device_name
                );
                return Ok(WorkerOutcome::NotFound);
            }

            trace!(
                "Worker {} dispatch {}/{}",
                self.index,
                dispatch_index + 1,
                DISPATCHES_PER_ROUND
            );
            if let Some(seed) = self.dispatch(&base_seed, dispatch_index)? {
                signal.request_stop();
                debug!("Worker {} ({}) found a match", self.index, self.device_name);
                return Ok(WorkerOutcome::Found(KeyCandidate { seed }));
            }
        }

        Ok(WorkerOutcome::NotFound)
    }
}

impl std::fmt::Debug for GpuWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GpuWorker")
            .field("index", &self.index)
            .field("device_name", &self.device_name)
            .finish_non_exhaustive()
    }
}
