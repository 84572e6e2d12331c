use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Per-computation context owning the seeded PRNG and the cooperative
/// cancellation flag.
///
/// Every algorithm entry point takes a `&mut ManagementInstance`; separate
/// instances are fully independent, so concurrent decompositions are possible
/// on disjoint instances. Within one instance the algorithms are not
/// re-entrant.
///
/// Cancellation is cooperative: the flag is polled between elimination steps
/// and between candidate builds, never inside a step. Setting the flag from
/// another thread (via the handle returned by [`termination_flag`]) is the
/// only permitted external mutation while a computation runs.
///
/// [`termination_flag`]: ManagementInstance::termination_flag
#[derive(Debug)]
pub struct ManagementInstance {
    rng: StdRng,
    terminate: Arc<AtomicBool>,
}

impl ManagementInstance {
    /// Creates an instance with a fixed PRNG seed. Given the same seed, graph
    /// and options, all algorithms in this crate behave deterministically.
    pub fn with_seed(seed: u64) -> Self {
        ManagementInstance {
            rng: StdRng::seed_from_u64(seed),
            terminate: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Creates an instance seeded from the wall clock, for callers that do
    /// not need reproducible runs.
    pub fn from_wall_clock() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(0);
        ManagementInstance::with_seed(seed)
    }

    /// Requests termination of the running computation. The computation stops
    /// at its next polling boundary and returns its best result so far.
    pub fn terminate(&self) {
        self.terminate.store(true, Ordering::Relaxed);
    }

    /// Clears the termination flag so the instance can be reused.
    pub fn reset_termination(&self) {
        self.terminate.store(false, Ordering::Relaxed);
    }

    pub fn is_terminated(&self) -> bool {
        self.terminate.load(Ordering::Relaxed)
    }

    /// A shareable handle to the cancellation flag, e.g. for a timeout thread.
    pub fn termination_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.terminate)
    }

    pub(crate) fn rng_mut(&mut self) -> &mut StdRng {
        &mut self.rng
    }
}
