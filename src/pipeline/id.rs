use mlagent_schema::PipelineId;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Instant;

/// Issues pipeline ids from a monotonic clock: microseconds since the generator was
/// created, bumped by one when two launches land on the same tick.
#[derive(Debug)]
pub struct IdGenerator {
    origin: Instant,
    last: AtomicI64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            last: AtomicI64::new(0),
        }
    }

    pub fn next(&self) -> PipelineId {
        let now = i64::try_from(self.origin.elapsed().as_micros()).unwrap_or(i64::MAX);
        let mut last = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(last + 1);
            match self
                .last
                .compare_exchange_weak(last, candidate, Ordering::AcqRel, Ordering::Relaxed)
            {
                Ok(_) => return candidate,
                Err(seen) => last = seen,
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
