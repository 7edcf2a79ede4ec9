//! Component J: configuration — a small `Copy` struct with a sensible
//! `Default`, passed by value at construction time.

/// Tuning knobs for one reconstruction run.
#[derive(Debug, Clone, Copy)]
pub struct ReconstructionOptions {
    /// Number of worker threads the parallel driver (`driver.rs`) fans
    /// patterns out across. Clamped to at least 1.
    pub workers: usize,
    /// Emits `tracing` events at `debug`/`trace` level describing pattern
    /// compression and per-worker dispatch, beyond the `info`/`warn`/`error`
    /// events that are always emitted.
    pub verbose: bool,
}

impl Default for ReconstructionOptions {
    fn default() -> Self {
        Self {
            workers: 1,
            verbose: false,
        }
    }
}

impl ReconstructionOptions {
    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
            ..Self::default()
        }
    }
}
