//! Component F: parallel driver.
//!
//! Fans the unique site patterns out across a fixed-size rayon pool.
//! Patterns are chunked one-chunk-per-worker rather than one-task-per-pattern
//! so each worker's [`ReconstructionScratch`] is allocated once and reused
//! across every pattern it owns, recycled across patterns to avoid repeated
//! allocation.
//!
//! Each worker returns its own rows and its own per-branch SNP map; both are
//! merged single-threaded in `run` once every worker's chunk has settled.

use hashbrown::HashMap as FastHashMap;
use rayon::prelude::*;

use crate::errors::ReconstructionResult;
use crate::pattern::Pattern;
use crate::reconstruct::{ReconstructionScratch, reconstruct_pattern};
use crate::tree::Tree;

pub struct DriverOutput {
    /// `(alignment row, column, character)` triples to write into the
    /// shared output alignment.
    pub cells: Vec<(usize, usize, u8)>,
    /// Summed SNP contribution per branch label.
    pub snp_totals: FastHashMap<Box<str>, u64>,
}

/// One worker's contribution before the single-threaded reduce: its own
/// output cells and its own per-branch SNP totals.
type WorkerChunkResult = (Vec<(usize, usize, u8)>, FastHashMap<Box<str>, u64>);

/// Runs joint reconstruction for every pattern, using `workers` threads.
pub fn run(
    tree: &Tree,
    pi: &[f64; 4],
    patterns: &[Pattern],
    workers: usize,
) -> ReconstructionResult<DriverOutput> {
    let workers = workers.max(1);
    let node_count = tree.node_count();

    tracing::debug!(pattern_count = patterns.len(), workers, "dispatching patterns to workers");

    let chunk_size = patterns.len().div_ceil(workers).max(1);
    let chunks: Vec<&[Pattern]> = patterns.chunks(chunk_size).collect();

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(|_| crate::errors::ReconstructionError::MissingInput {
            what: "could not build worker thread pool",
        })?;

    let per_worker: Vec<WorkerChunkResult> = pool.install(|| {
        chunks
            .par_iter()
            .map(|chunk| {
                let mut scratch = ReconstructionScratch::new(node_count);
                let mut cells = Vec::new();
                let mut snp: FastHashMap<Box<str>, u64> = FastHashMap::new();

                for pattern in chunk.iter() {
                    let result = reconstruct_pattern(tree, pi, pattern, &mut scratch);
                    for &(row, ch) in &result.internal_rows {
                        for &col in &pattern.columns {
                            cells.push((row, col, ch));
                        }
                    }
                    for (label, count) in result.snp {
                        *snp.entry(label).or_insert(0) += count;
                    }
                }

                (cells, snp)
            })
            .collect()
    });

    let mut cells = Vec::new();
    let mut snp_totals: FastHashMap<Box<str>, u64> = FastHashMap::new();
    for (worker_cells, worker_snp) in per_worker {
        cells.extend(worker_cells);
        for (label, count) in worker_snp {
            *snp_totals.entry(label).or_insert(0) += count;
        }
    }

    Ok(DriverOutput { cells, snp_totals })
}
