//! Strand scheduling across worker threads
//!
//! A strand is an ordered run of tile coordinates; strands are disjoint and
//! independent, so the only shared mutable state is the claim counter and
//! the merged output. Workers pull strand indices from a single atomic
//! counter, process each strand with a private per-worker state object and
//! accumulate results into worker-local maps that are merged serially after
//! the pool joins.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tilemorph_core::{Error, Result, Strand, TileCoord, TileMap};

/// Minimum number of strands each worker thread must be able to claim
/// before spawning threads is worthwhile.
pub const MIN_STRANDS_PER_WORKER: usize = 4;

/// Per-worker strand processor.
///
/// One worker owns one instance for its entire life, so implementations can
/// hold scratch buffers (a morph/blur bucket) and reuse them across every
/// strand the worker claims.
pub trait StrandWorker {
    /// Process one strand, inserting produced tiles into `output`.
    fn process_strand(&mut self, strand: &[TileCoord], output: &mut TileMap);
}

/// Number of workers for a strand count: available hardware parallelism,
/// capped so each worker has at least `min_per_worker` strands.
fn worker_count(num_strands: usize, min_per_worker: usize) -> usize {
    let hardware = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    hardware.min(num_strands / min_per_worker)
}

/// Distribute strands over a worker pool and merge the results.
///
/// With fewer than two workers' worth of strands the work runs on the
/// calling thread with a single worker and no pool. Otherwise exactly
/// `worker_count` threads are spawned; each claims strand indices from a
/// shared `fetch_add` counter until the list is exhausted. Worker-local
/// output maps are merged into `output` in worker-completion order; strand
/// disjointness means no key is ever produced twice.
pub fn run_strands<W, F>(strands: &[Strand], output: &mut TileMap, make_worker: F) -> Result<()>
where
    W: StrandWorker,
    F: Fn() -> W + Sync,
{
    if strands.is_empty() {
        return Ok(());
    }

    let num_workers = worker_count(strands.len(), MIN_STRANDS_PER_WORKER);
    if num_workers <= 1 {
        tracing::debug!(strands = strands.len(), "processing strands sequentially");
        let mut worker = make_worker();
        for strand in strands {
            worker.process_strand(strand, output);
        }
        return Ok(());
    }

    tracing::debug!(
        strands = strands.len(),
        workers = num_workers,
        "spawning strand workers"
    );
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_workers)
        .build()
        .map_err(|e| Error::WorkerPool(e.to_string()))?;

    let next_strand = AtomicUsize::new(0);
    let results: Mutex<Vec<TileMap>> = Mutex::new(Vec::with_capacity(num_workers));

    pool.scope(|scope| {
        for _ in 0..num_workers {
            scope.spawn(|_| {
                let mut worker = make_worker();
                let mut local = TileMap::new();
                loop {
                    let i = next_strand.fetch_add(1, Ordering::Relaxed);
                    if i >= strands.len() {
                        break;
                    }
                    worker.process_strand(&strands[i], &mut local);
                }
                results
                    .lock()
                    .expect("strand result lock poisoned")
                    .push(local);
            });
        }
    });

    let locals = results
        .into_inner()
        .map_err(|_| Error::WorkerPool("strand result lock poisoned".to_string()))?;
    for local in locals {
        output.extend(local);
    }
    Ok(())
}
