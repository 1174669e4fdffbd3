//! Parallel evaluation of one grid.

use std::sync::Arc;

use cal_regression::{evaluate_point, ScaledDataset};
use cal_types::{BestResult, CalResult, HyperparameterGrid, HyperparameterPoint, SearchError};
use rayon::ThreadPool;
use tracing::{debug, warn};

use crate::aggregate::BestSlot;
use crate::search::{expand_grid, partition};

/// Build the pool sub-workers run on, sized to the thread budget.
pub fn build_pool(threads: usize) -> CalResult<ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .thread_name(|i| format!("cal-sub-{i}"))
        .build()
        .map_err(|e| {
            SearchError::InvalidConfig {
                message: format!("cannot build sub-worker pool: {e}"),
            }
            .into()
        })
}

/// Fit every point of one chunk and keep the chunk's own winner.
pub fn evaluate_chunk(
    data: &ScaledDataset,
    outpath: &str,
    points: &[HyperparameterPoint],
) -> BestResult {
    let mut local = BestResult::empty(outpath);
    for point in points {
        let eval = evaluate_point(data, point);
        local.offer(*point, eval.error, eval.parameters);
    }
    local
}

/// Evaluate every point of `grid` on the calling thread.
pub fn evaluate_sequential(data: &ScaledDataset, grid: &HyperparameterGrid) -> BestResult {
    let points = expand_grid(grid);
    if points.is_empty() {
        warn!(
            grid = grid.sequence,
            outpath = %grid.outpath,
            "Grid has no learning-rate/epoch permutations"
        );
    }
    evaluate_chunk(data, &grid.outpath, &points)
}

/// Evaluates grids by fanning their points out over a fixed number of
/// sub-workers and reducing the results into a [`BestSlot`].
#[derive(Clone)]
pub struct GridWorker {
    data: Arc<ScaledDataset>,
    pool: Arc<ThreadPool>,
    sub_workers: usize,
}

impl GridWorker {
    pub fn new(data: Arc<ScaledDataset>, pool: Arc<ThreadPool>, sub_workers: usize) -> Self {
        Self {
            data,
            pool,
            sub_workers: sub_workers.max(1),
        }
    }

    pub fn sub_workers(&self) -> usize {
        self.sub_workers
    }

    /// Evaluate all points of `grid` and return its frozen best result.
    ///
    /// Blocks until every chunk has been evaluated and merged.
    pub fn evaluate(&self, grid: &HyperparameterGrid) -> BestResult {
        let points = expand_grid(grid);
        if points.is_empty() {
            warn!(
                grid = grid.sequence,
                outpath = %grid.outpath,
                "Grid has no learning-rate/epoch permutations"
            );
            return BestResult::for_grid(grid);
        }

        let chunks = partition(points.len(), self.sub_workers);
        debug!(
            grid = grid.sequence,
            permutations = points.len(),
            chunks = chunks.len(),
            "Dispatching grid to sub-workers"
        );

        let slot = BestSlot::new(BestResult::for_grid(grid));
        let data = self.data.as_ref();
        self.pool.scope(|s| {
            for range in chunks {
                let chunk = &points[range];
                let slot = &slot;
                let outpath = grid.outpath.as_str();
                s.spawn(move |_| {
                    let local = evaluate_chunk(data, outpath, chunk);
                    slot.offer(&local);
                });
            }
        });

        slot.into_inner()
    }
}
