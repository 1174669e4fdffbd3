//! Reader loop: pull a batch, run the worker over it, write each winner.

use std::io::BufRead;

use cal_data::{ResultWriter, TaskSource};
use cal_types::{BestResult, HyperparameterGrid};
use crossbeam_channel::Sender;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::report::{GridOutcome, GridStatus};

/// Counters a reader reports when it finishes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderSummary {
    pub reader: usize,
    pub batches: usize,
    pub grids: usize,
}

/// Messages readers send back to the engine.
#[derive(Debug, Clone)]
pub enum ReaderEvent {
    Grid(GridOutcome),
    Finished(ReaderSummary),
}

/// Hand a frozen result to the writer and wait for it. A write failure is
/// scoped to this grid.
pub(crate) fn write_result(
    writer: &dyn ResultWriter,
    grid: &HyperparameterGrid,
    result: BestResult,
    reader: Option<usize>,
) -> GridOutcome {
    let status = match writer.write(&result) {
        Ok(path) => GridStatus::Written { path },
        Err(e) => {
            error!(
                grid = grid.sequence,
                outpath = %grid.outpath,
                "Failed to write grid result: {}", e
            );
            GridStatus::Failed {
                error: e.to_string(),
            }
        }
    };
    GridOutcome {
        sequence: grid.sequence,
        reader,
        result,
        status,
    }
}

/// The worker step: grids of one batch are evaluated one at a time, and each
/// result is written before the next grid starts.
pub(crate) fn process_batch<F, S>(
    batch: &[HyperparameterGrid],
    evaluate: &F,
    writer: &dyn ResultWriter,
    reader: Option<usize>,
    mut sink: S,
) -> usize
where
    F: Fn(&HyperparameterGrid) -> BestResult,
    S: FnMut(GridOutcome),
{
    for grid in batch {
        let best = evaluate(grid);
        sink(write_result(writer, grid, best, reader));
    }
    batch.len()
}

/// One reader instance. Runs until the source is exhausted, processing its
/// batches strictly in the order it received them.
pub(crate) fn run_reader<R, F>(
    id: usize,
    source: &TaskSource<R>,
    batch_size: usize,
    evaluate: F,
    writer: &dyn ResultWriter,
    events: Sender<ReaderEvent>,
) -> ReaderSummary
where
    R: BufRead,
    F: Fn(&HyperparameterGrid) -> BestResult,
{
    let mut summary = ReaderSummary {
        reader: id,
        ..Default::default()
    };

    loop {
        let batch = source.next_batch(batch_size);
        if batch.is_empty() {
            break;
        }
        summary.batches += 1;
        debug!(reader = id, grids = batch.len(), "Reader took batch");

        summary.grids += process_batch(&batch, &evaluate, writer, Some(id), |outcome| {
            let sequence = outcome.sequence;
            if let Err(e) = events.send(ReaderEvent::Grid(outcome)) {
                warn!(reader = id, grid = sequence, "Failed to report grid outcome: {}", e);
            }
        });
    }

    info!(
        reader = id,
        batches = summary.batches,
        grids = summary.grids,
        "Reader finished"
    );
    if let Err(e) = events.send(ReaderEvent::Finished(summary)) {
        warn!(reader = id, "Failed to report reader completion: {}", e);
    }
    summary
}
