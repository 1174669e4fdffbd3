use std::io::BufRead;
use std::sync::Arc;
use std::thread;

use cal_data::{ResultWriter, TaskSource};
use cal_regression::ScaledDataset;
use cal_search::{build_pool, evaluate_sequential, GridWorker, SearchConfig};
use cal_types::{internal_error, CalResult, Dataset, HyperparameterGrid};
use crossbeam_channel::unbounded;
use tracing::{debug, info};

use crate::reader::{process_batch, run_reader, ReaderEvent};
use crate::report::{RunMode, RunReport};

/// Runs a grid search over every grid on a task stream against one dataset.
///
/// The dataset and configuration are validated at construction, so a
/// degenerate dataset is rejected before any reader starts.
pub struct CalibrationEngine {
    config: SearchConfig,
    data: Arc<ScaledDataset>,
    writer: Arc<dyn ResultWriter>,
}

impl CalibrationEngine {
    pub fn new(
        config: SearchConfig,
        dataset: Dataset,
        writer: Arc<dyn ResultWriter>,
    ) -> CalResult<Self> {
        config.validate()?;
        let data = Arc::new(ScaledDataset::prepare(dataset)?);
        info!(
            rows = data.raw().len(),
            threads = config.threads,
            readers = config.reader_count(),
            batch_size = config.batch_size,
            "Initialized calibration engine"
        );
        Ok(Self {
            config,
            data,
            writer,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn dataset(&self) -> &ScaledDataset {
        &self.data
    }

    /// Parallel grid search: `reader_count()` readers share the source, and
    /// each grid is split across `threads` sub-workers.
    pub fn run<R: BufRead + Send>(&self, source: &TaskSource<R>) -> CalResult<RunReport> {
        let mut report = RunReport::new(RunMode::Parallel);
        let readers = self.config.reader_count();
        info!(run_id = %report.run_id, readers, "Starting parallel grid search");

        let pool = Arc::new(build_pool(self.config.threads)?);
        let worker = GridWorker::new(Arc::clone(&self.data), pool, self.config.threads);
        debug!(sub_workers = worker.sub_workers(), "Built sub-worker pool");
        let (tx, rx) = unbounded();

        let joined = thread::scope(|s| -> CalResult<usize> {
            let mut handles = Vec::with_capacity(readers);
            for id in 0..readers {
                let worker = &worker;
                let writer = self.writer.as_ref();
                let events = tx.clone();
                let batch_size = self.config.batch_size;
                let handle = thread::Builder::new()
                    .name(format!("cal-reader-{id}"))
                    .spawn_scoped(s, move || {
                        run_reader(
                            id,
                            source,
                            batch_size,
                            |grid| worker.evaluate(grid),
                            writer,
                            events,
                        )
                    })?;
                handles.push(handle);
            }

            let mut finished = 0;
            for handle in handles {
                handle
                    .join()
                    .map_err(|_| internal_error!("reader thread panicked"))?;
                finished += 1;
            }
            Ok(finished)
        });
        drop(tx);
        let finished = joined?;
        debug!(readers = finished, "All readers joined");

        for event in rx.try_iter() {
            match event {
                ReaderEvent::Grid(outcome) => report.record(outcome),
                ReaderEvent::Finished(summary) => {
                    debug!(
                        reader = summary.reader,
                        grids = summary.grids,
                        "Reader reported completion"
                    );
                }
            }
        }

        self.finish(report, source)
    }

    /// Sequential grid search on the calling thread: no readers, no
    /// sub-workers, same winners.
    pub fn run_sequential<R: BufRead>(&self, source: &TaskSource<R>) -> CalResult<RunReport> {
        let mut report = RunReport::new(RunMode::Sequential);
        info!(run_id = %report.run_id, "Starting sequential grid search");

        let evaluate = |grid: &HyperparameterGrid| evaluate_sequential(&self.data, grid);
        loop {
            let batch = source.next_batch(self.config.batch_size);
            if batch.is_empty() {
                break;
            }
            process_batch(&batch, &evaluate, self.writer.as_ref(), None, |outcome| {
                report.record(outcome)
            });
        }

        self.finish(report, source)
    }

    fn finish<R: BufRead>(
        &self,
        mut report: RunReport,
        source: &TaskSource<R>,
    ) -> CalResult<RunReport> {
        report.mark_finished(source.stats().records_skipped);
        info!(
            run_id = %report.run_id,
            written = report.grids_written,
            failed = report.grids_failed,
            skipped = report.records_skipped,
            "Grid search finished"
        );
        Ok(report)
    }
}
