//! Run and per-grid outcome reporting.

use std::path::{Path, PathBuf};

use cal_types::{BestResult, CalResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunMode {
    Parallel,
    Sequential,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GridStatus {
    Written { path: PathBuf },
    Failed { error: String },
}

/// What happened to one grid from the task stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridOutcome {
    pub sequence: usize,
    /// Reader that processed the grid; `None` in sequential mode.
    pub reader: Option<usize>,
    pub result: BestResult,
    pub status: GridStatus,
}

impl GridOutcome {
    pub fn is_written(&self) -> bool {
        matches!(self.status, GridStatus::Written { .. })
    }
}

/// Summary of a complete run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub mode: RunMode,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub grids_written: usize,
    pub grids_failed: usize,
    pub records_skipped: usize,
    pub outcomes: Vec<GridOutcome>,
}

impl RunReport {
    pub fn new(mode: RunMode) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            mode,
            started_at: Utc::now(),
            finished_at: None,
            grids_written: 0,
            grids_failed: 0,
            records_skipped: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: GridOutcome) {
        if outcome.is_written() {
            self.grids_written += 1;
        } else {
            self.grids_failed += 1;
        }
        self.outcomes.push(outcome);
    }

    /// Stamp the finish time and order outcomes by input position.
    pub fn mark_finished(&mut self, records_skipped: usize) {
        self.records_skipped = records_skipped;
        self.outcomes.sort_by_key(|o| o.sequence);
        self.finished_at = Some(Utc::now());
    }

    pub fn is_success(&self) -> bool {
        self.grids_failed == 0
    }

    pub fn outcome_for(&self, outpath: &str) -> Option<&GridOutcome> {
        self.outcomes.iter().find(|o| o.result.outpath == outpath)
    }

    /// Save the report as pretty-printed JSON.
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> CalResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(sequence: usize, status: GridStatus) -> GridOutcome {
        GridOutcome {
            sequence,
            reader: Some(0),
            result: BestResult::empty(format!("g{sequence}.csv")),
            status,
        }
    }

    #[test]
    fn report_lifecycle() {
        let mut report = RunReport::new(RunMode::Parallel);
        assert!(report.finished_at.is_none());

        report.record(outcome(3, GridStatus::Written { path: "g3.csv".into() }));
        report.record(outcome(1, GridStatus::Failed { error: "disk full".into() }));
        report.record(outcome(2, GridStatus::Written { path: "g2.csv".into() }));
        report.mark_finished(4);

        assert_eq!(report.grids_written, 2);
        assert_eq!(report.grids_failed, 1);
        assert_eq!(report.records_skipped, 4);
        assert!(!report.is_success());
        assert!(report.finished_at.is_some());

        let order: Vec<usize> = report.outcomes.iter().map(|o| o.sequence).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(report.outcome_for("g2.csv").unwrap().is_written());
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = RunReport::new(RunMode::Sequential);
        report.record(outcome(1, GridStatus::Written { path: "g1.csv".into() }));
        report.mark_finished(0);

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "Sequential");
        assert_eq!(json["grids_written"], 1);
        assert_eq!(json["outcomes"][0]["result"]["outpath"], "g1.csv");
    }

    #[test]
    fn report_written_as_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let mut report = RunReport::new(RunMode::Parallel);
        report.record(outcome(1, GridStatus::Failed { error: "denied".into() }));
        report.mark_finished(2);

        report.write_json(&path).unwrap();
        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["run_id"], report.run_id.to_string());
        assert_eq!(json["grids_failed"], 1);
        assert_eq!(json["records_skipped"], 2);
    }
}
