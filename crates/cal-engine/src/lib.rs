// Calibrate grid-search pipeline

pub mod engine;
pub mod reader;
pub mod report;

pub use engine::CalibrationEngine;
pub use reader::{ReaderEvent, ReaderSummary};
pub use report::{GridOutcome, GridStatus, RunMode, RunReport};
