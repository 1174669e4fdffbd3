//! Per-grid result output.

use std::path::{Path, PathBuf};

use cal_types::{BestResult, CalResult, OutputError};
use tracing::info;

/// Rendered for any axis the winning point never populated.
pub const NOT_APPLICABLE: &str = "NA";

/// Fixed column order of every output artifact.
pub const RESULT_HEADER: [&str; 6] = ["alpha", "numEpochs", "lambda", "miniBatchSize", "beta", "mu"];

/// Destination for one grid's winning result.
pub trait ResultWriter: Send + Sync {
    /// Persist `result`, returning where it went.
    fn write(&self, result: &BestResult) -> CalResult<PathBuf>;
}

fn fmt_float(v: f64) -> String {
    format!("{v:.6}")
}

fn fmt_optional(v: Option<f64>) -> String {
    v.map(fmt_float).unwrap_or_else(|| NOT_APPLICABLE.to_string())
}

/// Render `result` as one row in [`RESULT_HEADER`] order. Every numeric
/// column, the epoch count included, gets six decimals.
pub fn format_row(result: &BestResult) -> [String; 6] {
    let (alpha, epochs, lambda, batch) = match &result.point {
        Some(point) => (
            fmt_float(point.learning_rate),
            fmt_float(point.epochs as f64),
            fmt_optional(point.regularization),
            fmt_optional(point.mini_batch_size),
        ),
        None => (
            NOT_APPLICABLE.to_string(),
            NOT_APPLICABLE.to_string(),
            NOT_APPLICABLE.to_string(),
            NOT_APPLICABLE.to_string(),
        ),
    };
    [
        alpha,
        epochs,
        lambda,
        batch,
        fmt_float(result.parameters.slope),
        fmt_float(result.parameters.intercept),
    ]
}

/// Writes each result to its own CSV file at the grid's `outpath`.
#[derive(Debug, Clone, Default)]
pub struct CsvResultWriter {
    output_dir: Option<PathBuf>,
}

impl CsvResultWriter {
    pub fn new() -> Self {
        Self { output_dir: None }
    }

    /// Resolve relative outpaths against `dir`.
    pub fn with_output_dir<P: Into<PathBuf>>(dir: P) -> Self {
        Self {
            output_dir: Some(dir.into()),
        }
    }

    pub fn resolve(&self, outpath: &str) -> PathBuf {
        let path = Path::new(outpath);
        match &self.output_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl ResultWriter for CsvResultWriter {
    fn write(&self, result: &BestResult) -> CalResult<PathBuf> {
        let path = self.resolve(&result.outpath);
        let shown = path.display().to_string();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| OutputError::CreateFailed {
                path: shown.clone(),
                message: e.to_string(),
            })?;
        }

        let mut wtr = csv::Writer::from_path(&path).map_err(|e| OutputError::CreateFailed {
            path: shown.clone(),
            message: e.to_string(),
        })?;

        let row = format_row(result);
        let write_failed = |message: String| OutputError::WriteFailed {
            path: shown.clone(),
            message,
        };
        wtr.write_record(RESULT_HEADER)
            .map_err(|e| write_failed(e.to_string()))?;
        wtr.write_record(&row)
            .map_err(|e| write_failed(e.to_string()))?;
        wtr.flush().map_err(|e| write_failed(e.to_string()))?;

        info!(path = %shown, row = ?row, "Wrote grid result");
        Ok(path)
    }
}
