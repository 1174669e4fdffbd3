use thiserror::Error;

/// Main error type for the Calibrate system
#[derive(Error, Debug)]
pub enum CalError {
    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    #[error("Output error: {0}")]
    Output(#[from] OutputError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Dataset and task-input errors
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Dataset is empty")]
    EmptyDataset,

    #[error("Dataset length mismatch: {x_len} x values, {y_len} y values")]
    LengthMismatch { x_len: usize, y_len: usize },

    #[error("Dataset contains a non-finite value at row {row}")]
    NonFinite { row: usize },

    #[error("Degenerate independent variable: min == max == {value}, cannot normalize")]
    DegenerateRange { value: f64 },

    #[error("Data loading failed: {message}")]
    LoadingFailed { message: String },

    #[error("Malformed record at line {line}: {message}")]
    MalformedRecord { line: usize, message: String },
}

/// Search configuration errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Invalid search configuration: {message}")]
    InvalidConfig { message: String },
}

/// Result writer errors
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Cannot create output {path}: {message}")]
    CreateFailed { path: String, message: String },

    #[error("Cannot write output {path}: {message}")]
    WriteFailed { path: String, message: String },
}

/// Result type alias for Calibrate operations
pub type CalResult<T> = Result<T, CalError>;

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::CalError::Internal(format!($($arg)*))
    };
}
