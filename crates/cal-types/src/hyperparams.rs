//! Hyperparameter grids as they arrive on the task stream, and the single
//! points drawn from them.

use serde::{Deserialize, Serialize};

use crate::errors::DataError;

/// A numeric candidate value on the wire: either a JSON number or a numeric
/// string such as `"0.01"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Number(f64),
    Text(String),
}

impl NumericValue {
    fn to_f64(&self) -> Result<f64, String> {
        let value = match self {
            Self::Number(v) => *v,
            Self::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| format!("'{s}' is not a number: {e}"))?,
        };
        if value.is_finite() {
            Ok(value)
        } else {
            Err(format!("{value} is not finite"))
        }
    }
}

/// One record of the task stream, exactly as decoded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRecord {
    pub outpath: String,
    #[serde(default)]
    pub alpha: Vec<NumericValue>,
    #[serde(default)]
    pub num_epochs: Vec<NumericValue>,
    #[serde(default)]
    pub lambda: Vec<NumericValue>,
    #[serde(default)]
    pub mini_batch_size: Vec<NumericValue>,
}

/// A validated grid of candidate hyperparameters and the destination its
/// winning row is written to.
///
/// Regularization and mini-batch size are carried for forward compatibility;
/// only learning rate and epoch count are expanded into the search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterGrid {
    /// 1-based line of the task stream on which the record starts.
    pub sequence: usize,
    pub outpath: String,
    pub learning_rates: Vec<f64>,
    pub epochs: Vec<u64>,
    pub regularization: Vec<f64>,
    pub mini_batch_sizes: Vec<f64>,
}

impl HyperparameterGrid {
    /// Validate a decoded record. `line` is used for error reporting and as
    /// the grid's sequence number.
    pub fn from_record(record: GridRecord, line: usize) -> Result<Self, DataError> {
        let malformed = |message: String| DataError::MalformedRecord { line, message };

        if record.outpath.trim().is_empty() {
            return Err(malformed("outpath is empty".to_string()));
        }

        let floats = |field: &str, values: &[NumericValue]| -> Result<Vec<f64>, DataError> {
            values
                .iter()
                .map(|v| v.to_f64().map_err(|e| malformed(format!("{field}: {e}"))))
                .collect()
        };

        let learning_rates = floats("alpha", &record.alpha)?;
        let epochs = floats("numEpochs", &record.num_epochs)?
            .into_iter()
            .map(|v| {
                if v < 0.0 || v.fract() != 0.0 {
                    Err(malformed(format!(
                        "numEpochs: {v} is not a non-negative whole number"
                    )))
                } else if v >= u64::MAX as f64 {
                    Err(malformed(format!("numEpochs: {v} does not fit in 64 bits")))
                } else {
                    Ok(v as u64)
                }
            })
            .collect::<Result<Vec<_>, _>>()?;
        let regularization = floats("lambda", &record.lambda)?;
        let mini_batch_sizes = floats("miniBatchSize", &record.mini_batch_size)?;

        Ok(Self {
            sequence: line,
            outpath: record.outpath,
            learning_rates,
            epochs,
            regularization,
            mini_batch_sizes,
        })
    }

    /// Number of points the search expands this grid into.
    pub fn permutation_count(&self) -> usize {
        self.learning_rates.len() * self.epochs.len()
    }
}

/// One fully resolved combination drawn from a grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HyperparameterPoint {
    pub learning_rate: f64,
    pub epochs: u64,
    pub regularization: Option<f64>,
    pub mini_batch_size: Option<f64>,
}

impl HyperparameterPoint {
    pub fn new(learning_rate: f64, epochs: u64) -> Self {
        Self {
            learning_rate,
            epochs,
            regularization: None,
            mini_batch_size: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(json: &str) -> GridRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn record_with_string_values_parses() {
        let record = decode(
            r#"{"outpath":"out.csv","alpha":["0.01","0.1"],"numEpochs":["100","1000"]}"#,
        );
        let grid = HyperparameterGrid::from_record(record, 3).unwrap();

        assert_eq!(grid.sequence, 3);
        assert_eq!(grid.learning_rates, vec![0.01, 0.1]);
        assert_eq!(grid.epochs, vec![100, 1000]);
        assert!(grid.regularization.is_empty());
        assert!(grid.mini_batch_sizes.is_empty());
        assert_eq!(grid.permutation_count(), 4);
    }

    #[test]
    fn numeric_json_values_accepted() {
        let record = decode(r#"{"outpath":"o.csv","alpha":[0.5],"numEpochs":[10],"lambda":["1"]}"#);
        let grid = HyperparameterGrid::from_record(record, 1).unwrap();
        assert_eq!(grid.learning_rates, vec![0.5]);
        assert_eq!(grid.epochs, vec![10]);
        assert_eq!(grid.regularization, vec![1.0]);
    }

    #[test]
    fn non_numeric_value_is_malformed() {
        let record = decode(r#"{"outpath":"o.csv","alpha":["fast"],"numEpochs":["10"]}"#);
        let err = HyperparameterGrid::from_record(record, 7).unwrap_err();
        match err {
            DataError::MalformedRecord { line, message } => {
                assert_eq!(line, 7);
                assert!(message.contains("alpha"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn fractional_epochs_are_malformed() {
        let record = decode(r#"{"outpath":"o.csv","alpha":["0.1"],"numEpochs":["10.5"]}"#);
        assert!(HyperparameterGrid::from_record(record, 1).is_err());

        let record = decode(r#"{"outpath":"o.csv","alpha":["0.1"],"numEpochs":["-1"]}"#);
        assert!(HyperparameterGrid::from_record(record, 1).is_err());
    }

    #[test]
    fn oversized_epochs_are_malformed() {
        for epochs in ["1e30", "18446744073709551616"] {
            let record = decode(&format!(
                r#"{{"outpath":"o.csv","alpha":["0.1"],"numEpochs":["{epochs}"]}}"#
            ));
            let err = HyperparameterGrid::from_record(record, 2).unwrap_err();
            assert!(matches!(err, DataError::MalformedRecord { line: 2, .. }));
        }

        let record = decode(r#"{"outpath":"o.csv","alpha":["0.1"],"numEpochs":["1e6"]}"#);
        let grid = HyperparameterGrid::from_record(record, 2).unwrap();
        assert_eq!(grid.epochs, vec![1_000_000]);
    }

    #[test]
    fn empty_outpath_is_malformed() {
        let record = decode(r#"{"outpath":"  ","alpha":["0.1"]}"#);
        assert!(HyperparameterGrid::from_record(record, 1).is_err());
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let record = decode(r#"{"outpath":"o.csv"}"#);
        let grid = HyperparameterGrid::from_record(record, 1).unwrap();
        assert_eq!(grid.permutation_count(), 0);
    }
}
