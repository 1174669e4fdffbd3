use serde::{Deserialize, Serialize};

use crate::errors::{CalResult, DataError};

/// Observations of an independent variable `x` and a dependent variable `y`.
///
/// Immutable once loaded; every worker of a run reads the same instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Dataset {
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> Self {
        Self { x, y }
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Reject datasets that gradient descent cannot run on: empty input,
    /// unequal sequence lengths and non-finite observations.
    pub fn validate(&self) -> CalResult<()> {
        if self.x.len() != self.y.len() {
            return Err(DataError::LengthMismatch {
                x_len: self.x.len(),
                y_len: self.y.len(),
            }
            .into());
        }
        if self.is_empty() {
            return Err(DataError::EmptyDataset.into());
        }
        if let Some(row) = self
            .x
            .iter()
            .zip(&self.y)
            .position(|(x, y)| !x.is_finite() || !y.is_finite())
        {
            return Err(DataError::NonFinite { row }.into());
        }
        Ok(())
    }
}

/// Intercept and slope of the univariate model `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelParameters {
    pub intercept: f64,
    pub slope: f64,
}

impl ModelParameters {
    pub fn new(intercept: f64, slope: f64) -> Self {
        Self { intercept, slope }
    }

    /// Starting point of every gradient-descent run.
    pub fn zero() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::CalError;

    #[test]
    fn valid_dataset_passes() {
        let data = Dataset::new(vec![0.0, 1.0], vec![2.0, 3.0]);
        assert!(data.validate().is_ok());
        assert_eq!(data.len(), 2);
    }

    #[test]
    fn empty_dataset_rejected() {
        let data = Dataset::new(vec![], vec![]);
        assert!(matches!(
            data.validate(),
            Err(CalError::Data(DataError::EmptyDataset))
        ));
    }

    #[test]
    fn length_mismatch_rejected() {
        let data = Dataset::new(vec![1.0, 2.0, 3.0], vec![1.0]);
        assert!(matches!(
            data.validate(),
            Err(CalError::Data(DataError::LengthMismatch { x_len: 3, y_len: 1 }))
        ));
    }

    #[test]
    fn non_finite_value_rejected() {
        let data = Dataset::new(vec![1.0, 2.0], vec![1.0, f64::NAN]);
        assert!(matches!(
            data.validate(),
            Err(CalError::Data(DataError::NonFinite { row: 1 }))
        ));
    }

    #[test]
    fn parameters_start_at_zero() {
        assert_eq!(ModelParameters::zero(), ModelParameters::new(0.0, 0.0));
    }
}
