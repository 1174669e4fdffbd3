use serde::{Deserialize, Serialize};

use crate::dataset::ModelParameters;
use crate::hyperparams::{HyperparameterGrid, HyperparameterPoint};

/// Lowest-error point found so far for one grid.
///
/// Starts with `error = +inf` and no point; only ever replaced by a candidate
/// with a strictly lower error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestResult {
    pub outpath: String,
    pub point: Option<HyperparameterPoint>,
    pub error: f64,
    pub parameters: ModelParameters,
}

impl BestResult {
    pub fn empty(outpath: impl Into<String>) -> Self {
        Self {
            outpath: outpath.into(),
            point: None,
            error: f64::INFINITY,
            parameters: ModelParameters::zero(),
        }
    }

    pub fn for_grid(grid: &HyperparameterGrid) -> Self {
        Self::empty(grid.outpath.clone())
    }

    /// Whether any evaluated point has been recorded.
    pub fn is_found(&self) -> bool {
        self.point.is_some()
    }

    /// Strict improvement test. NaN never improves on anything.
    pub fn is_improved_by(&self, error: f64) -> bool {
        error < self.error
    }

    /// Replace the held triple when `error` is strictly lower.
    /// Returns whether the replacement happened.
    pub fn offer(
        &mut self,
        point: HyperparameterPoint,
        error: f64,
        parameters: ModelParameters,
    ) -> bool {
        if !self.is_improved_by(error) {
            return false;
        }
        self.point = Some(point);
        self.error = error;
        self.parameters = parameters;
        true
    }
}
