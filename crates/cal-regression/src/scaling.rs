//! Min-max scaling of the independent variable.
//!
//! `normalize` maps `x` into `[0, 1]` with `x' = (x - min) / (max - min)`.
//! A line fitted in that space, `y = slope' * x' + intercept'`, is the raw
//! line `y = (slope' / r) * x + (intercept' - slope' * min / r)` with
//! `r = max - min`; `denormalize` applies exactly that mapping.

use cal_types::{CalResult, DataError, Dataset, ModelParameters};
use tracing::debug;

/// Smallest and largest value of a slice, `None` when it is empty.
pub fn min_max(values: &[f64]) -> Option<(f64, f64)> {
    let first = *values.first()?;
    Some(
        values
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Rescale `x` into `[0, 1]`; `y` is copied untouched.
pub fn normalize(data: &Dataset, min: f64, max: f64) -> Dataset {
    let range = max - min;
    Dataset {
        x: data.x.iter().map(|x| (x - min) / range).collect(),
        y: data.y.clone(),
    }
}

/// Map parameters fitted on normalized `x` back to raw `x` space.
pub fn denormalize(parameters: ModelParameters, min: f64, max: f64) -> ModelParameters {
    let slope = parameters.slope / (max - min);
    ModelParameters {
        intercept: parameters.intercept - slope * min,
        slope,
    }
}

/// A validated dataset together with its normalized copy and the `x` range
/// used to produce it. Built once per run and shared read-only.
#[derive(Debug, Clone)]
pub struct ScaledDataset {
    raw: Dataset,
    normalized: Dataset,
    min: f64,
    max: f64,
}

impl ScaledDataset {
    /// Validate `raw` and normalize it. Empty, mismatched, non-finite and
    /// constant-`x` datasets are rejected.
    pub fn prepare(raw: Dataset) -> CalResult<Self> {
        raw.validate()?;
        let (min, max) = min_max(&raw.x).ok_or(DataError::EmptyDataset)?;
        if min == max {
            return Err(DataError::DegenerateRange { value: min }.into());
        }
        let normalized = normalize(&raw, min, max);
        debug!(rows = raw.len(), min, max, "Normalized dataset");
        Ok(Self {
            raw,
            normalized,
            min,
            max,
        })
    }

    pub fn raw(&self) -> &Dataset {
        &self.raw
    }

    pub fn normalized(&self) -> &Dataset {
        &self.normalized
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
