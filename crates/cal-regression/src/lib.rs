//! # cal-regression
//!
//! Pure functions for fitting `y = slope * x + intercept` by batch gradient
//! descent: forecasting, mean-squared error, the simultaneous parameter
//! update, and min-max scaling of the independent variable.

pub mod model;
pub mod scaling;

pub use model::*;
pub use scaling::*;
