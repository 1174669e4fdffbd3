//! Grid expansion and work partitioning.

use std::ops::Range;

use cal_types::{HyperparameterGrid, HyperparameterPoint};

/// Cartesian product of the grid's learning rates and epoch counts,
/// learning-rate major. Regularization and mini-batch size are not expanded.
pub fn expand_grid(grid: &HyperparameterGrid) -> Vec<HyperparameterPoint> {
    let mut points = Vec::with_capacity(grid.permutation_count());
    for &learning_rate in &grid.learning_rates {
        for &epochs in &grid.epochs {
            points.push(HyperparameterPoint::new(learning_rate, epochs));
        }
    }
    points
}

/// Split `0..len` into at most `parts` contiguous ranges of
/// `ceil(len / parts)` items; the last range takes the remainder. Every index
/// lands in exactly one range.
pub fn partition(len: usize, parts: usize) -> Vec<Range<usize>> {
    if len == 0 {
        return Vec::new();
    }
    let size = len.div_ceil(parts.max(1));
    (0..len)
        .step_by(size)
        .map(|start| start..(start + size).min(len))
        .collect()
}
