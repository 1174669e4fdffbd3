//! # cal-search
//!
//! Hyperparameter grid search for Calibrate.
//!
//! Expands a grid into its learning-rate × epoch-count points, partitions
//! them into contiguous chunks, evaluates the chunks concurrently on a
//! shared thread pool, and reduces every chunk's local winner into a single
//! lock-protected [`BestSlot`].

mod aggregate;
mod config;
mod search;
mod worker;

pub use aggregate::BestSlot;
pub use config::SearchConfig;
pub use search::{expand_grid, partition};
pub use worker::{build_pool, evaluate_chunk, evaluate_sequential, GridWorker};
