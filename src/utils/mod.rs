//! Utility modules shared across the analytic operations
//!
//! - Normalization: min-max scaling over a grouped population
//! - Ranking: partitioned competition rank with top-k / limit selection
//! - LazyFrame helpers: safe materialization and typed column extraction

pub mod normalization;
pub mod ranking;
pub mod lazy_helpers;

// Re-export commonly used types
pub use normalization::{MinMax, min_max_normalize};
pub use ranking::{rank_global, rank_partitioned, Ranked, Selection, TieBreak};
pub use lazy_helpers::{materialize_with_columns, str_values, f64_values, i64_values, bool_values};
