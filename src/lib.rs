//! Breed Scorer Rust Implementation
//!
//! Dog-breed adoption scoring and ranking over a read-only snapshot of
//! shelter records joined with tract-level census data.
//!
//! - `utils/`: normalization, partitioned ranking, Polars column helpers
//! - `data`: snapshot loading (parquet or CSV) into typed, indexed records
//! - `metrics/`: the analytic components (traits, suitability, shares, ...)
//! - `read_model`: explicitly refreshed derived tables
//! - `scorer`: `AdoptionScorer`, the validated entry point for all operations
//! - `api_server` (feature `api`): Axum HTTP boundary

pub mod utils;
pub mod error;
pub mod config;
pub mod data;
pub mod metrics;
pub mod params;
pub mod read_model;
pub mod scorer;

#[cfg(feature = "api")]
pub mod api_server;

// Re-export commonly used types
pub use config::EngineConfig;
pub use data::{AdoptionData, Tables};
pub use error::{EngineError, EngineResult};
pub use read_model::DerivedTables;
pub use scorer::AdoptionScorer;
pub use metrics::*;

#[cfg(feature = "api")]
pub use api_server::{create_router, AppState};
