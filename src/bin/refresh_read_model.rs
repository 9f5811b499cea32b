// Read Model Refresh
//
// Purpose: Recompute the derived tables from the current snapshot and write
// them as parquet, for servers started with READ_MODEL_DIR.
// Usage: cargo run --features cli --bin refresh_read_model [OUTPUT_DIR]

use anyhow::Context;
use breed_scorer_rust::{AdoptionData, DerivedTables, EngineConfig};
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "breed_scorer_rust=info,warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = EngineConfig::from_env()?;
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| config.read_model_dir.clone())
        .unwrap_or_else(|| config.data_dir.join("read_model"));

    let start = Instant::now();
    let data = AdoptionData::load(&config.data_dir)
        .with_context(|| format!("Failed to load snapshot from {:?}", config.data_dir))?;
    tracing::info!(
        "Loaded {} dogs across {} shelters in {:.2?}",
        data.dogs().len(),
        data.shelters().len(),
        start.elapsed()
    );

    let tables = DerivedTables::refresh(&data);
    tracing::info!(
        "Derived {} counties, {} breeds, {} breed/state shares",
        tables.county_features.len(),
        tables.breed_traits.len(),
        tables.breed_shares.len()
    );

    tables.write_parquet(&output_dir)?;
    tracing::info!("Done in {:.2?}", start.elapsed());
    Ok(())
}
