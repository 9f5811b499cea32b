//! Derived read model
//!
//! Denormalized tables precomputed from one snapshot and consumed by the
//! breed recommendation and over-representation operations:
//!
//! - `county_features.parquet`: county averages with min-max normalized values
//! - `breed_traits.parquet`: per-breed trait fractions and popularity
//! - `breed_state_shares.parquet`: every (breed, state) share, unranked
//! - `read_model.json`: fingerprint of the snapshot the tables came from
//!
//! Tables are rebuilt explicitly (`refresh`) by the batch job or on an admin
//! reload, never incrementally. Floats are stored as f64 parquet columns, so a
//! loaded model yields the same results as a fresh refresh of the same snapshot.

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::*;

use serde::{Deserialize, Serialize};

use crate::data::{AdoptionData, SnapshotFingerprint};
use crate::metrics::{
    breed_state_shares, breed_traits, county_features, county_stats, BreedStateShare, BreedTraits,
    CountyFeatures,
};
use crate::utils::{f64_values, i64_values, materialize_with_columns, str_values};

pub const COUNTY_FEATURES_FILE: &str = "county_features.parquet";
pub const BREED_TRAITS_FILE: &str = "breed_traits.parquet";
pub const BREED_SHARES_FILE: &str = "breed_state_shares.parquet";
pub const MANIFEST_FILE: &str = "read_model.json";

const COUNTY_FEATURE_COLS: &[&str] = &[
    "county", "avg_income", "avg_poverty", "avg_commute", "norm_income", "norm_poverty", "norm_commute",
];
const BREED_TRAIT_COLS: &[&str] = &[
    "breed", "pct_fixed", "pct_long_coat", "pct_special_needs", "popularity_count", "attributed_count",
];
const BREED_SHARE_COLS: &[&str] = &[
    "breed_primary", "state", "breed_count_in_state", "total_dogs_in_state", "breed_share",
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DerivedTables {
    pub county_features: Vec<CountyFeatures>,
    pub breed_traits: Vec<BreedTraits>,
    pub breed_shares: Vec<BreedStateShare>,
    /// Snapshot these tables were computed from
    pub source: SnapshotFingerprint,
}

#[derive(Debug, Serialize, Deserialize)]
struct Manifest {
    source: SnapshotFingerprint,
}

impl DerivedTables {
    /// Recompute all tables from one snapshot
    pub fn refresh(data: &AdoptionData) -> Self {
        let start = Instant::now();

        let (county_features, (breed_traits, breed_shares)) = rayon::join(
            || county_features(county_stats(data)),
            || rayon::join(|| breed_traits(data), || breed_state_shares(data)),
        );

        tracing::info!(
            counties = county_features.len(),
            breeds = breed_traits.len(),
            shares = breed_shares.len(),
            "Read model refreshed in {:.1} ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        DerivedTables {
            county_features,
            breed_traits,
            breed_shares,
            source: data.fingerprint(),
        }
    }

    /// True when these tables were derived from `data`
    pub fn matches(&self, data: &AdoptionData) -> bool {
        self.source == data.fingerprint()
    }

    /// Write the three tables as zstd-compressed parquet files into `dir`
    pub fn write_parquet(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).with_context(|| format!("Failed to create {:?}", dir))?;

        write_frame(&mut self.county_frame()?, &dir.join(COUNTY_FEATURES_FILE))?;
        write_frame(&mut self.traits_frame()?, &dir.join(BREED_TRAITS_FILE))?;
        write_frame(&mut self.shares_frame()?, &dir.join(BREED_SHARES_FILE))?;
        write_manifest(&Manifest { source: self.source }, &dir.join(MANIFEST_FILE))?;

        tracing::info!("Read model written to {:?}", dir);
        Ok(())
    }

    /// Load tables previously written by [`DerivedTables::write_parquet`]
    pub fn load_parquet(dir: &Path) -> Result<Self> {
        let county_df = read_frame(&dir.join(COUNTY_FEATURES_FILE), COUNTY_FEATURE_COLS, "county features")?;
        let traits_df = read_frame(&dir.join(BREED_TRAITS_FILE), BREED_TRAIT_COLS, "breed traits")?;
        let shares_df = read_frame(&dir.join(BREED_SHARES_FILE), BREED_SHARE_COLS, "breed shares")?;
        let manifest = read_manifest(&dir.join(MANIFEST_FILE))?;

        let tables = DerivedTables {
            county_features: parse_county_features(&county_df)?,
            breed_traits: parse_breed_traits(&traits_df)?,
            breed_shares: parse_breed_shares(&shares_df)?,
            source: manifest.source,
        };

        tracing::info!(
            counties = tables.county_features.len(),
            breeds = tables.breed_traits.len(),
            "Read model loaded from {:?}",
            dir
        );
        Ok(tables)
    }

    fn county_frame(&self) -> Result<DataFrame> {
        let rows = &self.county_features;
        let df = DataFrame::new(vec![
            Series::new("county".into(), rows.iter().map(|r| r.county.as_str()).collect::<Vec<_>>()).into(),
            Series::new("avg_income".into(), rows.iter().map(|r| r.avg_income).collect::<Vec<_>>()).into(),
            Series::new("avg_poverty".into(), rows.iter().map(|r| r.avg_poverty).collect::<Vec<_>>()).into(),
            Series::new("avg_commute".into(), rows.iter().map(|r| r.avg_commute).collect::<Vec<_>>()).into(),
            Series::new("norm_income".into(), rows.iter().map(|r| r.norm_income).collect::<Vec<_>>()).into(),
            Series::new("norm_poverty".into(), rows.iter().map(|r| r.norm_poverty).collect::<Vec<_>>()).into(),
            Series::new("norm_commute".into(), rows.iter().map(|r| r.norm_commute).collect::<Vec<_>>()).into(),
        ])?;
        Ok(df)
    }

    fn traits_frame(&self) -> Result<DataFrame> {
        let rows = &self.breed_traits;
        let df = DataFrame::new(vec![
            Series::new("breed".into(), rows.iter().map(|r| r.breed.as_str()).collect::<Vec<_>>()).into(),
            Series::new("pct_fixed".into(), rows.iter().map(|r| r.pct_fixed).collect::<Vec<_>>()).into(),
            Series::new("pct_long_coat".into(), rows.iter().map(|r| r.pct_long_coat).collect::<Vec<_>>()).into(),
            Series::new("pct_special_needs".into(), rows.iter().map(|r| r.pct_special_needs).collect::<Vec<_>>()).into(),
            Series::new("popularity_count".into(), rows.iter().map(|r| r.popularity_count).collect::<Vec<_>>()).into(),
            Series::new("attributed_count".into(), rows.iter().map(|r| r.attributed_count).collect::<Vec<_>>()).into(),
        ])?;
        Ok(df)
    }

    fn shares_frame(&self) -> Result<DataFrame> {
        let rows = &self.breed_shares;
        let df = DataFrame::new(vec![
            Series::new("breed_primary".into(), rows.iter().map(|r| r.breed_primary.as_str()).collect::<Vec<_>>()).into(),
            Series::new("state".into(), rows.iter().map(|r| r.state.as_str()).collect::<Vec<_>>()).into(),
            Series::new("breed_count_in_state".into(), rows.iter().map(|r| r.breed_count_in_state).collect::<Vec<_>>()).into(),
            Series::new("total_dogs_in_state".into(), rows.iter().map(|r| r.total_dogs_in_state).collect::<Vec<_>>()).into(),
            Series::new("breed_share".into(), rows.iter().map(|r| r.breed_share).collect::<Vec<_>>()).into(),
        ])?;
        Ok(df)
    }
}

fn write_frame(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Zstd(None))
        .finish(df)
        .with_context(|| format!("Failed to write parquet: {:?}", path))?;
    tracing::debug!("Wrote {} rows to {:?}", df.height(), path);
    Ok(())
}

fn write_manifest(manifest: &Manifest, path: &Path) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    serde_json::to_writer_pretty(file, manifest)
        .with_context(|| format!("Failed to write manifest: {:?}", path))
}

fn read_manifest(path: &Path) -> Result<Manifest> {
    let file = fs::File::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    serde_json::from_reader(std::io::BufReader::new(file))
        .with_context(|| format!("Failed to parse manifest: {:?}", path))
}

fn read_frame(path: &Path, columns: &[&str], context: &str) -> Result<DataFrame> {
    let lazy = LazyFrame::scan_parquet(path, Default::default())
        .with_context(|| format!("Failed to scan parquet: {:?}", path))?;
    materialize_with_columns(&lazy, columns, context)
}

fn required_text(values: Vec<Option<String>>, column: &str, context: &str) -> Result<Vec<String>> {
    values
        .into_iter()
        .map(|v| v.with_context(|| format!("{}: null in required column '{}'", context, column)))
        .collect()
}

fn required_f64(values: Vec<Option<f64>>, column: &str, context: &str) -> Result<Vec<f64>> {
    values
        .into_iter()
        .map(|v| v.with_context(|| format!("{}: null in required column '{}'", context, column)))
        .collect()
}

fn required_count(values: Vec<Option<i64>>, column: &str, context: &str) -> Result<Vec<u64>> {
    values
        .into_iter()
        .map(|v| {
            let n = v.with_context(|| format!("{}: null in required column '{}'", context, column))?;
            u64::try_from(n).with_context(|| format!("{}: negative count in '{}'", context, column))
        })
        .collect()
}

fn parse_county_features(df: &DataFrame) -> Result<Vec<CountyFeatures>> {
    let ctx = "county features";
    let counties = required_text(str_values(df, "county", ctx)?, "county", ctx)?;
    let avg_income = f64_values(df, "avg_income", ctx)?;
    let avg_poverty = f64_values(df, "avg_poverty", ctx)?;
    let avg_commute = f64_values(df, "avg_commute", ctx)?;
    let norm_income = f64_values(df, "norm_income", ctx)?;
    let norm_poverty = f64_values(df, "norm_poverty", ctx)?;
    let norm_commute = f64_values(df, "norm_commute", ctx)?;

    Ok(counties
        .into_iter()
        .enumerate()
        .map(|(i, county)| CountyFeatures {
            county,
            avg_income: avg_income[i],
            avg_poverty: avg_poverty[i],
            avg_commute: avg_commute[i],
            norm_income: norm_income[i],
            norm_poverty: norm_poverty[i],
            norm_commute: norm_commute[i],
        })
        .collect())
}

fn parse_breed_traits(df: &DataFrame) -> Result<Vec<BreedTraits>> {
    let ctx = "breed traits";
    let breeds = required_text(str_values(df, "breed", ctx)?, "breed", ctx)?;
    let pct_fixed = required_f64(f64_values(df, "pct_fixed", ctx)?, "pct_fixed", ctx)?;
    let pct_long_coat = required_f64(f64_values(df, "pct_long_coat", ctx)?, "pct_long_coat", ctx)?;
    let pct_special_needs = required_f64(f64_values(df, "pct_special_needs", ctx)?, "pct_special_needs", ctx)?;
    let popularity = required_count(i64_values(df, "popularity_count", ctx)?, "popularity_count", ctx)?;
    let attributed = required_count(i64_values(df, "attributed_count", ctx)?, "attributed_count", ctx)?;

    Ok(breeds
        .into_iter()
        .enumerate()
        .map(|(i, breed)| BreedTraits {
            breed,
            pct_fixed: pct_fixed[i],
            pct_long_coat: pct_long_coat[i],
            pct_special_needs: pct_special_needs[i],
            popularity_count: popularity[i],
            attributed_count: attributed[i],
        })
        .collect())
}

fn parse_breed_shares(df: &DataFrame) -> Result<Vec<BreedStateShare>> {
    let ctx = "breed shares";
    let breeds = required_text(str_values(df, "breed_primary", ctx)?, "breed_primary", ctx)?;
    let states = required_text(str_values(df, "state", ctx)?, "state", ctx)?;
    let counts = required_count(i64_values(df, "breed_count_in_state", ctx)?, "breed_count_in_state", ctx)?;
    let totals = required_count(i64_values(df, "total_dogs_in_state", ctx)?, "total_dogs_in_state", ctx)?;
    let shares = required_f64(f64_values(df, "breed_share", ctx)?, "breed_share", ctx)?;

    Ok(breeds
        .into_iter()
        .zip(states)
        .enumerate()
        .map(|(i, (breed_primary, state))| BreedStateShare {
            breed_primary,
            state,
            breed_count_in_state: counts[i],
            total_dogs_in_state: totals[i],
            breed_share: shares[i],
        })
        .collect())
}
