//! Adoption Scorer - per-snapshot coordinator for the analytic operations
//!
//! Owns one `AdoptionData` snapshot and the `DerivedTables` built from it.
//! Every operation validates its parameter record first, then runs a
//! read-only computation against this single snapshot, so aggregates and the
//! rows they are joined against can never come from different data.

use std::path::Path;
use std::time::Instant;

use crate::config::EngineConfig;
use crate::data::AdoptionData;
use crate::error::{EngineError, EngineResult};
use crate::metrics::{
    self, state_census_averages, state_income_averages, BreedRecommendation, BreedStateShare, CityBreed, CityDog,
    IncomeRecommendation, PreferenceMatch, SampleDog, ShelterEconomics, StateTopBreed, SupplyIncome,
};
use crate::params::{CityParams, IncomeParams, PreferenceParams, RecommendParams, SampleDogsParams, TopBreedParams};
use crate::read_model::DerivedTables;

/// Main adoption scorer
pub struct AdoptionScorer {
    data: AdoptionData,
    tables: DerivedTables,
}

fn timed<T, F>(operation: &str, f: F) -> Vec<T>
where
    F: FnOnce() -> Vec<T>,
{
    let start = Instant::now();
    let rows = f();
    tracing::debug!(
        rows = rows.len(),
        "{} computed in {:.2} ms",
        operation,
        start.elapsed().as_secs_f64() * 1000.0
    );
    rows
}

impl AdoptionScorer {
    /// Load a snapshot from `data_dir` and build its read model
    pub fn new(data_dir: &Path) -> EngineResult<Self> {
        let data = AdoptionData::load(data_dir).map_err(EngineError::upstream)?;
        Ok(Self::from_data(data))
    }

    /// Load according to configuration, reusing a stored read model when one is configured
    ///
    /// A stored model derived from a different snapshot is ignored and the
    /// tables are recomputed, so both halves always describe the same data.
    pub fn from_config(config: &EngineConfig) -> EngineResult<Self> {
        let data = AdoptionData::load(&config.data_dir).map_err(EngineError::upstream)?;

        let Some(dir) = &config.read_model_dir else {
            return Ok(Self::from_data(data));
        };

        let tables = DerivedTables::load_parquet(dir).map_err(EngineError::upstream)?;
        if tables.matches(&data) {
            Ok(Self::with_tables(data, tables))
        } else {
            tracing::warn!(
                "Read model in {:?} was built from a different snapshot; recomputing",
                dir
            );
            Ok(Self::from_data(data))
        }
    }

    /// Wrap an in-memory snapshot, computing the read model directly
    pub fn from_data(data: AdoptionData) -> Self {
        let tables = DerivedTables::refresh(&data);
        Self { data, tables }
    }

    /// Wrap a snapshot with a read model built elsewhere from the same snapshot
    ///
    /// Callers check [`DerivedTables::matches`] first; [`AdoptionScorer::from_config`] does.
    pub fn with_tables(data: AdoptionData, tables: DerivedTables) -> Self {
        Self { data, tables }
    }

    pub fn data(&self) -> &AdoptionData {
        &self.data
    }

    pub fn tables(&self) -> &DerivedTables {
        &self.tables
    }

    pub fn top_breed_per_state(&self, params: &TopBreedParams) -> EngineResult<Vec<StateTopBreed>> {
        let state = params.validate()?;
        Ok(timed("top_breed_per_state", || {
            metrics::top_breed_per_state(&self.data, state.as_deref())
        }))
    }

    pub fn recommend_breeds(&self, params: &RecommendParams) -> EngineResult<Vec<BreedRecommendation>> {
        let county = params.validate()?;
        Ok(timed("recommend_breeds", || {
            metrics::recommend_breeds(&self.tables.county_features, &self.tables.breed_traits, &county)
        }))
    }

    pub fn shelter_economics(&self) -> Vec<ShelterEconomics> {
        timed("shelter_economics", || {
            metrics::shelter_economics(&self.data, &state_census_averages(&self.data))
        })
    }

    pub fn supply_income(&self) -> Vec<SupplyIncome> {
        timed("supply_income", || {
            metrics::supply_income(&self.data, &state_income_averages(&self.data))
        })
    }

    pub fn over_represented(&self) -> Vec<BreedStateShare> {
        timed("over_represented", || metrics::over_represented(&self.tables.breed_shares))
    }

    pub fn user_preferred(&self, params: &PreferenceParams) -> EngineResult<Vec<PreferenceMatch>> {
        let filters = params.validate()?;
        Ok(timed("user_preferred", || metrics::user_preferred(&self.data, &filters)))
    }

    pub fn income_recommend(&self, params: &IncomeParams) -> EngineResult<Vec<IncomeRecommendation>> {
        let income = params.validate()?;
        Ok(timed("income_recommend", || {
            metrics::income_recommend(&self.data, &state_income_averages(&self.data), income)
        }))
    }

    pub fn city_breeds(&self) -> Vec<CityBreed> {
        timed("city_breeds", || metrics::city_breeds(&self.data))
    }

    pub fn sample_dogs(&self, params: &SampleDogsParams) -> EngineResult<Vec<SampleDog>> {
        let query = params.validate()?;
        Ok(timed("sample_dogs", || {
            metrics::sample_dogs(&self.data, &query.state, &query.breed)
        }))
    }

    pub fn dogs_by_city(&self, params: &CityParams) -> EngineResult<Vec<CityDog>> {
        let city = params.validate()?;
        Ok(timed("dogs_by_city", || metrics::dogs_by_city(&self.data, &city)))
    }
}
