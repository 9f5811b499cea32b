//! Request parameter records
//!
//! Every operation takes a record of raw optional text fields, exactly as a
//! query string delivers them, and validates it before any aggregation runs.
//! Blank values count as absent.

use serde::Deserialize;

use crate::error::{EngineError, EngineResult};
use crate::metrics::PreferenceFilters;

/// Trimmed value, or `None` when absent or blank
fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn required(name: &'static str, value: &Option<String>) -> EngineResult<String> {
    present(value).ok_or(EngineError::MissingRequiredParameter { name })
}

/// `true` / `false` (any case); blank is unset
fn flag(name: &'static str, value: &Option<String>) -> EngineResult<Option<bool>> {
    let Some(raw) = present(value) else {
        return Ok(None);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        _ => Err(EngineError::InvalidParameter {
            name,
            reason: format!("expected true or false, got '{}'", raw),
        }),
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopBreedParams {
    pub state: Option<String>,
}

impl TopBreedParams {
    pub fn validate(&self) -> EngineResult<Option<String>> {
        Ok(present(&self.state))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecommendParams {
    pub county: Option<String>,
}

impl RecommendParams {
    pub fn validate(&self) -> EngineResult<String> {
        required("county", &self.county)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct IncomeParams {
    pub income: Option<String>,
}

impl IncomeParams {
    pub fn validate(&self) -> EngineResult<f64> {
        let raw = required("income", &self.income)?;
        match raw.parse::<f64>() {
            Ok(income) if income.is_finite() => Ok(income),
            _ => Err(EngineError::InvalidParameter {
                name: "income",
                reason: format!("'{}' is not a number", raw),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CityParams {
    pub city: Option<String>,
}

impl CityParams {
    pub fn validate(&self) -> EngineResult<String> {
        required("city", &self.city)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SampleDogsParams {
    #[serde(alias = "target_state_abbrev")]
    pub target_state: Option<String>,
    pub chosen_breed: Option<String>,
}

/// Validated sample-dogs request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleDogsQuery {
    pub state: String,
    pub breed: String,
}

impl SampleDogsParams {
    pub fn validate(&self) -> EngineResult<SampleDogsQuery> {
        Ok(SampleDogsQuery {
            state: required("target_state", &self.target_state)?,
            breed: required("chosen_breed", &self.chosen_breed)?,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PreferenceParams {
    #[serde(alias = "pref_color")]
    pub color: Option<String>,
    #[serde(alias = "pref_size")]
    pub size: Option<String>,
    #[serde(alias = "pref_breed")]
    pub breed: Option<String>,
    #[serde(alias = "pref_age")]
    pub age: Option<String>,
    #[serde(alias = "pref_sex")]
    pub sex: Option<String>,
    #[serde(alias = "pref_fixed")]
    pub fixed: Option<String>,
    #[serde(alias = "pref_house_trained")]
    pub house_trained: Option<String>,
    #[serde(alias = "pref_coat")]
    pub coat: Option<String>,
    #[serde(alias = "pref_shots_current")]
    pub shots_current: Option<String>,
}

impl PreferenceParams {
    pub fn validate(&self) -> EngineResult<PreferenceFilters> {
        Ok(PreferenceFilters {
            color: present(&self.color),
            size: present(&self.size),
            breed: present(&self.breed),
            age: present(&self.age),
            sex: present(&self.sex),
            fixed: flag("fixed", &self.fixed)?,
            house_trained: flag("house_trained", &self.house_trained)?,
            coat: present(&self.coat),
            shots_current: flag("shots_current", &self.shots_current)?,
        })
    }
}
