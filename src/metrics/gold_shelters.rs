//! Gold shelters and their economic context
//!
//! A gold shelter has no dog behind on vaccination. Computed as a set
//! difference: all shelters minus shelters with at least one dog whose
//! `shots_current` is explicitly false. A missing value is not a violation,
//! and a shelter with no dogs is always gold.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::data::AdoptionData;
use crate::metrics::census::CensusAverages;
use crate::utils::{rank_global, Selection};

/// Org ids of shelters with at least one dog known to be behind on shots
pub fn shelters_with_violations(data: &AdoptionData) -> BTreeSet<&str> {
    data.dogs()
        .iter()
        .filter(|dog| {
            data.attributes(dog.dog_id)
                .map_or(false, |attrs| attrs.shots_current == Some(false))
        })
        .map(|dog| dog.org_id.as_str())
        .collect()
}

/// Org ids of gold shelters
pub fn gold_shelters(data: &AdoptionData) -> BTreeSet<&str> {
    let all: BTreeSet<&str> = data.shelters().iter().map(|s| s.org_id.as_str()).collect();
    let violators = shelters_with_violations(data);
    all.difference(&violators).copied().collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShelterEconomics {
    pub org_id: String,
    pub city: String,
    pub state: String,
    pub avg_income: Option<f64>,
    pub avg_unemployment: Option<f64>,
    pub avg_poverty_rate: Option<f64>,
    pub avg_commute_time: Option<f64>,
    pub avg_income_per_capita: Option<f64>,
}

/// Gold shelters joined to the census averages of their state
///
/// `census` is keyed by full state name. Shelters whose state has no census
/// tracts are omitted. Ordered by average income descending (missing or
/// non-finite last), then org id.
pub fn shelter_economics(
    data: &AdoptionData,
    census: &BTreeMap<String, CensusAverages>,
) -> Vec<ShelterEconomics> {
    let gold = gold_shelters(data);

    let rows: Vec<ShelterEconomics> = data
        .shelters()
        .iter()
        .filter(|s| gold.contains(s.org_id.as_str()))
        .filter_map(|shelter| {
            let state_name = data.state_name(&shelter.state)?;
            let averages = census.get(state_name)?;
            Some(ShelterEconomics {
                org_id: shelter.org_id.clone(),
                city: shelter.city.clone(),
                state: shelter.state.clone(),
                avg_income: averages.income,
                avg_unemployment: averages.unemployment,
                avg_poverty_rate: averages.poverty,
                avg_commute_time: averages.mean_commute,
                avg_income_per_capita: averages.income_per_cap,
            })
        })
        .collect();

    let by_org = |a: &ShelterEconomics, b: &ShelterEconomics| -> Ordering { a.org_id.cmp(&b.org_id) };

    rank_global(
        rows,
        |r| r.avg_income.filter(|v| v.is_finite()).unwrap_or(f64::NEG_INFINITY),
        Some(&by_org),
        Selection::All,
    )
    .into_iter()
    .map(|ranked| ranked.item)
    .collect()
}
