//! Tract-level census aggregation
//!
//! Counties and states are never stored; they are grouping keys over tracts.
//! Averages follow SQL `AVG` semantics: missing values are ignored, and a
//! group with no present values has no average (`None`), not zero.

use std::collections::BTreeMap;

use crate::data::{AdoptionData, EconomicRecord};

/// Running arithmetic mean that skips missing values
///
/// Non-finite inputs (`NaN`, infinities from malformed exports) count as missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mean {
    sum: f64,
    count: usize,
}

impl Mean {
    pub fn push(&mut self, value: Option<f64>) {
        if let Some(v) = value.filter(|v| v.is_finite()) {
            self.sum += v;
            self.count += 1;
        }
    }

    pub fn value(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / self.count as f64)
    }
}

/// Raw county averages before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct CountyStats {
    pub county: String,
    pub avg_income: Option<f64>,
    pub avg_poverty: Option<f64>,
    pub avg_commute: Option<f64>,
}

/// Average income, poverty and commute per county over tracts with an economic record
///
/// Output is ordered by county name.
pub fn county_stats(data: &AdoptionData) -> Vec<CountyStats> {
    let mut groups: BTreeMap<&str, [Mean; 3]> = BTreeMap::new();

    for tract in data.tracts() {
        let Some(econ) = data.economics(tract.tract_id) else {
            continue;
        };
        let means = groups.entry(tract.county.as_str()).or_default();
        means[0].push(econ.income);
        means[1].push(econ.poverty);
        means[2].push(econ.mean_commute);
    }

    groups
        .into_iter()
        .map(|(county, [income, poverty, commute])| CountyStats {
            county: county.to_string(),
            avg_income: income.value(),
            avg_poverty: poverty.value(),
            avg_commute: commute.value(),
        })
        .collect()
}

/// Mean tract income per state (full state name), over tracts with an economic record
pub fn state_income_averages(data: &AdoptionData) -> BTreeMap<String, Option<f64>> {
    let mut groups: BTreeMap<&str, Mean> = BTreeMap::new();

    for tract in data.tracts() {
        if let Some(econ) = data.economics(tract.tract_id) {
            groups.entry(tract.state.as_str()).or_default().push(econ.income);
        }
    }

    groups
        .into_iter()
        .map(|(state, mean)| (state.to_string(), mean.value()))
        .collect()
}

/// State-level averages of the economic indicators a shelter is reported with
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CensusAverages {
    pub income: Option<f64>,
    pub unemployment: Option<f64>,
    pub poverty: Option<f64>,
    pub mean_commute: Option<f64>,
    pub income_per_cap: Option<f64>,
}

#[derive(Default)]
struct CensusAccumulator {
    income: Mean,
    unemployment: Mean,
    poverty: Mean,
    mean_commute: Mean,
    income_per_cap: Mean,
}

impl CensusAccumulator {
    fn push(&mut self, econ: &EconomicRecord) {
        self.income.push(econ.income);
        self.unemployment.push(econ.unemployment);
        self.poverty.push(econ.poverty);
        self.mean_commute.push(econ.mean_commute);
        self.income_per_cap.push(econ.income_per_cap);
    }

    fn finish(&self) -> CensusAverages {
        CensusAverages {
            income: self.income.value(),
            unemployment: self.unemployment.value(),
            poverty: self.poverty.value(),
            mean_commute: self.mean_commute.value(),
            income_per_cap: self.income_per_cap.value(),
        }
    }
}

/// Per-state census averages over tracts carrying both an economic and a demographic record
///
/// States with no such tract are absent from the map.
pub fn state_census_averages(data: &AdoptionData) -> BTreeMap<String, CensusAverages> {
    let mut groups: BTreeMap<&str, CensusAccumulator> = BTreeMap::new();

    for tract in data.tracts() {
        let (Some(econ), Some(_)) = (data.economics(tract.tract_id), data.demographics(tract.tract_id))
        else {
            continue;
        };
        groups.entry(tract.state.as_str()).or_default().push(econ);
    }

    groups
        .into_iter()
        .map(|(state, acc)| (state.to_string(), acc.finish()))
        .collect()
}
