//! Dog supply relative to state income
//!
//! `ratio = num_dogs / median_income` per shelter state, ranked globally with
//! no cutoff. `median_income` is the mean tract income of the state; the name
//! is the established output field.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::AdoptionData;
use crate::utils::{rank_global, Selection};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplyIncome {
    /// State abbreviation
    pub state: String,
    pub median_income: f64,
    pub num_dogs: u64,
    pub rank: usize,
}

/// Rank shelter states by dog count per unit of income
///
/// `state_income` is keyed by full state name. States without a usable
/// (present, non-zero) income are left out.
pub fn supply_income(data: &AdoptionData, state_income: &BTreeMap<String, Option<f64>>) -> Vec<SupplyIncome> {
    let mut dogs_per_state: BTreeMap<&str, u64> = BTreeMap::new();
    for (_, shelter) in data.dogs_with_shelters() {
        *dogs_per_state.entry(shelter.state.as_str()).or_default() += 1;
    }

    let rows: Vec<SupplyIncome> = dogs_per_state
        .into_iter()
        .filter_map(|(abbrev, num_dogs)| {
            let name = data.state_name(abbrev)?;
            let income = (*state_income.get(name)?).filter(|v| *v != 0.0 && v.is_finite())?;
            Some(SupplyIncome {
                state: abbrev.to_string(),
                median_income: income,
                num_dogs,
                rank: 0,
            })
        })
        .collect();

    let by_state = |a: &SupplyIncome, b: &SupplyIncome| -> Ordering { a.state.cmp(&b.state) };

    rank_global(rows, |r| r.num_dogs as f64 / r.median_income, Some(&by_state), Selection::All)
        .into_iter()
        .map(|ranked| SupplyIncome { rank: ranked.rank, ..ranked.item })
        .collect()
}
