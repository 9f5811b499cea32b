//! Income-bracket breed recommendation
//!
//! The user's income is clamped to the range state averages actually span,
//! then breeds are aggregated over the states whose average tract income lies
//! within the window around it.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::AdoptionData;
use crate::metrics::census::Mean;
use crate::utils::{rank_global, Selection};

pub const MIN_STATE_AVG_INCOME: f64 = 30_000.0;
pub const MAX_STATE_AVG_INCOME: f64 = 85_000.0;
/// Half-width of the qualifying window around the clamped income
pub const INCOME_WINDOW: f64 = 20_000.0;
pub const INCOME_RECOMMEND_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeWindow {
    pub low: f64,
    pub high: f64,
}

impl IncomeWindow {
    pub fn around(income: f64) -> Self {
        let center = clamp_income(income);
        IncomeWindow {
            low: center - INCOME_WINDOW,
            high: center + INCOME_WINDOW,
        }
    }

    /// Inclusive on both ends
    pub fn contains(&self, value: f64) -> bool {
        self.low <= value && value <= self.high
    }
}

pub fn clamp_income(income: f64) -> f64 {
    income.clamp(MIN_STATE_AVG_INCOME, MAX_STATE_AVG_INCOME)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeRecommendation {
    pub breed_primary: String,
    pub total_adoptions: u64,
    pub avg_income_for_breed: f64,
}

#[derive(Default)]
struct BreedTotals {
    adoptions: u64,
    income: Mean,
}

/// Top breeds by adoptions across qualifying states
///
/// `state_income` is keyed by full state name. `avg_income_for_breed` is the
/// mean of the qualifying state averages over the states where the breed appears.
pub fn income_recommend(
    data: &AdoptionData,
    state_income: &BTreeMap<String, Option<f64>>,
    income: f64,
) -> Vec<IncomeRecommendation> {
    let window = IncomeWindow::around(income);

    let mut per_state: BTreeMap<(&str, &str), u64> = BTreeMap::new();
    for (dog, shelter) in data.dogs_with_shelters() {
        let (Some(breed), Some(state)) = (data.primary_breed(dog.dog_id), data.state_name(&shelter.state)) else {
            continue;
        };
        *per_state.entry((state, breed)).or_default() += 1;
    }

    let mut per_breed: BTreeMap<&str, BreedTotals> = BTreeMap::new();
    for ((state, breed), count) in per_state {
        let Some(avg) = state_income.get(state).copied().flatten() else {
            continue;
        };
        if !window.contains(avg) {
            continue;
        }
        let totals = per_breed.entry(breed).or_default();
        totals.adoptions += count;
        totals.income.push(Some(avg));
    }

    let rows: Vec<IncomeRecommendation> = per_breed
        .into_iter()
        .filter_map(|(breed, totals)| {
            Some(IncomeRecommendation {
                breed_primary: breed.to_string(),
                total_adoptions: totals.adoptions,
                avg_income_for_breed: totals.income.value()?,
            })
        })
        .collect();

    let by_breed = |a: &IncomeRecommendation, b: &IncomeRecommendation| -> Ordering {
        a.breed_primary.cmp(&b.breed_primary)
    };

    rank_global(
        rows,
        |r| r.total_adoptions as f64,
        Some(&by_breed),
        Selection::First(INCOME_RECOMMEND_LIMIT),
    )
    .into_iter()
    .map(|ranked| ranked.item)
    .collect()
}
