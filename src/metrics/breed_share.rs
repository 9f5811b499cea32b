//! Breed share per state (over-representation)
//!
//! `breed_share = dogs of breed in state / all dogs in state`, where the state
//! is the shelter's state. Only (breed, state) pairs with at least one dog
//! are materialized, so every emitted share lies in (0, 1].

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::AdoptionData;
use crate::utils::{rank_partitioned, Selection};

/// States kept per breed
pub const TOP_STATES_PER_BREED: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedStateShare {
    pub breed_primary: String,
    pub state: String,
    pub breed_count_in_state: u64,
    pub total_dogs_in_state: u64,
    pub breed_share: f64,
}

/// Every (breed, state) share, ordered by breed then state
pub fn breed_state_shares(data: &AdoptionData) -> Vec<BreedStateShare> {
    let mut state_totals: BTreeMap<&str, u64> = BTreeMap::new();
    let mut pair_counts: BTreeMap<(&str, &str), u64> = BTreeMap::new();

    for (dog, shelter) in data.dogs_with_shelters() {
        *state_totals.entry(shelter.state.as_str()).or_default() += 1;
        if let Some(breed) = data.primary_breed(dog.dog_id) {
            *pair_counts.entry((breed, shelter.state.as_str())).or_default() += 1;
        }
    }

    pair_counts
        .into_iter()
        .filter_map(|((breed, state), count)| {
            let total = *state_totals.get(state)?;
            Some(BreedStateShare {
                breed_primary: breed.to_string(),
                state: state.to_string(),
                breed_count_in_state: count,
                total_dogs_in_state: total,
                breed_share: count as f64 / total as f64,
            })
        })
        .collect()
}

/// States where each breed is most over-represented
///
/// Partitioned by breed, ranked by share descending, rank <= 5 kept.
/// Output is ordered by breed, then share descending, then state.
pub fn over_represented(shares: &[BreedStateShare]) -> Vec<BreedStateShare> {
    let by_state = |a: &BreedStateShare, b: &BreedStateShare| -> Ordering { a.state.cmp(&b.state) };

    rank_partitioned(
        shares.to_vec(),
        |s| s.breed_primary.clone(),
        |s| s.breed_share,
        Some(&by_state),
        Selection::TopRank(TOP_STATES_PER_BREED),
    )
    .into_iter()
    .map(|ranked| ranked.item)
    .collect()
}
