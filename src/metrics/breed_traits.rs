//! Breed trait aggregation
//!
//! Per-breed fractional traits: the mean of a 0/1 indicator over the dogs of
//! a primary breed that carry an attribute row. A missing attribute value
//! counts as "predicate false" but the dog stays in the denominator.
//!
//! Breeds without any attributed dog are left out entirely, so no trait is
//! ever 0/0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::data::{AdoptionData, DogAttributes};

/// Coat value counted as long-haired
pub const LONG_COAT: &str = "Long";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedTraits {
    pub breed: String,
    pub pct_fixed: f64,
    pub pct_long_coat: f64,
    pub pct_special_needs: f64,
    /// All dogs of the breed, with or without attributes
    pub popularity_count: u64,
    /// Dogs of the breed with an attribute row (trait denominator)
    pub attributed_count: u64,
}

#[derive(Default)]
struct TraitCounts {
    popularity: u64,
    attributed: u64,
    fixed: u64,
    long_coat: u64,
    special_needs: u64,
}

impl TraitCounts {
    fn observe(&mut self, attributes: Option<&DogAttributes>) {
        self.popularity += 1;
        let Some(attrs) = attributes else {
            return;
        };
        self.attributed += 1;
        self.fixed += u64::from(attrs.fixed == Some(true));
        self.long_coat += u64::from(attrs.coat.as_deref() == Some(LONG_COAT));
        self.special_needs += u64::from(attrs.special_needs == Some(true));
    }
}

/// Compute traits for every breed with at least one attributed dog, ordered by breed
pub fn breed_traits(data: &AdoptionData) -> Vec<BreedTraits> {
    let mut counts: BTreeMap<&str, TraitCounts> = BTreeMap::new();

    for dog in data.dogs() {
        let Some(breed) = data.primary_breed(dog.dog_id) else {
            continue;
        };
        counts.entry(breed).or_default().observe(data.attributes(dog.dog_id));
    }

    counts
        .into_iter()
        .filter(|(_, c)| c.attributed > 0)
        .map(|(breed, c)| {
            let n = c.attributed as f64;
            BreedTraits {
                breed: breed.to_string(),
                pct_fixed: c.fixed as f64 / n,
                pct_long_coat: c.long_coat as f64 / n,
                pct_special_needs: c.special_needs as f64 / n,
                popularity_count: c.popularity,
                attributed_count: c.attributed,
            }
        })
        .collect()
}
