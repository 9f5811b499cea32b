//! Preference matching
//!
//! Scores individual dogs against up to nine optional user filters.
//! An unset filter always counts as a match, so filters only add
//! discriminating power and never penalize. Comparison is exact equality;
//! a dog with a missing value never matches a set filter.
//!
//! Candidates are restricted to dogs with a breed row, an attribute row and a
//! description mentioning [`FRIENDLY_KEYWORD`]. The keyword is fixed and not
//! taken from the request.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::data::{AdoptionData, Dog, DogAttributes, DogBreed, DogDescription};
use crate::utils::{rank_global, Selection};

/// Description keyword a candidate must contain (case-insensitive)
pub const FRIENDLY_KEYWORD: &str = "friendly";

/// Number of filters a dog is scored on
pub const FILTER_COUNT: u32 = 9;

/// Maximum rows returned
pub const PREFERENCE_LIMIT: usize = 10;

/// Validated preference filters; `None` means unset
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreferenceFilters {
    pub color: Option<String>,
    pub size: Option<String>,
    pub breed: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub fixed: Option<bool>,
    pub house_trained: Option<bool>,
    pub coat: Option<String>,
    pub shots_current: Option<bool>,
}

#[derive(Debug, Clone, Copy)]
enum Criterion<'a> {
    Color(&'a str),
    Size(&'a str),
    Breed(&'a str),
    Age(&'a str),
    Sex(&'a str),
    Fixed(bool),
    HouseTrained(bool),
    Coat(&'a str),
    ShotsCurrent(bool),
}

struct Candidate<'a> {
    dog: &'a Dog,
    breed: &'a DogBreed,
    attrs: &'a DogAttributes,
    description: &'a DogDescription,
}

fn text_eq(value: &Option<String>, wanted: &str) -> bool {
    value.as_deref() == Some(wanted)
}

impl Criterion<'_> {
    fn matches(&self, c: &Candidate<'_>) -> bool {
        match *self {
            Criterion::Color(v) => text_eq(&c.attrs.color_primary, v),
            Criterion::Size(v) => text_eq(&c.dog.size, v),
            Criterion::Breed(v) => text_eq(&c.breed.breed_primary, v),
            Criterion::Age(v) => text_eq(&c.dog.age, v),
            Criterion::Sex(v) => text_eq(&c.dog.sex, v),
            Criterion::Fixed(v) => c.attrs.fixed == Some(v),
            Criterion::HouseTrained(v) => c.attrs.house_trained == Some(v),
            Criterion::Coat(v) => text_eq(&c.attrs.coat, v),
            Criterion::ShotsCurrent(v) => c.attrs.shots_current == Some(v),
        }
    }
}

impl PreferenceFilters {
    /// Filters that are set
    fn active(&self) -> SmallVec<[Criterion<'_>; 9]> {
        let mut active = SmallVec::new();
        if let Some(v) = &self.color {
            active.push(Criterion::Color(v));
        }
        if let Some(v) = &self.size {
            active.push(Criterion::Size(v));
        }
        if let Some(v) = &self.breed {
            active.push(Criterion::Breed(v));
        }
        if let Some(v) = &self.age {
            active.push(Criterion::Age(v));
        }
        if let Some(v) = &self.sex {
            active.push(Criterion::Sex(v));
        }
        if let Some(v) = self.fixed {
            active.push(Criterion::Fixed(v));
        }
        if let Some(v) = self.house_trained {
            active.push(Criterion::HouseTrained(v));
        }
        if let Some(v) = &self.coat {
            active.push(Criterion::Coat(v));
        }
        if let Some(v) = self.shots_current {
            active.push(Criterion::ShotsCurrent(v));
        }
        active
    }

    pub fn is_empty(&self) -> bool {
        self.active().is_empty()
    }
}

/// Dog row returned by a preference match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceMatch {
    pub dog_id: i64,
    pub name: Option<String>,
    pub age: Option<String>,
    pub sex: Option<String>,
    pub size: Option<String>,
    pub color_primary: Option<String>,
    pub coat: Option<String>,
    pub fixed: Option<bool>,
    pub house_trained: Option<bool>,
    pub shots_current: Option<bool>,
    pub breed_primary: Option<String>,
    pub description: String,
    pub match_score: u32,
}

fn match_score(criteria: &[Criterion<'_>], candidate: &Candidate<'_>) -> u32 {
    let vacuous = FILTER_COUNT - criteria.len() as u32;
    let matched = criteria.iter().filter(|c| c.matches(candidate)).count() as u32;
    vacuous + matched
}

fn is_friendly(description: &DogDescription) -> bool {
    description.text.to_lowercase().contains(FRIENDLY_KEYWORD)
}

/// Top matches ordered by score descending, dog id ascending
pub fn user_preferred(data: &AdoptionData, filters: &PreferenceFilters) -> Vec<PreferenceMatch> {
    let criteria = filters.active();

    let candidates: Vec<PreferenceMatch> = data
        .dogs()
        .iter()
        .filter_map(|dog| {
            Some(Candidate {
                dog,
                breed: data.breed(dog.dog_id)?,
                attrs: data.attributes(dog.dog_id)?,
                description: data.description(dog.dog_id)?,
            })
        })
        .filter(|c| is_friendly(c.description))
        .map(|c| PreferenceMatch {
            dog_id: c.dog.dog_id,
            name: c.dog.name.clone(),
            age: c.dog.age.clone(),
            sex: c.dog.sex.clone(),
            size: c.dog.size.clone(),
            color_primary: c.attrs.color_primary.clone(),
            coat: c.attrs.coat.clone(),
            fixed: c.attrs.fixed,
            house_trained: c.attrs.house_trained,
            shots_current: c.attrs.shots_current,
            breed_primary: c.breed.breed_primary.clone(),
            description: c.description.text.clone(),
            match_score: match_score(&criteria, &c),
        })
        .collect();

    let by_dog_id = |a: &PreferenceMatch, b: &PreferenceMatch| -> Ordering { a.dog_id.cmp(&b.dog_id) };

    rank_global(candidates, |m| m.match_score as f64, Some(&by_dog_id), Selection::First(PREFERENCE_LIMIT))
        .into_iter()
        .map(|ranked| ranked.item)
        .collect()
}
