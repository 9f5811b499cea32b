//! Analytic components of the adoption engine
//!
//! Each module computes one family of outputs from an `AdoptionData` snapshot
//! (or from derived tables built from one). None of them hold state.

pub mod census;
pub mod breed_traits;
pub mod suitability;
pub mod preference_match;
pub mod breed_share;
pub mod gold_shelters;
pub mod supply_income;
pub mod income_bracket;
pub mod breed_popularity;
pub mod dog_listing;

pub use census::{county_stats, state_census_averages, state_income_averages, CensusAverages, CountyStats, Mean};
pub use breed_traits::{breed_traits, BreedTraits};
pub use suitability::{county_features, recommend_breeds, BreedRecommendation, CountyFeatures};
pub use preference_match::{user_preferred, PreferenceFilters, PreferenceMatch};
pub use breed_share::{breed_state_shares, over_represented, BreedStateShare};
pub use gold_shelters::{gold_shelters, shelter_economics, ShelterEconomics};
pub use supply_income::{supply_income, SupplyIncome};
pub use income_bracket::{clamp_income, income_recommend, IncomeRecommendation, IncomeWindow};
pub use breed_popularity::{city_breeds, top_breed_per_state, CityBreed, StateTopBreed};
pub use dog_listing::{dogs_by_city, sample_dogs, CityDog, SampleDog};
