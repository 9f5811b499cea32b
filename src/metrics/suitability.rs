//! Breed-to-county suitability scoring
//!
//! Combines normalized county socioeconomic features with breed traits through
//! a fixed linear blend:
//!
//! ```text
//! score = 0.40 * (1 - pct_special_needs)
//!       + 0.25 * pct_fixed
//!       + 0.10 * (1 - pct_long_coat)
//!       + 0.15 * norm_income
//!       + 0.10 * (1 - norm_poverty)
//! ```
//!
//! Weights are engine constants so scores stay comparable between runs.
//! The emitted score is the raw blend in [0, 1]; popularity only orders
//! breeds that tie on score.

use std::cmp::Ordering;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::metrics::breed_traits::BreedTraits;
use crate::metrics::census::CountyStats;
use crate::utils::{min_max_normalize, rank_global, Selection};

pub const WEIGHT_NO_SPECIAL_NEEDS: f64 = 0.40;
pub const WEIGHT_FIXED: f64 = 0.25;
pub const WEIGHT_SHORT_COAT: f64 = 0.10;
pub const WEIGHT_INCOME: f64 = 0.15;
pub const WEIGHT_LOW_POVERTY: f64 = 0.10;

/// Maximum rows returned by a recommendation
pub const RECOMMEND_LIMIT: usize = 30;

/// County averages with their min-max normalized counterparts
///
/// Normalization is fitted over every county of the snapshot, not only the
/// requested one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountyFeatures {
    pub county: String,
    pub avg_income: Option<f64>,
    pub avg_poverty: Option<f64>,
    pub avg_commute: Option<f64>,
    pub norm_income: Option<f64>,
    pub norm_poverty: Option<f64>,
    pub norm_commute: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreedRecommendation {
    pub breed: String,
    pub county: String,
    pub score: f64,
}

fn normalized_column<F>(stats: &[CountyStats], metric: F) -> Vec<Option<f64>>
where
    F: Fn(&CountyStats) -> Option<f64>,
{
    let mut column = vec![None; stats.len()];
    let indexed: Vec<(usize, &CountyStats)> = stats.iter().enumerate().collect();
    for (i, norm) in min_max_normalize(&indexed, |(i, _)| *i, |(_, s)| metric(*s)) {
        column[i] = Some(norm);
    }
    column
}

/// Normalize county averages over the full county population
pub fn county_features(stats: Vec<CountyStats>) -> Vec<CountyFeatures> {
    let norm_income = normalized_column(&stats, |s| s.avg_income);
    let norm_poverty = normalized_column(&stats, |s| s.avg_poverty);
    let norm_commute = normalized_column(&stats, |s| s.avg_commute);

    stats
        .into_iter()
        .enumerate()
        .map(|(i, s)| CountyFeatures {
            county: s.county,
            avg_income: s.avg_income,
            avg_poverty: s.avg_poverty,
            avg_commute: s.avg_commute,
            norm_income: norm_income[i],
            norm_poverty: norm_poverty[i],
            norm_commute: norm_commute[i],
        })
        .collect()
}

/// The weighted blend on already-normalized inputs
pub fn blend(
    pct_special_needs: f64,
    pct_fixed: f64,
    pct_long_coat: f64,
    norm_income: f64,
    norm_poverty: f64,
) -> f64 {
    WEIGHT_NO_SPECIAL_NEEDS * (1.0 - pct_special_needs)
        + WEIGHT_FIXED * pct_fixed
        + WEIGHT_SHORT_COAT * (1.0 - pct_long_coat)
        + WEIGHT_INCOME * norm_income
        + WEIGHT_LOW_POVERTY * (1.0 - norm_poverty)
}

/// Score one breed for one county. `None` when the county lacks an income or poverty average.
pub fn suitability_score(traits: &BreedTraits, county: &CountyFeatures) -> Option<f64> {
    Some(blend(
        traits.pct_special_needs,
        traits.pct_fixed,
        traits.pct_long_coat,
        county.norm_income?,
        county.norm_poverty?,
    ))
}

/// Rank every breed for the requested county
///
/// Ties on score go to the more popular breed, then the breed name.
pub fn recommend_breeds(
    counties: &[CountyFeatures],
    traits: &[BreedTraits],
    county: &str,
) -> Vec<BreedRecommendation> {
    let Some(target) = counties.iter().find(|c| c.county == county) else {
        return Vec::new();
    };

    let scored: Vec<(BreedRecommendation, u64)> = traits
        .par_iter()
        .filter_map(|t| {
            suitability_score(t, target).map(|score| {
                let rec = BreedRecommendation {
                    breed: t.breed.clone(),
                    county: target.county.clone(),
                    score,
                };
                (rec, t.popularity_count)
            })
        })
        .collect();

    let popular_first = |a: &(BreedRecommendation, u64), b: &(BreedRecommendation, u64)| -> Ordering {
        b.1.cmp(&a.1).then_with(|| a.0.breed.cmp(&b.0.breed))
    };

    rank_global(scored, |(rec, _)| rec.score, Some(&popular_first), Selection::First(RECOMMEND_LIMIT))
        .into_iter()
        .map(|ranked| ranked.item.0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stats(county: &str, income: Option<f64>, poverty: Option<f64>) -> CountyStats {
        CountyStats {
            county: county.into(),
            avg_income: income,
            avg_poverty: poverty,
            avg_commute: Some(25.0),
        }
    }

    fn traits(breed: &str, fixed: f64, long: f64, special: f64, popularity: u64) -> BreedTraits {
        BreedTraits {
            breed: breed.into(),
            pct_fixed: fixed,
            pct_long_coat: long,
            pct_special_needs: special,
            popularity_count: popularity,
            attributed_count: popularity,
        }
    }

    #[test]
    fn test_weights_sum_to_one() {
        let total = WEIGHT_NO_SPECIAL_NEEDS + WEIGHT_FIXED + WEIGHT_SHORT_COAT + WEIGHT_INCOME + WEIGHT_LOW_POVERTY;
        assert_relative_eq!(total, 1.0);
    }

    #[test]
    fn test_king_county_blend() {
        assert_relative_eq!(blend(0.05, 0.8, 0.2, 0.7, 0.3), 0.835, epsilon = 1e-12);
    }

    #[test]
    fn test_county_features_normalized_over_population() {
        let features = county_features(vec![
            stats("A", Some(40000.0), Some(20.0)),
            stats("B", Some(60000.0), Some(10.0)),
            stats("C", Some(80000.0), None),
        ]);

        assert_relative_eq!(features[1].norm_income.unwrap(), 0.5);
        assert_relative_eq!(features[0].norm_poverty.unwrap(), 1.0);
        assert_relative_eq!(features[1].norm_poverty.unwrap(), 0.0);
        assert_eq!(features[2].norm_poverty, None);
        // constant commute across counties
        assert!(features.iter().all(|f| f.norm_commute == Some(0.0)));
    }

    #[test]
    fn test_single_county_scores_with_zero_norms() {
        let features = county_features(vec![stats("Solo County", Some(50000.0), Some(12.0))]);
        let recs = recommend_breeds(&features, &[traits("Pug", 1.0, 0.0, 0.0, 3)], "Solo County");

        // norm_income = 0, norm_poverty = 0
        assert_relative_eq!(recs[0].score, 0.40 + 0.25 + 0.10 + 0.0 + 0.10);
    }

    #[test]
    fn test_unknown_county_is_empty() {
        let features = county_features(vec![stats("A", Some(1.0), Some(1.0))]);
        assert!(recommend_breeds(&features, &[traits("Pug", 1.0, 0.0, 0.0, 1)], "Nowhere").is_empty());
    }

    #[test]
    fn test_ties_prefer_popular_breeds() {
        let features = county_features(vec![stats("A", Some(1.0), Some(1.0))]);
        let breeds = vec![
            traits("Akita", 0.5, 0.5, 0.5, 2),
            traits("Boxer", 0.5, 0.5, 0.5, 9),
            traits("Collie", 0.9, 0.0, 0.0, 1),
        ];
        let recs = recommend_breeds(&features, &breeds, "A");

        let order: Vec<&str> = recs.iter().map(|r| r.breed.as_str()).collect();
        assert_eq!(order, vec!["Collie", "Boxer", "Akita"]);
    }

    #[test]
    fn test_limit_applies() {
        let features = county_features(vec![stats("A", Some(1.0), Some(1.0))]);
        let breeds: Vec<BreedTraits> = (0..40)
            .map(|i| traits(&format!("Breed{:02}", i), i as f64 / 40.0, 0.0, 0.0, 1))
            .collect();

        let recs = recommend_breeds(&features, &breeds, "A");
        assert_eq!(recs.len(), RECOMMEND_LIMIT);
        assert_eq!(recs[0].breed, "Breed39");
    }
}
