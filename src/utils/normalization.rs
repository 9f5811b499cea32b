//! Normalization Utilities
//!
//! Min-max scaling of one metric across a population of grouped entities
//! (counties, states). The range is always fitted on the full population
//! handed in; callers must pass the same population they later join against.

use serde::{Deserialize, Serialize};

/// Fitted min/max range for one metric
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub min: f64,
    pub max: f64,
}

impl MinMax {
    /// Fit the range over all finite values. Returns `None` for an empty population.
    pub fn fit<I>(values: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<MinMax>, v| match acc {
                None => Some(MinMax { min: v, max: v }),
                Some(range) => Some(MinMax {
                    min: range.min.min(v),
                    max: range.max.max(v),
                }),
            })
    }

    /// `(x - min) / (max - min)`, or 0 when the range is degenerate
    pub fn scale(&self, raw_value: f64) -> f64 {
        let width = self.max - self.min;
        if width == 0.0 {
            return 0.0;
        }
        (raw_value - self.min) / width
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }
}

/// Min-max normalize a keyed population
///
/// `metric` extracts the raw value of each entity. Entities whose value is
/// missing or non-finite are left out of both the fitted range and the output.
/// Output order follows input order.
pub fn min_max_normalize<T, K, FK, FM>(population: &[T], key: FK, metric: FM) -> Vec<(K, f64)>
where
    FK: Fn(&T) -> K,
    FM: Fn(&T) -> Option<f64>,
{
    let present: Vec<(K, f64)> = population
        .iter()
        .filter_map(|entity| {
            metric(entity)
                .filter(|v| v.is_finite())
                .map(|v| (key(entity), v))
        })
        .collect();

    let Some(range) = MinMax::fit(present.iter().map(|(_, v)| *v)) else {
        return Vec::new();
    };

    present
        .into_iter()
        .map(|(k, v)| (k, range.scale(v)))
        .collect()
}
