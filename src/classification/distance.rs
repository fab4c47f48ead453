//! Distance metrics for nearest-neighbor search.

use crate::error::{HeveaError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order of the Minkowski metric.
pub const MINKOWSKI_P: f64 = 3.0;

/// Distance metric for K-Nearest Neighbors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Euclidean distance: `sqrt(sum((a_i - b_i)^2))`
    #[default]
    Euclidean,
    /// Manhattan distance: `sum(|a_i - b_i|)`
    Manhattan,
    /// Minkowski distance of order [`MINKOWSKI_P`]
    Minkowski,
}

impl DistanceMetric {
    /// Computes the distance between two feature vectors.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the vectors differ in length.
    ///
    /// # Example
    ///
    /// ```
    /// use hevea::classification::DistanceMetric;
    ///
    /// let d = DistanceMetric::Euclidean.distance(&[0.0, 0.0], &[3.0, 4.0]).unwrap();
    /// assert!((d - 5.0).abs() < 1e-12);
    /// ```
    pub fn distance(self, a: &[f64], b: &[f64]) -> Result<f64> {
        if a.len() != b.len() {
            return Err(HeveaError::dimension_mismatch("distance", a.len(), b.len()));
        }
        Ok(self.distance_unchecked(a, b))
    }

    /// Distance without the length check; callers guarantee equal arity.
    pub(crate) fn distance_unchecked(self, a: &[f64], b: &[f64]) -> f64 {
        let pairs = a.iter().zip(b);
        match self {
            DistanceMetric::Euclidean => pairs
                .map(|(x, y)| (x - y) * (x - y))
                .sum::<f64>()
                .sqrt(),
            DistanceMetric::Manhattan => pairs.map(|(x, y)| (x - y).abs()).sum(),
            DistanceMetric::Minkowski => pairs
                .map(|(x, y)| (x - y).abs().powf(MINKOWSKI_P))
                .sum::<f64>()
                .powf(1.0 / MINKOWSKI_P),
        }
    }

    /// Stable lowercase name, matching the serialized form.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            DistanceMetric::Euclidean => "euclidean",
            DistanceMetric::Manhattan => "manhattan",
            DistanceMetric::Minkowski => "minkowski",
        }
    }
}

impl fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = HeveaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "euclidean" | "l2" => Ok(DistanceMetric::Euclidean),
            "manhattan" | "l1" => Ok(DistanceMetric::Manhattan),
            "minkowski" => Ok(DistanceMetric::Minkowski),
            other => Err(HeveaError::invalid_hyperparameter(
                "metric",
                other,
                "one of euclidean, manhattan, minkowski",
            )),
        }
    }
}
