//! Min-max feature normalization.
//!
//! A [`NormalizationProfile`] records the per-feature (min, max) observed in
//! a training matrix. It is computed once at fit time and then applied
//! verbatim to every later query vector; it is never recomputed from query
//! data, so distances stay comparable between training and inference.
//!
//! # Example
//!
//! ```
//! use hevea::preprocessing::normalize;
//! use hevea::primitives::Matrix;
//!
//! let data = Matrix::from_vec(3, 2, vec![
//!     0.0, 7.0,
//!     5.0, 7.0,
//!     10.0, 7.0,
//! ]).expect("valid matrix dimensions");
//!
//! let (scaled, profile) = normalize(&data).expect("non-empty matrix");
//! assert!((scaled.get(1, 0) - 0.5).abs() < 1e-12);
//! // Zero-variance column maps to 0.
//! assert_eq!(scaled.get(2, 1), 0.0);
//!
//! let query = profile.transform_row(&[2.5, 9.0]).expect("arity matches");
//! assert!((query[0] - 0.25).abs() < 1e-12);
//! assert_eq!(query[1], 0.0);
//! ```

use crate::error::{HeveaError, Result};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};

/// Observed range of one feature in the training matrix.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    /// Smallest observed value.
    pub min: f64,
    /// Largest observed value.
    pub max: f64,
}

impl FeatureRange {
    /// Returns true when the feature has zero variance.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }

    /// Rescales `value` into the unit interval defined by this range.
    ///
    /// Degenerate ranges map every value to 0. Values outside the training
    /// range fall outside [0, 1]; they are not clamped.
    #[must_use]
    pub fn scale(&self, value: f64) -> f64 {
        if self.is_degenerate() {
            0.0
        } else {
            (value - self.min) / (self.max - self.min)
        }
    }
}

/// Per-feature (min, max) pairs captured from a training matrix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationProfile {
    ranges: Vec<FeatureRange>,
}

impl NormalizationProfile {
    /// Computes the min and max of each feature.
    ///
    /// # Errors
    ///
    /// Returns `EmptyTrainingSet` if `x` has no rows.
    pub fn fit(x: &Matrix<f64>) -> Result<Self> {
        let (n_samples, n_features) = x.shape();
        if n_samples == 0 {
            return Err(HeveaError::EmptyTrainingSet {
                model: "normalization profile",
            });
        }

        let mut ranges = vec![
            FeatureRange {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            };
            n_features
        ];

        for row in x.rows() {
            for (range, &val) in ranges.iter_mut().zip(row) {
                range.min = range.min.min(val);
                range.max = range.max.max(val);
            }
        }

        Ok(Self { ranges })
    }

    /// Builds a profile from explicit ranges.
    ///
    /// # Errors
    ///
    /// Returns a validation error if any range has `max < min`.
    pub fn from_ranges(ranges: Vec<FeatureRange>) -> Result<Self> {
        if let Some((i, r)) = ranges.iter().enumerate().find(|(_, r)| r.max < r.min) {
            return Err(HeveaError::validation(format!(
                "feature {i} range has max {} below min {}",
                r.max, r.min
            )));
        }
        Ok(Self { ranges })
    }

    /// Number of features covered by the profile.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.ranges.len()
    }

    /// The stored per-feature ranges.
    #[must_use]
    pub fn ranges(&self) -> &[FeatureRange] {
        &self.ranges
    }

    /// Normalizes one feature vector with the stored ranges.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `row` has the wrong arity.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.ranges.len() {
            return Err(HeveaError::dimension_mismatch(
                "normalization",
                self.ranges.len(),
                row.len(),
            ));
        }
        Ok(self
            .ranges
            .iter()
            .zip(row)
            .map(|(range, &val)| range.scale(val))
            .collect())
    }

    /// Normalizes every row of `x` with the stored ranges.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `x` has the wrong number of columns.
    pub fn transform(&self, x: &Matrix<f64>) -> Result<Matrix<f64>> {
        let (n_samples, n_features) = x.shape();
        if n_features != self.ranges.len() {
            return Err(HeveaError::dimension_mismatch(
                "normalization",
                self.ranges.len(),
                n_features,
            ));
        }

        let mut data = Vec::with_capacity(n_samples * n_features);
        for row in x.rows() {
            data.extend(self.ranges.iter().zip(row).map(|(range, &v)| range.scale(v)));
        }
        Matrix::from_vec(n_samples, n_features, data)
    }
}

/// Fits a profile on `x` and returns the rescaled matrix together with it.
///
/// The caller keeps the profile alongside whatever it trains on the scaled
/// matrix and applies it to later queries.
///
/// # Errors
///
/// Returns `EmptyTrainingSet` if `x` has no rows.
pub fn normalize(x: &Matrix<f64>) -> Result<(Matrix<f64>, NormalizationProfile)> {
    let profile = NormalizationProfile::fit(x)?;
    let scaled = profile.transform(x)?;
    Ok((scaled, profile))
}


#[cfg(test)]
mod tests_normalization_contract;
