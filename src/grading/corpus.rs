//! Training corpus acquisition.
//!
//! The grading service obtains historical samples from a [`CorpusSource`]
//! in a single synchronous call and never touches storage itself.

use super::{GradedSample, QualityGrade};
use crate::error::Result;
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Supplies historical graded samples.
pub trait CorpusSource {
    /// Returns every available historical sample.
    ///
    /// # Errors
    ///
    /// Returns `CorpusUnavailable` when the backing store cannot be read.
    fn load(&self) -> Result<Vec<GradedSample>>;
}

impl CorpusSource for Vec<GradedSample> {
    fn load(&self) -> Result<Vec<GradedSample>> {
        Ok(self.clone())
    }
}

impl CorpusSource for [GradedSample] {
    fn load(&self) -> Result<Vec<GradedSample>> {
        Ok(self.to_vec())
    }
}

/// A source with no history; the service always falls back to synthetic data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl CorpusSource for NoHistory {
    fn load(&self) -> Result<Vec<GradedSample>> {
        Ok(Vec::new())
    }
}

/// Where the training samples came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorpusOrigin {
    /// Lab results supplied by the corpus source
    Historical,
    /// Generated from the per-grade ranges
    Synthetic,
}

/// Feature matrix and grades assembled from graded samples.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct TrainingCorpus {
    /// Five columns, in `FEATURE_NAMES` order
    pub features: Matrix<f64>,
    pub grades: Vec<QualityGrade>,
    pub origin: CorpusOrigin,
}

impl TrainingCorpus {
    pub(crate) fn from_samples(samples: &[GradedSample], origin: CorpusOrigin) -> Result<Self> {
        let rows: Vec<[f64; 5]> = samples.iter().map(|s| s.measurement.full_features()).collect();
        Ok(Self {
            features: Matrix::from_rows(&rows)?,
            grades: samples.iter().map(GradedSample::label).collect(),
            origin,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.grades.len()
    }

    /// Samples per grade, in grade order.
    pub(crate) fn class_distribution(&self) -> BTreeMap<QualityGrade, usize> {
        let mut counts = BTreeMap::new();
        for &grade in &self.grades {
            *counts.entry(grade).or_insert(0) += 1;
        }
        counts
    }
}
