//! K-Nearest Neighbors classification.
//!
//! [`KNearestNeighbors`] is the hyperparameter bundle (k, metric, whether to
//! normalize); [`KNearestNeighbors::fit`] returns an immutable [`KnnModel`]
//! holding the (optionally normalized) training set and the
//! [`NormalizationProfile`] captured at fit time. Every query is scaled with
//! that stored profile.
//!
//! Neighbor search is brute force: each prediction computes the distance to
//! every training row, O(n·d).
//!
//! # Example
//!
//! ```
//! use hevea::classification::{KNearestNeighbors, DistanceMetric};
//! use hevea::primitives::Matrix;
//!
//! let x = Matrix::from_vec(6, 2, vec![
//!     0.0, 0.0,  // class 0
//!     0.0, 1.0,  // class 0
//!     1.0, 0.0,  // class 0
//!     5.0, 5.0,  // class 1
//!     5.0, 6.0,  // class 1
//!     6.0, 5.0,  // class 1
//! ]).expect("6x2 matrix with 12 values");
//! let y = vec![0, 0, 0, 1, 1, 1];
//!
//! let model = KNearestNeighbors::new(3)
//!     .with_metric(DistanceMetric::Manhattan)
//!     .fit(&x, &y)
//!     .expect("Valid training data with 6 samples");
//!
//! let prediction = model.predict(&[0.5, 0.5]).expect("arity matches");
//! assert_eq!(prediction.label, 0);
//! assert_eq!(prediction.confidence, 1.0);
//! assert_eq!(prediction.neighbors.len(), 3);
//! ```

mod distance;

pub use distance::{DistanceMetric, MINKOWSKI_P};

use crate::error::{HeveaError, Result};
use crate::preprocessing::NormalizationProfile;
use crate::primitives::Matrix;
use crate::traits::{check_fit_inputs, Classifier, Label, Predictor};
use serde::Serialize;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::debug;

/// K-Nearest Neighbors classifier configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KNearestNeighbors {
    /// Number of neighbors to use
    k: usize,
    /// Distance metric
    metric: DistanceMetric,
    /// Whether to min-max normalize features at fit time
    normalize: bool,
}

impl KNearestNeighbors {
    /// Creates a new K-Nearest Neighbors classifier with Euclidean distance
    /// and normalization enabled.
    ///
    /// # Example
    ///
    /// ```
    /// use hevea::classification::KNearestNeighbors;
    ///
    /// let knn = KNearestNeighbors::new(5);
    /// assert_eq!(knn.k(), 5);
    /// ```
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            metric: DistanceMetric::Euclidean,
            normalize: true,
        }
    }

    /// Sets the distance metric.
    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Enables or disables min-max normalization.
    #[must_use]
    pub fn with_normalization(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Sets the number of neighbors.
    #[must_use]
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    /// Number of neighbors consulted per prediction.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Configured distance metric.
    #[must_use]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Whether fitting normalizes the training set.
    #[must_use]
    pub fn normalizes(&self) -> bool {
        self.normalize
    }

    /// Fits a model by storing the (optionally normalized) training data.
    ///
    /// kNN is a lazy learner: fitting only captures the normalization
    /// profile and the scaled training rows.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for `k == 0`, `EmptyTrainingSet` for
    /// zero rows, `LengthMismatch` when row and label counts differ, and
    /// `Validation` for NaN or infinite features.
    pub fn fit<L: Label>(&self, x: &Matrix<f64>, y: &[L]) -> Result<KnnModel<L>> {
        if self.k == 0 {
            return Err(HeveaError::invalid_hyperparameter("k", self.k, "k >= 1"));
        }
        check_fit_inputs(x, y, "KNN")?;

        let (x_train, profile) = if self.normalize {
            let (scaled, profile) = crate::preprocessing::normalize(x)?;
            (scaled, Some(profile))
        } else {
            (x.clone(), None)
        };

        debug!(
            k = self.k,
            metric = %self.metric,
            n_samples = x.n_rows(),
            n_features = x.n_cols(),
            normalized = self.normalize,
            "fitted KNN model"
        );

        Ok(KnnModel {
            k: self.k,
            metric: self.metric,
            x_train,
            y_train: y.to_vec(),
            profile,
        })
    }

    /// Fits from feature rows, validating that every row has the same arity.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` for ragged rows, plus every error of
    /// [`KNearestNeighbors::fit`].
    pub fn fit_rows<R: AsRef<[f64]>, L: Label>(&self, rows: &[R], y: &[L]) -> Result<KnnModel<L>> {
        if rows.is_empty() {
            return Err(HeveaError::EmptyTrainingSet { model: "KNN" });
        }
        let x = Matrix::from_rows(rows)?;
        self.fit(&x, y)
    }
}

impl Default for KNearestNeighbors {
    fn default() -> Self {
        Self::new(3)
    }
}

impl<L: Label> Classifier<L> for KNearestNeighbors {
    type Model = KnnModel<L>;

    fn fit(&self, x: &Matrix<f64>, y: &[L]) -> Result<KnnModel<L>> {
        KNearestNeighbors::fit(self, x, y)
    }
}

/// One of the k nearest training samples.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Neighbor<L> {
    /// Row index in the training set
    pub index: usize,
    /// Distance from the query in the model's feature space
    pub distance: f64,
    /// Label of the training sample
    pub label: L,
}

/// Vote tally for one label among the k nearest neighbors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCount<L> {
    /// Label receiving the votes
    pub label: L,
    /// Number of neighbors carrying this label
    pub votes: usize,
    /// Sum of those neighbors' distances
    pub total_distance: f64,
}

/// Result of a single KNN prediction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnnPrediction<L> {
    /// Winning label
    pub label: L,
    /// Share of neighbors voting for the winner, in [0, 1]
    pub confidence: f64,
    /// The nearest neighbors, closest first
    pub neighbors: Vec<Neighbor<L>>,
    /// Vote tally, winner first
    pub votes: Vec<VoteCount<L>>,
}

/// A fitted K-Nearest Neighbors model.
#[derive(Debug, Clone)]
pub struct KnnModel<L> {
    k: usize,
    metric: DistanceMetric,
    x_train: Matrix<f64>,
    y_train: Vec<L>,
    profile: Option<NormalizationProfile>,
}

impl<L: Label> KnnModel<L> {
    /// Number of neighbors consulted per prediction.
    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    /// Distance metric used for neighbor search.
    #[must_use]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of stored training samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.x_train.n_rows()
    }

    /// Whether training rows (and therefore queries) are normalized.
    #[must_use]
    pub fn is_normalized(&self) -> bool {
        self.profile.is_some()
    }

    /// Profile captured at fit time, if normalization is enabled.
    #[must_use]
    pub fn profile(&self) -> Option<&NormalizationProfile> {
        self.profile.as_ref()
    }

    /// Stored training labels, in training order.
    #[must_use]
    pub fn labels(&self) -> &[L] {
        &self.y_train
    }

    /// Finds the k nearest training samples to `point` (raw feature space).
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `point` has the wrong arity.
    pub fn kneighbors(&self, point: &[f64]) -> Result<Vec<Neighbor<L>>> {
        let query = self.prepare_query(point)?;
        Ok(self.nearest(&query))
    }

    /// Predicts the label of a raw feature vector.
    ///
    /// The point is normalized with the stored profile before searching.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `point` has the wrong arity.
    pub fn predict(&self, point: &[f64]) -> Result<KnnPrediction<L>> {
        let query = self.prepare_query(point)?;
        Ok(self.predict_prepared(&query))
    }

    /// Predicts the label of a point already expressed in the model's
    /// normalized feature space; the stored profile is not applied.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `point` has the wrong arity.
    pub fn predict_normalized(&self, point: &[f64]) -> Result<KnnPrediction<L>> {
        self.check_arity(point)?;
        Ok(self.predict_prepared(point))
    }

    /// Predicts every row of `x`.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `x` has the wrong number of columns.
    pub fn predict_batch(&self, x: &Matrix<f64>) -> Result<Vec<KnnPrediction<L>>> {
        x.rows().map(|row| self.predict(row)).collect()
    }

    /// Accuracy on a labeled test split.
    ///
    /// # Errors
    ///
    /// Returns an error if the split is empty, lengths differ, or arity is wrong.
    pub fn evaluate(&self, x: &Matrix<f64>, y: &[L]) -> Result<f64> {
        self.score(x, y)
    }

    fn check_arity(&self, point: &[f64]) -> Result<()> {
        let expected = self.x_train.n_cols();
        if point.len() != expected {
            return Err(HeveaError::dimension_mismatch(
                "KNN query",
                expected,
                point.len(),
            ));
        }
        Ok(())
    }

    fn prepare_query<'a>(&self, point: &'a [f64]) -> Result<Cow<'a, [f64]>> {
        self.check_arity(point)?;
        match &self.profile {
            Some(profile) => Ok(Cow::Owned(profile.transform_row(point)?)),
            None => Ok(Cow::Borrowed(point)),
        }
    }

    fn predict_prepared(&self, query: &[f64]) -> KnnPrediction<L> {
        let neighbors = self.nearest(query);
        let votes = tally_votes(&neighbors);
        // nearest() returns at least one neighbor: fit rejects empty sets and k >= 1.
        let winner = &votes[0];
        let confidence = winner.votes as f64 / neighbors.len() as f64;

        KnnPrediction {
            label: winner.label.clone(),
            confidence,
            neighbors,
            votes,
        }
    }

    /// Brute-force search; ties in distance keep training order.
    fn nearest(&self, query: &[f64]) -> Vec<Neighbor<L>> {
        let mut distances: Vec<(f64, usize)> = self
            .x_train
            .rows()
            .enumerate()
            .map(|(j, row)| (self.metric.distance_unchecked(query, row), j))
            .collect();

        distances.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
        distances.truncate(self.k);

        distances
            .into_iter()
            .map(|(distance, index)| Neighbor {
                index,
                distance,
                label: self.y_train[index].clone(),
            })
            .collect()
    }
}

impl<L: Label> Predictor<L> for KnnModel<L> {
    fn n_features(&self) -> usize {
        self.x_train.n_cols()
    }

    fn predict_label(&self, sample: &[f64]) -> Result<L> {
        self.predict(sample).map(|p| p.label)
    }
}

/// Counts votes per label and ranks them.
///
/// Ranking: most votes first; equal votes go to the label whose neighbors
/// are closer in total; remaining ties resolve by label order.
pub(crate) fn tally_votes<L: Label>(neighbors: &[Neighbor<L>]) -> Vec<VoteCount<L>> {
    let mut tally: BTreeMap<&L, (usize, f64)> = BTreeMap::new();
    for neighbor in neighbors {
        let entry = tally.entry(&neighbor.label).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += neighbor.distance;
    }

    let mut votes: Vec<VoteCount<L>> = tally
        .into_iter()
        .map(|(label, (votes, total_distance))| VoteCount {
            label: label.clone(),
            votes,
            total_distance,
        })
        .collect();

    votes.sort_by(|a, b| {
        b.votes
            .cmp(&a.votes)
            .then(a.total_distance.total_cmp(&b.total_distance))
            .then_with(|| a.label.cmp(&b.label))
    });
    votes
}


#[cfg(test)]
mod tests_knn_contract;
