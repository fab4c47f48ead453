//! Model selection utilities for cross-validation and train/test splitting.
//!
//! This module provides tools for:
//! - Train/test splitting
//! - K-Fold cross-validation of any [`Classifier`]
//! - Choosing `k` for K-Nearest Neighbors by cross-validated accuracy

use crate::classification::KNearestNeighbors;
use crate::error::{HeveaError, Result};
use crate::primitives::Matrix;
use crate::traits::{Classifier, Label, Predictor};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::debug;

/// Results from cross-validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossValidationResult {
    /// Score for each fold
    pub scores: Vec<f64>,
}

impl CrossValidationResult {
    /// Calculate mean score across folds
    #[must_use]
    pub fn mean(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        self.scores.iter().sum::<f64>() / self.scores.len() as f64
    }

    /// Calculate standard deviation of scores
    #[must_use]
    pub fn std(&self) -> f64 {
        if self.scores.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .scores
            .iter()
            .map(|&score| (score - mean).powi(2))
            .sum::<f64>()
            / self.scores.len() as f64;
        variance.sqrt()
    }

    /// Get minimum score
    #[must_use]
    pub fn min(&self) -> f64 {
        self.scores.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Get maximum score
    #[must_use]
    pub fn max(&self) -> f64 {
        self.scores
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max)
    }
}

/// Run cross-validation on a classifier.
///
/// A fresh model is fitted on each fold's training indices and scored
/// (accuracy) on the held-out indices.
///
/// # Errors
///
/// Returns an error if the splitter is invalid for `x`, if `x` and `y`
/// disagree in length, or if any fold fails to fit.
///
/// # Example
///
/// ```rust
/// use hevea::prelude::*;
/// use hevea::model_selection::{cross_validate, KFold};
///
/// let x = Matrix::from_vec(20, 1, (0..20).map(f64::from).collect()).expect("20x1");
/// let y: Vec<u8> = (0..20).map(|i| u8::from(i >= 10)).collect();
///
/// let kfold = KFold::new(5).with_random_state(7);
/// let results = cross_validate(&KNearestNeighbors::new(3), &x, &y, &kfold)
///     .expect("valid folds");
/// assert_eq!(results.scores.len(), 5);
/// assert!(results.mean() > 0.8);
/// ```
pub fn cross_validate<L, C>(
    estimator: &C,
    x: &Matrix<f64>,
    y: &[L],
    cv: &KFold,
) -> Result<CrossValidationResult>
where
    L: Label,
    C: Classifier<L>,
{
    if x.n_rows() != y.len() {
        return Err(HeveaError::LengthMismatch {
            features: x.n_rows(),
            labels: y.len(),
        });
    }

    let mut scores = Vec::with_capacity(cv.n_splits());
    for (train_idx, test_idx) in cv.split(x.n_rows())? {
        scores.push(score_fold(estimator, x, y, &train_idx, &test_idx)?);
    }

    Ok(CrossValidationResult { scores })
}

fn score_fold<L, C>(
    estimator: &C,
    x: &Matrix<f64>,
    y: &[L],
    train_idx: &[usize],
    test_idx: &[usize],
) -> Result<f64>
where
    L: Label,
    C: Classifier<L>,
{
    let (x_train, y_train) = extract_samples(x, y, train_idx);
    let (x_test, y_test) = extract_samples(x, y, test_idx);
    let model = estimator.fit(&x_train, &y_train)?;
    model.score(&x_test, &y_test)
}

/// Helper function to extract samples by indices
fn extract_samples<L: Clone>(x: &Matrix<f64>, y: &[L], indices: &[usize]) -> (Matrix<f64>, Vec<L>) {
    let labels = indices.iter().map(|&i| y[i].clone()).collect();
    (x.select_rows(indices), labels)
}

/// K-Fold cross-validator.
///
/// Splits data into K consecutive folds. Each fold is used once as test set
/// while the remaining K-1 folds form the training set. When `n_samples` is
/// not divisible by K, the first `n_samples % K` folds get one extra sample.
///
/// # Example
///
/// ```rust
/// use hevea::model_selection::KFold;
///
/// let kfold = KFold::new(5);
/// for (train_idx, test_idx) in kfold.split(10).expect("5 folds over 10 samples") {
///     assert_eq!(test_idx.len(), 2);
///     assert_eq!(train_idx.len(), 8);
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct KFold {
    n_splits: usize,
    shuffle: bool,
    random_state: Option<u64>,
}

impl KFold {
    /// Create a new K-Fold cross-validator.
    ///
    /// # Arguments
    ///
    /// * `n_splits` - Number of folds. Must be at least 2.
    #[must_use]
    pub fn new(n_splits: usize) -> Self {
        Self {
            n_splits,
            shuffle: false,
            random_state: None,
        }
    }

    /// Enable shuffling before splitting into batches.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Set random state for reproducible shuffling.
    #[must_use]
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = Some(random_state);
        self.shuffle = true; // Shuffle is implied when random_state is set
        self
    }

    /// Number of folds.
    #[must_use]
    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Generate train/test indices for each fold.
    ///
    /// Returns a vector of (train_indices, test_indices) tuples.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` unless `2 <= n_splits <= n_samples`.
    pub fn split(&self, n_samples: usize) -> Result<Vec<(Vec<usize>, Vec<usize>)>> {
        if self.n_splits < 2 || self.n_splits > n_samples {
            return Err(HeveaError::invalid_hyperparameter(
                "n_splits",
                self.n_splits,
                &format!("2 <= n_splits <= {n_samples} samples"),
            ));
        }

        let mut indices: Vec<usize> = (0..n_samples).collect();

        if self.shuffle {
            if let Some(seed) = self.random_state {
                let mut rng = StdRng::seed_from_u64(seed);
                indices.shuffle(&mut rng);
            } else {
                let mut rng = rand::thread_rng();
                indices.shuffle(&mut rng);
            }
        }

        // Calculate fold sizes
        let fold_size = n_samples / self.n_splits;
        let remainder = n_samples % self.n_splits;

        let mut result = Vec::with_capacity(self.n_splits);
        let mut start = 0;

        for i in 0..self.n_splits {
            // Distribute remainder across first folds
            let current_fold_size = if i < remainder {
                fold_size + 1
            } else {
                fold_size
            };

            let end = start + current_fold_size;

            let test_indices: Vec<usize> = indices[start..end].to_vec();

            let mut train_indices = Vec::with_capacity(n_samples - current_fold_size);
            train_indices.extend_from_slice(&indices[..start]);
            train_indices.extend_from_slice(&indices[end..]);

            result.push((train_indices, test_indices));

            start = end;
        }

        Ok(result)
    }
}

/// Mean cross-validated accuracy for one `k`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct KScore {
    /// Number of neighbors
    pub k: usize,
    /// Mean accuracy over the folds
    pub accuracy: f64,
}

/// Outcome of [`find_optimal_k`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalK {
    /// Best `k` (lowest on ties)
    pub k: usize,
    /// Its mean accuracy
    pub accuracy: f64,
    /// Every evaluated `k`, ascending
    pub scores: Vec<KScore>,
}

/// Chooses `k` for K-Nearest Neighbors by cross-validated accuracy.
///
/// Samples are shuffled once with `seed` and partitioned into `folds`
/// blocks; every `k` in `1..max_k` is evaluated on the same folds, reusing
/// the metric and normalization settings of `base`. The `k` with the highest
/// mean accuracy wins, the lowest `k` on ties.
///
/// # Errors
///
/// Returns `InvalidHyperparameter` unless `max_k >= 2` and
/// `2 <= folds <= n_samples`, `LengthMismatch` if `x` and `y` disagree, and
/// any error raised while fitting a fold.
///
/// # Example
///
/// ```rust
/// use hevea::classification::KNearestNeighbors;
/// use hevea::model_selection::find_optimal_k;
/// use hevea::primitives::Matrix;
///
/// let x = Matrix::from_vec(12, 1, (0..12).map(f64::from).collect()).expect("12x1");
/// let y: Vec<u8> = (0..12).map(|i| u8::from(i >= 6)).collect();
///
/// let best = find_optimal_k(&KNearestNeighbors::default(), &x, &y, 5, 3, 42)
///     .expect("valid search");
/// assert_eq!(best.scores.len(), 4);
/// assert!((1..5).contains(&best.k));
/// ```
pub fn find_optimal_k<L: Label>(
    base: &KNearestNeighbors,
    x: &Matrix<f64>,
    y: &[L],
    max_k: usize,
    folds: usize,
    seed: u64,
) -> Result<OptimalK> {
    if max_k < 2 {
        return Err(HeveaError::invalid_hyperparameter(
            "max_k",
            max_k,
            "max_k >= 2",
        ));
    }
    if x.n_rows() != y.len() {
        return Err(HeveaError::LengthMismatch {
            features: x.n_rows(),
            labels: y.len(),
        });
    }

    let splits = KFold::new(folds)
        .with_random_state(seed)
        .split(x.n_rows())?;

    let mut scores = Vec::with_capacity(max_k - 1);
    for k in 1..max_k {
        let candidate = base.with_k(k);
        let mut total = 0.0;
        for (train_idx, test_idx) in &splits {
            total += score_fold(&candidate, x, y, train_idx, test_idx)?;
        }
        let accuracy = total / splits.len() as f64;
        debug!(k, accuracy, folds, "evaluated KNN candidate");
        scores.push(KScore { k, accuracy });
    }

    let mut best = scores[0];
    for score in &scores[1..] {
        if score.accuracy > best.accuracy {
            best = *score;
        }
    }

    debug!(k = best.k, accuracy = best.accuracy, "selected optimal k");
    Ok(OptimalK {
        k: best.k,
        accuracy: best.accuracy,
        scores,
    })
}

/// Splits a labeled set into shuffled train and test parts.
///
/// The test part holds `round(n * test_size)` samples, at least one, and the
/// train part keeps at least one.
///
/// # Errors
///
/// Returns `InvalidHyperparameter` if `test_size` is outside (0, 1) or the
/// set has fewer than 2 samples, and `LengthMismatch` if `x` and `y`
/// disagree.
#[allow(clippy::type_complexity)]
pub fn train_test_split<L: Label>(
    x: &Matrix<f64>,
    y: &[L],
    test_size: f64,
    random_state: Option<u64>,
) -> Result<(Matrix<f64>, Matrix<f64>, Vec<L>, Vec<L>)> {
    let n_samples = x.n_rows();
    if n_samples != y.len() {
        return Err(HeveaError::LengthMismatch {
            features: n_samples,
            labels: y.len(),
        });
    }
    if !(test_size > 0.0 && test_size < 1.0) {
        return Err(HeveaError::invalid_hyperparameter(
            "test_size",
            test_size,
            "0 < test_size < 1",
        ));
    }
    if n_samples < 2 {
        return Err(HeveaError::invalid_hyperparameter(
            "n_samples",
            n_samples,
            "at least 2 samples to split",
        ));
    }

    let n_test = ((n_samples as f64 * test_size).round() as usize).clamp(1, n_samples - 1);
    let n_train = n_samples - n_test;

    let mut indices: Vec<usize> = (0..n_samples).collect();
    if let Some(seed) = random_state {
        let mut rng = StdRng::seed_from_u64(seed);
        indices.shuffle(&mut rng);
    } else {
        let mut rng = rand::thread_rng();
        indices.shuffle(&mut rng);
    }

    let (x_train, y_train) = extract_samples(x, y, &indices[..n_train]);
    let (x_test, y_test) = extract_samples(x, y, &indices[n_train..]);

    Ok((x_train, x_test, y_train, y_test))
}


#[cfg(test)]
mod tests_kfold_contract;
