//! Core traits for classifiers.
//!
//! An estimator is an immutable hyperparameter bundle; `fit` consumes a
//! training set and returns a separate fitted model value. Nothing is
//! mutated after fitting, so models can be shared freely across threads.

use crate::error::{HeveaError, Result};
use crate::primitives::Matrix;
use std::fmt;

/// Anything usable as a class label: grades, segments, strings, or
/// `OrderedFloat<f64>` for numeric targets.
///
/// `Ord` gives every engine a deterministic final tie-break.
pub trait Label: Clone + Ord + fmt::Debug {}

impl<T: Clone + Ord + fmt::Debug> Label for T {}

/// A supervised estimator that can be fitted on a labeled training set.
///
/// # Examples
///
/// ```
/// use hevea::prelude::*;
///
/// let x = Matrix::from_vec(4, 1, vec![0.0, 1.0, 10.0, 11.0]).unwrap();
/// let y = vec!["low", "low", "high", "high"];
///
/// let model = KNearestNeighbors::new(1).fit(&x, &y).unwrap();
/// assert_eq!(model.predict_label(&[0.5]).unwrap(), "low");
/// assert!(model.score(&x, &y).unwrap() > 0.99);
/// ```
pub trait Classifier<L: Label> {
    /// Fitted model produced by this estimator.
    type Model: Predictor<L>;

    /// Fits a fresh model to `x` (one row per sample) and `y`.
    ///
    /// # Errors
    ///
    /// Returns an error for empty or ragged training data, or when the row
    /// count differs from the label count.
    fn fit(&self, x: &Matrix<f64>, y: &[L]) -> Result<Self::Model>;
}

/// A fitted model that maps feature vectors to labels.
pub trait Predictor<L: Label> {
    /// Number of features the model was trained on.
    fn n_features(&self) -> usize;

    /// Predicts the label of a single feature vector.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `sample` has the wrong arity.
    fn predict_label(&self, sample: &[f64]) -> Result<L>;

    /// Predicts labels for every row of `x`.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `x` has the wrong number of columns.
    fn predict_labels(&self, x: &Matrix<f64>) -> Result<Vec<L>> {
        x.rows().map(|row| self.predict_label(row)).collect()
    }

    /// Accuracy (correct / total) on a labeled test split.
    ///
    /// # Errors
    ///
    /// Returns an error if `x` and `y` disagree in length, are empty, or `x`
    /// has the wrong arity.
    fn score(&self, x: &Matrix<f64>, y: &[L]) -> Result<f64> {
        let predictions = self.predict_labels(x)?;
        crate::metrics::accuracy(&predictions, y)
    }
}

/// Validates the shared fit preconditions of every supervised engine.
pub(crate) fn check_fit_inputs<L>(x: &Matrix<f64>, y: &[L], model: &'static str) -> Result<()> {
    let (n_samples, _) = x.shape();
    if n_samples == 0 {
        return Err(HeveaError::EmptyTrainingSet { model });
    }
    if n_samples != y.len() {
        return Err(HeveaError::LengthMismatch {
            features: n_samples,
            labels: y.len(),
        });
    }
    if !x.is_finite() {
        return Err(HeveaError::validation(format!(
            "{model} training features must be finite"
        )));
    }
    Ok(())
}
