//! Classification metrics for evaluating classifier performance.
//!
//! Provides accuracy, per-label precision/recall/F1 and a confusion matrix
//! for multi-class classification over any [`Label`] type.

use crate::error::{HeveaError, Result};
use crate::primitives::Matrix;
use crate::traits::Label;
use serde::Serialize;
use std::collections::BTreeMap;

/// Averaging strategy for multi-class metrics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Average {
    /// Calculate metrics for each label, return unweighted mean.
    Macro,
    /// Weighted mean by support (number of true instances per label).
    Weighted,
}

fn check_lengths<L>(y_pred: &[L], y_true: &[L]) -> Result<()> {
    if y_pred.len() != y_true.len() {
        return Err(HeveaError::dimension_mismatch(
            "predictions",
            y_true.len(),
            y_pred.len(),
        ));
    }
    if y_true.is_empty() {
        return Err(HeveaError::validation("cannot score an empty split"));
    }
    Ok(())
}

/// Compute classification accuracy.
///
/// accuracy = `correct_predictions` / `total_predictions`
///
/// # Errors
///
/// Returns `DimensionMismatch` if the slices differ in length and a
/// validation error if they are empty.
///
/// # Examples
///
/// ```
/// use hevea::metrics::accuracy;
///
/// let y_true = vec![0, 1, 2, 0, 1, 2];
/// let y_pred = vec![0, 2, 1, 0, 0, 1];
/// let acc = accuracy(&y_pred, &y_true).expect("same non-zero length");
/// assert!((acc - 1.0 / 3.0).abs() < 1e-12);
/// ```
pub fn accuracy<L: PartialEq>(y_pred: &[L], y_true: &[L]) -> Result<f64> {
    check_lengths(y_pred, y_true)?;

    let correct = y_pred
        .iter()
        .zip(y_true.iter())
        .filter(|(p, t)| p == t)
        .count();

    Ok(correct as f64 / y_true.len() as f64)
}

/// Confusion matrix over the labels seen in either slice.
///
/// Entry `[i, j]` counts samples with true label `labels[i]` predicted as
/// `labels[j]`; labels are sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfusionMatrix<L> {
    labels: Vec<L>,
    counts: Matrix<usize>,
}

impl<L: Label> ConfusionMatrix<L> {
    /// Sorted labels indexing rows and columns.
    #[must_use]
    pub fn labels(&self) -> &[L] {
        &self.labels
    }

    /// Raw count matrix.
    #[must_use]
    pub fn counts(&self) -> &Matrix<usize> {
        &self.counts
    }

    /// Number of samples with true label `actual` predicted as `predicted`.
    #[must_use]
    pub fn get(&self, actual: &L, predicted: &L) -> usize {
        match (self.index_of(actual), self.index_of(predicted)) {
            (Some(i), Some(j)) => self.counts.get(i, j),
            _ => 0,
        }
    }

    fn index_of(&self, label: &L) -> Option<usize> {
        self.labels.binary_search(label).ok()
    }
}

/// Compute confusion matrix.
///
/// # Errors
///
/// Returns `DimensionMismatch` if the slices differ in length and a
/// validation error if they are empty.
///
/// # Examples
///
/// ```
/// use hevea::metrics::confusion_matrix;
///
/// let y_true = vec!['a', 'a', 'b', 'b'];
/// let y_pred = vec!['a', 'b', 'b', 'b'];
/// let cm = confusion_matrix(&y_pred, &y_true).expect("same non-zero length");
/// assert_eq!(cm.get(&'a', &'b'), 1);
/// assert_eq!(cm.get(&'b', &'b'), 2);
/// ```
pub fn confusion_matrix<L: Label>(y_pred: &[L], y_true: &[L]) -> Result<ConfusionMatrix<L>> {
    check_lengths(y_pred, y_true)?;

    let mut labels: Vec<L> = y_true.iter().chain(y_pred).cloned().collect();
    labels.sort();
    labels.dedup();

    let n = labels.len();
    let mut cm = ConfusionMatrix {
        counts: Matrix::from_vec(n, n, vec![0usize; n * n])?,
        labels,
    };
    for (p, t) in y_pred.iter().zip(y_true) {
        if let (Some(i), Some(j)) = (cm.index_of(t), cm.index_of(p)) {
            let current = cm.counts.get(i, j);
            cm.counts.set(i, j, current + 1);
        }
    }
    Ok(cm)
}

/// Precision, recall and F1 for one label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassMetrics {
    /// TP / (TP + FP), 0 when nothing was predicted as this label
    pub precision: f64,
    /// TP / (TP + FN), 0 when the label never occurs
    pub recall: f64,
    /// Harmonic mean of precision and recall
    pub f1: f64,
    /// Number of true instances
    pub support: usize,
}

/// Per-label metrics plus overall accuracy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport<L: Ord> {
    /// Metrics per label, in label order
    pub per_class: BTreeMap<L, ClassMetrics>,
    /// Overall accuracy
    pub accuracy: f64,
}

impl<L: Label> ClassificationReport<L> {
    /// Averaged precision.
    #[must_use]
    pub fn precision(&self, average: Average) -> f64 {
        self.average(average, |m| m.precision)
    }

    /// Averaged recall.
    #[must_use]
    pub fn recall(&self, average: Average) -> f64 {
        self.average(average, |m| m.recall)
    }

    /// Averaged F1.
    #[must_use]
    pub fn f1(&self, average: Average) -> f64 {
        self.average(average, |m| m.f1)
    }

    fn average(&self, average: Average, metric: impl Fn(&ClassMetrics) -> f64) -> f64 {
        if self.per_class.is_empty() {
            return 0.0;
        }
        match average {
            Average::Macro => {
                self.per_class.values().map(&metric).sum::<f64>() / self.per_class.len() as f64
            }
            Average::Weighted => {
                let total: usize = self.per_class.values().map(|m| m.support).sum();
                if total == 0 {
                    return 0.0;
                }
                self.per_class
                    .values()
                    .map(|m| metric(m) * m.support as f64)
                    .sum::<f64>()
                    / total as f64
            }
        }
    }
}

fn class_f1(precision: f64, recall: f64) -> f64 {
    if precision + recall == 0.0 {
        0.0
    } else {
        2.0 * precision * recall / (precision + recall)
    }
}

/// Builds a per-label precision/recall/F1 report.
///
/// # Errors
///
/// Returns `DimensionMismatch` if the slices differ in length and a
/// validation error if they are empty.
pub fn classification_report<L: Label>(
    y_pred: &[L],
    y_true: &[L],
) -> Result<ClassificationReport<L>> {
    let cm = confusion_matrix(y_pred, y_true)?;
    let n = cm.labels.len();

    let per_class = cm
        .labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            let tp = cm.counts.get(i, i);
            let predicted: usize = (0..n).map(|r| cm.counts.get(r, i)).sum();
            let support: usize = (0..n).map(|c| cm.counts.get(i, c)).sum();

            let precision = if predicted == 0 {
                0.0
            } else {
                tp as f64 / predicted as f64
            };
            let recall = if support == 0 {
                0.0
            } else {
                tp as f64 / support as f64
            };

            (
                label.clone(),
                ClassMetrics {
                    precision,
                    recall,
                    f1: class_f1(precision, recall),
                    support,
                },
            )
        })
        .collect();

    Ok(ClassificationReport {
        per_class,
        accuracy: accuracy(y_pred, y_true)?,
    })
}

#[cfg(test)]
#[path = "classification_tests.rs"]
mod tests;
