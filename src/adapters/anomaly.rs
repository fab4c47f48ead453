//! Unsupervised distance-based anomaly screening.
//!
//! The detector stores a set of known-normal feature vectors, normalized
//! with a profile computed from those raw vectors at fit time. A query is
//! scored by its mean distance to the k nearest stored vectors in that
//! normalized space and flagged when the score exceeds the threshold.

use crate::classification::{DistanceMetric, KNearestNeighbors, KnnModel};
use crate::error::{HeveaError, Result};
use crate::primitives::Matrix;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Feature names of a [`TransactionRecord`], in vector order.
pub const TRANSACTION_FEATURES: [&str; 5] = [
    "transactionAmount",
    "timeOfDay",
    "locationFactor",
    "userBehaviorScore",
    "frequency",
];

/// A sell transaction screened for anomalies. Missing fields become `0.0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransactionRecord {
    pub transaction_amount: Option<f64>,
    /// Hour of day, 0 to 23
    pub time_of_day: Option<f64>,
    pub location_factor: Option<f64>,
    pub user_behavior_score: Option<f64>,
    pub frequency: Option<f64>,
}

impl TransactionRecord {
    /// Feature vector in [`TRANSACTION_FEATURES`] order.
    #[must_use]
    pub fn features(&self) -> [f64; 5] {
        [
            self.transaction_amount,
            self.time_of_day,
            self.location_factor,
            self.user_behavior_score,
            self.frequency,
        ]
        .map(|v| v.unwrap_or(0.0))
    }
}

/// Anomaly detector configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnomalyDetector {
    k: usize,
    threshold: f64,
    metric: DistanceMetric,
}

impl AnomalyDetector {
    /// Detector averaging over `k` neighbors with the default threshold 0.3.
    #[must_use]
    pub fn new(k: usize) -> Self {
        Self {
            k,
            threshold: 0.3,
            metric: DistanceMetric::Euclidean,
        }
    }

    /// Sets the mean-distance threshold, in normalized units.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Sets the distance metric.
    #[must_use]
    pub fn with_metric(mut self, metric: DistanceMetric) -> Self {
        self.metric = metric;
        self
    }

    #[must_use]
    pub fn k(&self) -> usize {
        self.k
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Stores `normal` (one row per known-normal sample).
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` for `k == 0` or a non-positive
    /// threshold, and `EmptyTrainingSet` for zero rows.
    pub fn fit(&self, normal: &Matrix<f64>) -> Result<AnomalyModel> {
        if !(self.threshold.is_finite() && self.threshold > 0.0) {
            return Err(HeveaError::invalid_hyperparameter(
                "threshold",
                self.threshold,
                "finite and > 0",
            ));
        }
        let labels = vec![(); normal.n_rows()];
        let neighbors = KNearestNeighbors::new(self.k)
            .with_metric(self.metric)
            .fit(normal, &labels)?;

        debug!(
            k = self.k,
            threshold = self.threshold,
            n_samples = normal.n_rows(),
            "fitted anomaly detector"
        );
        Ok(AnomalyModel {
            neighbors,
            threshold: self.threshold,
        })
    }

    /// Stores the feature vectors of known-normal transactions.
    ///
    /// # Errors
    ///
    /// Same as [`AnomalyDetector::fit`].
    pub fn fit_transactions(&self, normal: &[TransactionRecord]) -> Result<AnomalyModel> {
        if normal.is_empty() {
            return Err(HeveaError::EmptyTrainingSet { model: "KNN" });
        }
        let rows: Vec<[f64; 5]> = normal.iter().map(TransactionRecord::features).collect();
        self.fit(&Matrix::from_rows(&rows)?)
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Coarse risk band of an anomaly report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Normal,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    fn from_report(is_anomaly: bool, confidence: f64) -> Self {
        if !is_anomaly {
            RiskLevel::Normal
        } else if confidence > 0.8 {
            RiskLevel::High
        } else if confidence > 0.5 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Outcome of screening one point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnomalyReport {
    pub is_anomaly: bool,
    /// Mean distance to the nearest stored samples
    pub score: f64,
    pub threshold: f64,
    /// `min(score / threshold, 1)`
    pub confidence: f64,
    pub risk_level: RiskLevel,
}

/// A fitted anomaly detector.
#[derive(Debug, Clone)]
pub struct AnomalyModel {
    neighbors: KnnModel<()>,
    threshold: f64,
}

impl AnomalyModel {
    /// Neighbors averaged per query.
    #[must_use]
    pub fn k(&self) -> usize {
        self.neighbors.k()
    }

    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Number of stored normal samples.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.neighbors.n_samples()
    }

    /// Scores `point` (raw feature space).
    ///
    /// The score averages over `min(k, n_samples)` neighbors. A point that
    /// coincides with a stored sample is never anomalous.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `point` has the wrong arity.
    pub fn detect(&self, point: &[f64]) -> Result<AnomalyReport> {
        let nearest = self.neighbors.kneighbors(point)?;
        let score = nearest.iter().map(|n| n.distance).sum::<f64>() / nearest.len() as f64;
        let exact_match = nearest.first().is_some_and(|n| n.distance == 0.0);

        let is_anomaly = !exact_match && score > self.threshold;
        let confidence = (score / self.threshold).min(1.0);

        Ok(AnomalyReport {
            is_anomaly,
            score,
            threshold: self.threshold,
            confidence,
            risk_level: RiskLevel::from_report(is_anomaly, confidence),
        })
    }

    /// Scores one transaction.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if the model was fitted on other features.
    pub fn detect_transaction(&self, record: &TransactionRecord) -> Result<AnomalyReport> {
        self.detect(&record.features())
    }
}
