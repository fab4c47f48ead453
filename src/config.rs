//! Grading service configuration.
//!
//! Every field has a default, so an empty TOML document is a valid
//! configuration:
//!
//! ```toml
//! min_historical_samples = 1
//!
//! [knn]
//! k = 3
//! metric = "euclidean"
//! normalize = true
//!
//! [tree]
//! max_depth = 5
//! min_samples_split = 2
//!
//! [synthetic]
//! samples_per_grade = 30
//! seed = 42
//!
//! [anomaly]
//! k = 5
//! threshold = 0.3
//! ```

use crate::adapters::AnomalyDetector;
use crate::classification::{DistanceMetric, KNearestNeighbors};
use crate::error::{HeveaError, Result};
use crate::synthetic::SyntheticConfig;
use crate::tree::DecisionTreeClassifier;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// KNN hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnnSettings {
    /// Number of neighbors
    pub k: usize,
    /// Distance metric
    pub metric: DistanceMetric,
    /// Min-max normalize features
    pub normalize: bool,
}

impl Default for KnnSettings {
    fn default() -> Self {
        Self {
            k: 3,
            metric: DistanceMetric::Euclidean,
            normalize: true,
        }
    }
}

impl KnnSettings {
    /// Estimator configured with these settings.
    #[must_use]
    pub fn estimator(&self) -> KNearestNeighbors {
        KNearestNeighbors::new(self.k)
            .with_metric(self.metric)
            .with_normalization(self.normalize)
    }
}

/// Decision tree hyperparameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeSettings {
    /// Maximum depth
    pub max_depth: usize,
    /// Minimum samples to split a node
    pub min_samples_split: usize,
}

impl Default for TreeSettings {
    fn default() -> Self {
        Self {
            max_depth: 5,
            min_samples_split: 2,
        }
    }
}

impl TreeSettings {
    /// Estimator configured with these settings.
    #[must_use]
    pub fn estimator(&self) -> DecisionTreeClassifier {
        DecisionTreeClassifier::new()
            .with_max_depth(self.max_depth)
            .with_min_samples_split(self.min_samples_split)
    }
}

/// Anomaly screening settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnomalySettings {
    /// Neighbors averaged per query
    pub k: usize,
    /// Mean normalized distance above which a point is anomalous
    pub threshold: f64,
}

impl Default for AnomalySettings {
    fn default() -> Self {
        Self { k: 5, threshold: 0.3 }
    }
}

impl AnomalySettings {
    /// Detector configured with these settings.
    #[must_use]
    pub fn detector(&self) -> AnomalyDetector {
        AnomalyDetector::new(self.k).with_threshold(self.threshold)
    }
}

/// Top-level configuration for [`crate::grading::QualityGrader`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraderConfig {
    /// Historical samples required before the synthetic corpus is skipped
    pub min_historical_samples: usize,
    /// KNN settings
    pub knn: KnnSettings,
    /// Decision tree settings
    pub tree: TreeSettings,
    /// Synthetic fallback corpus
    pub synthetic: SyntheticConfig,
    /// Anomaly screening
    pub anomaly: AnomalySettings,
}

impl Default for GraderConfig {
    fn default() -> Self {
        Self {
            min_historical_samples: 1,
            knn: KnnSettings::default(),
            tree: TreeSettings::default(),
            synthetic: SyntheticConfig::default(),
            anomaly: AnomalySettings::default(),
        }
    }
}

impl GraderConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `Config` for malformed TOML or out-of-range values.
    ///
    /// # Example
    ///
    /// ```
    /// use hevea::config::GraderConfig;
    ///
    /// let config = GraderConfig::from_toml_str("[knn]\nk = 5\n").expect("valid");
    /// assert_eq!(config.knn.k, 5);
    /// assert_eq!(config.tree.max_depth, 5);
    /// ```
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).map_err(|e| HeveaError::Config {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read and `Config` if it is invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| HeveaError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Checks every value range.
    ///
    /// # Errors
    ///
    /// Returns `Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        let fail = |message: String| Err(HeveaError::Config { message });

        if self.knn.k == 0 {
            return fail("knn.k must be at least 1".into());
        }
        if self.tree.min_samples_split < 2 {
            return fail(format!(
                "tree.min_samples_split must be at least 2, got {}",
                self.tree.min_samples_split
            ));
        }
        if self.synthetic.samples_per_grade == 0 {
            return fail("synthetic.samples_per_grade must be at least 1".into());
        }
        if self.anomaly.k == 0 {
            return fail("anomaly.k must be at least 1".into());
        }
        if !(self.anomaly.threshold.is_finite() && self.anomaly.threshold > 0.0) {
            return fail(format!(
                "anomaly.threshold must be a positive number, got {}",
                self.anomaly.threshold
            ));
        }
        Ok(())
    }
}
