//! The grading service.

use super::{
    CorpusOrigin, CorpusSource, LabMeasurement, QualityGrade, TrainingCorpus, FEATURE_NAMES,
};
use crate::adapters::AnomalyReport;
use crate::classification::{DistanceMetric, Neighbor, VoteCount};
use crate::config::GraderConfig;
use crate::error::{HeveaError, Result};
use crate::model_selection::{find_optimal_k, OptimalK};
use crate::primitives::Matrix;
use crate::synthetic::generate_quality_corpus;
use crate::tree::PathStep;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Columns used when a measurement has no viscosity.
const WITHOUT_VISCOSITY: [usize; 4] = [0, 1, 2, 3];

/// Classification engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Algorithm {
    /// k-nearest neighbors
    Knn,
    /// CART decision tree
    DecisionTree,
}

impl Algorithm {
    /// Human-readable name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Knn => "KNN",
            Algorithm::DecisionTree => "Decision Tree",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Algorithm {
    type Err = HeveaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "knn" => Ok(Algorithm::Knn),
            "tree" | "decision-tree" | "decision_tree" | "decisiontree" => {
                Ok(Algorithm::DecisionTree)
            }
            other => Err(HeveaError::validation(format!(
                "unknown algorithm '{other}', expected knn or decision-tree"
            ))),
        }
    }
}

/// Evidence behind a grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Explanation {
    /// The k nearest training samples and their vote tally.
    Neighbors {
        neighbors: Vec<Neighbor<QualityGrade>>,
        votes: Vec<VoteCount<QualityGrade>>,
    },
    /// The root-to-leaf decisions taken by the tree.
    DecisionPath {
        steps: Vec<PathStep>,
        #[serde(rename = "leafSamples")]
        leaf_samples: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KnnHyperparameters {
    pub k: usize,
    pub distance_metric: DistanceMetric,
    pub normalized: bool,
}

/// Tree settings, plus the fitted shape when a tree was built.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeHyperparameters {
    pub max_depth: usize,
    pub min_samples_split: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depth: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n_leaves: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Hyperparameters {
    Knn(KnnHyperparameters),
    DecisionTree(TreeHyperparameters),
}

/// How the model behind a result was built.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub algorithm: Algorithm,
    pub training_samples: usize,
    pub features: Vec<String>,
    pub hyperparameters: Hyperparameters,
    pub corpus_origin: CorpusOrigin,
}

/// A graded measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    pub grade: QualityGrade,
    /// Heuristic score in [0, 1], not a calibrated probability
    pub confidence: f64,
    pub explanation: Explanation,
    pub model_info: ModelInfo,
}

/// Both engines applied to the same measurement and corpus.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub knn: GradingResult,
    pub decision_tree: GradingResult,
    /// Whether both engines assigned the same grade
    pub agree: bool,
}

impl Comparison {
    /// Disagreeing engines send the sample to a human grader.
    #[must_use]
    pub fn needs_manual_review(&self) -> bool {
        !self.agree
    }
}

/// The training corpus and settings a request would use.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorpusSummary {
    pub training_samples: usize,
    pub corpus_origin: CorpusOrigin,
    pub class_distribution: BTreeMap<QualityGrade, usize>,
    pub features: Vec<String>,
    pub knn: KnnHyperparameters,
    pub decision_tree: TreeHyperparameters,
}

/// Anomaly screening of one measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreeningResult {
    #[serde(flatten)]
    pub report: AnomalyReport,
    pub k: usize,
    pub training_samples: usize,
    pub features: Vec<String>,
    pub corpus_origin: CorpusOrigin,
}

/// Grades lab measurements against a freshly trained model.
///
/// The grader holds only configuration; every call acquires its own corpus
/// and trains its own models, so one grader can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct QualityGrader {
    config: GraderConfig,
}

impl QualityGrader {
    #[must_use]
    pub fn new(config: GraderConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &GraderConfig {
        &self.config
    }

    /// Grades `measurement` with one engine.
    ///
    /// Uses five features when the measurement carries viscosity and the
    /// other four otherwise.
    ///
    /// # Errors
    ///
    /// Propagates corpus source failures other than `CorpusUnavailable`, and
    /// any training error.
    pub fn classify<S>(
        &self,
        measurement: &LabMeasurement,
        source: &S,
        algorithm: Algorithm,
    ) -> Result<GradingResult>
    where
        S: CorpusSource + ?Sized,
    {
        let corpus = self.acquire_corpus(source)?;
        let result = self.grade(&corpus, measurement, algorithm)?;
        info!(
            algorithm = %algorithm,
            grade = %result.grade,
            confidence = result.confidence,
            training_samples = corpus.len(),
            "graded sample"
        );
        Ok(result)
    }

    /// Grades `measurement` with both engines on one corpus.
    ///
    /// # Errors
    ///
    /// Same as [`QualityGrader::classify`].
    pub fn compare<S>(&self, measurement: &LabMeasurement, source: &S) -> Result<Comparison>
    where
        S: CorpusSource + ?Sized,
    {
        let corpus = self.acquire_corpus(source)?;
        let knn = self.grade(&corpus, measurement, Algorithm::Knn)?;
        let decision_tree = self.grade(&corpus, measurement, Algorithm::DecisionTree)?;
        let agree = knn.grade == decision_tree.grade;

        if agree {
            info!(grade = %knn.grade, "engines agree");
        } else {
            warn!(
                knn = %knn.grade,
                decision_tree = %decision_tree.grade,
                "engines disagree, manual review recommended"
            );
        }
        Ok(Comparison {
            knn,
            decision_tree,
            agree,
        })
    }

    /// Describes the corpus and settings without classifying.
    ///
    /// # Errors
    ///
    /// Propagates corpus acquisition failures.
    pub fn describe_corpus<S>(&self, source: &S) -> Result<CorpusSummary>
    where
        S: CorpusSource + ?Sized,
    {
        let corpus = self.acquire_corpus(source)?;
        Ok(CorpusSummary {
            training_samples: corpus.len(),
            corpus_origin: corpus.origin,
            class_distribution: corpus.class_distribution(),
            features: FEATURE_NAMES.iter().map(|s| (*s).to_string()).collect(),
            knn: self.knn_hyperparameters(),
            decision_tree: self.tree_hyperparameters(None, None),
        })
    }

    /// Screens `measurement` for anomalies against the training corpus.
    ///
    /// # Errors
    ///
    /// Propagates corpus acquisition failures and invalid anomaly settings.
    pub fn screen<S>(&self, measurement: &LabMeasurement, source: &S) -> Result<ScreeningResult>
    where
        S: CorpusSource + ?Sized,
    {
        let corpus = self.acquire_corpus(source)?;
        let (x, features) = training_view(&corpus, measurement)?;
        let model = self.config.anomaly.detector().fit(&x)?;
        let report = model.detect(&measurement.features())?;

        if report.is_anomaly {
            warn!(score = report.score, risk = ?report.risk_level, "anomalous lab measurement");
        }
        Ok(ScreeningResult {
            report,
            k: model.k(),
            training_samples: model.n_samples(),
            features,
            corpus_origin: corpus.origin,
        })
    }

    /// Cross-validates every `k` in `1..max_k` on the training corpus with
    /// the configured metric and normalization, all five features.
    ///
    /// Folds are shuffled with the synthetic corpus seed, so repeated calls
    /// agree.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHyperparameter` unless `max_k >= 2` and
    /// `2 <= folds <= training samples`.
    pub fn tune_k<S>(&self, source: &S, max_k: usize, folds: usize) -> Result<OptimalK>
    where
        S: CorpusSource + ?Sized,
    {
        let corpus = self.acquire_corpus(source)?;
        let best = find_optimal_k(
            &self.config.knn.estimator(),
            &corpus.features,
            &corpus.grades,
            max_k,
            folds,
            self.config.synthetic.seed,
        )?;
        info!(k = best.k, accuracy = best.accuracy, folds, "tuned k");
        Ok(best)
    }

    /// Loads history, falling back to the synthetic corpus when it is too
    /// small or the source is unavailable.
    fn acquire_corpus<S>(&self, source: &S) -> Result<TrainingCorpus>
    where
        S: CorpusSource + ?Sized,
    {
        let history = match source.load() {
            Ok(samples) => samples,
            Err(HeveaError::CorpusUnavailable(reason)) => {
                warn!(%reason, "corpus source unavailable");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        let required = self.config.min_historical_samples.max(1);
        if history.len() >= required {
            debug!(samples = history.len(), "training on historical corpus");
            return TrainingCorpus::from_samples(&history, CorpusOrigin::Historical);
        }

        warn!(
            historical = history.len(),
            required,
            samples_per_grade = self.config.synthetic.samples_per_grade,
            "falling back to synthetic corpus"
        );
        let synthetic = generate_quality_corpus(&self.config.synthetic)?;
        TrainingCorpus::from_samples(&synthetic, CorpusOrigin::Synthetic)
    }

    fn grade(
        &self,
        corpus: &TrainingCorpus,
        measurement: &LabMeasurement,
        algorithm: Algorithm,
    ) -> Result<GradingResult> {
        let (x, features) = training_view(corpus, measurement)?;
        let query = measurement.features();

        let (grade, confidence, explanation, hyperparameters) = match algorithm {
            Algorithm::Knn => {
                let model = self.config.knn.estimator().fit(&x, &corpus.grades)?;
                let prediction = model.predict(&query)?;
                (
                    prediction.label,
                    prediction.confidence,
                    Explanation::Neighbors {
                        neighbors: prediction.neighbors,
                        votes: prediction.votes,
                    },
                    Hyperparameters::Knn(self.knn_hyperparameters()),
                )
            }
            Algorithm::DecisionTree => {
                let model = self
                    .config
                    .tree
                    .estimator()
                    .with_feature_names(features.iter().cloned())
                    .fit(&x, &corpus.grades)?;
                let prediction = model.predict_explained(&query)?;
                (
                    prediction.label,
                    prediction.confidence,
                    Explanation::DecisionPath {
                        steps: prediction.path,
                        leaf_samples: prediction.leaf_samples,
                    },
                    Hyperparameters::DecisionTree(
                        self.tree_hyperparameters(Some(model.depth()), Some(model.n_leaves())),
                    ),
                )
            }
        };

        Ok(GradingResult {
            grade,
            confidence,
            explanation,
            model_info: ModelInfo {
                algorithm,
                training_samples: corpus.len(),
                features,
                hyperparameters,
                corpus_origin: corpus.origin,
            },
        })
    }

    fn knn_hyperparameters(&self) -> KnnHyperparameters {
        KnnHyperparameters {
            k: self.config.knn.k,
            distance_metric: self.config.knn.metric,
            normalized: self.config.knn.normalize,
        }
    }

    fn tree_hyperparameters(&self, depth: Option<usize>, n_leaves: Option<usize>) -> TreeHyperparameters {
        TreeHyperparameters {
            max_depth: self.config.tree.max_depth,
            min_samples_split: self.config.tree.min_samples_split,
            depth,
            n_leaves,
        }
    }
}

/// Corpus columns matching the measurement's available features.
fn training_view(
    corpus: &TrainingCorpus,
    measurement: &LabMeasurement,
) -> Result<(Matrix<f64>, Vec<String>)> {
    let names = |n: usize| -> Vec<String> {
        FEATURE_NAMES[..n].iter().map(|s| (*s).to_string()).collect()
    };
    if measurement.viscosity.is_some() {
        Ok((corpus.features.clone(), names(FEATURE_NAMES.len())))
    } else {
        let x = corpus.features.select_columns(&WITHOUT_VISCOSITY)?;
        Ok((x, names(WITHOUT_VISCOSITY.len())))
    }
}
