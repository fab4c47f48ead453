//! Latex quality grading.
//!
//! [`QualityGrader`] trains the KNN and decision tree engines fresh for each
//! request, on historical lab results from a [`CorpusSource`] or, when there
//! are too few, on the synthetic corpus. Results carry the grade, a
//! confidence score, the evidence behind it and a description of the model.
//!
//! # Example
//!
//! ```
//! use hevea::config::GraderConfig;
//! use hevea::grading::{Algorithm, LabMeasurement, NoHistory, QualityGrade, QualityGrader};
//!
//! let grader = QualityGrader::new(GraderConfig::default());
//! let sample = LabMeasurement::new(65.5, 0.5, 0.3, 9.0);
//!
//! let result = grader
//!     .classify(&sample, &NoHistory, Algorithm::Knn)
//!     .expect("synthetic corpus is never empty");
//! assert_eq!(result.grade, QualityGrade::A);
//! assert_eq!(result.model_info.training_samples, 120);
//! ```

mod corpus;
mod grade;
mod measurement;
mod service;

pub use corpus::{CorpusOrigin, CorpusSource, NoHistory};
pub use grade::QualityGrade;
pub use measurement::{
    GradedSample, LabMeasurement, DEFAULT_COLOR_SCORE, DEFAULT_VISCOSITY, FEATURE_NAMES,
};
pub use service::{
    Algorithm, Comparison, CorpusSummary, Explanation, GradingResult, Hyperparameters,
    KnnHyperparameters, ModelInfo, QualityGrader, ScreeningResult, TreeHyperparameters,
};

pub(crate) use corpus::TrainingCorpus;

#[cfg(test)]
mod tests;
