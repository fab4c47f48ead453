//! Convenience re-exports for common usage.
//!
//! # Usage
//!
//! ```
//! use hevea::prelude::*;
//! ```

pub use crate::classification::{DistanceMetric, KNearestNeighbors, KnnModel, KnnPrediction};
pub use crate::config::GraderConfig;
pub use crate::error::{HeveaError, Result};
pub use crate::grading::{
    Algorithm, CorpusSource, GradedSample, GradingResult, LabMeasurement, NoHistory,
    QualityGrade, QualityGrader,
};
pub use crate::metrics::{accuracy, classification_report, confusion_matrix};
pub use crate::model_selection::{cross_validate, find_optimal_k, train_test_split, KFold};
pub use crate::primitives::Matrix;
pub use crate::traits::{Classifier, Label, Predictor};
pub use crate::tree::{DecisionTreeClassifier, DecisionTreeModel};
