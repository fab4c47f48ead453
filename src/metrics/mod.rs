//! Evaluation metrics for classifiers.
//!
//! Accuracy, per-label precision/recall/F1 and the confusion matrix. All
//! functions are generic over the label type and return errors instead of
//! panicking on mismatched or empty inputs.

pub mod classification;

pub use classification::{
    accuracy, classification_report, confusion_matrix, Average, ClassMetrics,
    ClassificationReport, ConfusionMatrix,
};

#[cfg(test)]
mod tests_classification_contract;
