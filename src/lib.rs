//! Hevea: latex quality grading with from-scratch classifiers.
//!
//! Hevea grades raw-rubber latex samples (A to D) from lab measurements. It
//! carries its own k-nearest-neighbors engine and CART decision tree, the
//! evaluation tooling to tune them, and a grading service that trains both
//! on historical lab results or, without history, on a synthetic corpus.
//!
//! # Quick Start
//!
//! ```
//! use hevea::prelude::*;
//!
//! // Two clusters of lab results
//! let x = Matrix::from_vec(4, 2, vec![
//!     70.0, 0.2,
//!     71.0, 0.3,
//!     50.0, 3.0,
//!     51.0, 3.2,
//! ]).unwrap();
//! let y = vec![QualityGrade::A, QualityGrade::A, QualityGrade::D, QualityGrade::D];
//!
//! let knn = KNearestNeighbors::new(1).fit(&x, &y).unwrap();
//! assert_eq!(knn.predict(&[69.0, 0.4]).unwrap().label, QualityGrade::A);
//!
//! let tree = DecisionTreeClassifier::new().fit(&x, &y).unwrap();
//! assert_eq!(tree.predict(&[52.0, 2.9]).unwrap(), QualityGrade::D);
//! ```
//!
//! # Modules
//!
//! - [`primitives`]: Row-major `Matrix`
//! - [`preprocessing`]: Min-max normalization profiles
//! - [`classification`]: K-Nearest Neighbors and distance metrics
//! - [`tree`]: CART decision tree with explainable decision paths
//! - [`metrics`]: Accuracy, confusion matrix, precision/recall/F1
//! - [`model_selection`]: K-fold cross-validation, optimal-k search, train/test split
//! - [`adapters`]: Business-domain adapters and anomaly screening
//! - [`synthetic`]: The per-grade synthetic corpus
//! - [`grading`]: The quality grading service
//! - [`config`]: TOML configuration for the grading service

pub mod adapters;
pub mod classification;
pub mod config;
pub mod error;
pub mod grading;
pub mod metrics;
pub mod model_selection;
pub mod prelude;
pub mod preprocessing;
pub mod primitives;
pub mod synthetic;
pub mod traits;
pub mod tree;

pub use error::{HeveaError, Result};
pub use primitives::Matrix;
pub use traits::{Classifier, Label, Predictor};
