//! Core compute primitives.
//!
//! [`Matrix`] is the training matrix every engine consumes: one row per
//! sample, one column per feature.

mod matrix;

pub use matrix::Matrix;
