//! CART decision tree classification.
//!
//! Trees are grown with Gini impurity, splitting on `x[f] <= threshold`.
//! Induction stops at a majority-label leaf when a node is pure, holds fewer
//! than `min_samples_split` samples, reaches `max_depth`, or has no split
//! that reduces impurity. Each leaf records which of these applied.
//!
//! # Example
//!
//! ```
//! use hevea::prelude::*;
//! use hevea::tree::DecisionTreeClassifier;
//!
//! let x = Matrix::from_vec(4, 2, vec![
//!     1.0, 0.0,
//!     2.0, 0.0,
//!     8.0, 1.0,
//!     9.0, 1.0,
//! ]).expect("4x2 matrix");
//! let y = vec!["low", "low", "high", "high"];
//!
//! let model = DecisionTreeClassifier::new()
//!     .with_max_depth(3)
//!     .with_feature_names(["size", "flag"])
//!     .fit(&x, &y)
//!     .expect("fit should succeed");
//!
//! let explained = model.predict_explained(&[7.5, 1.0]).expect("arity matches");
//! assert_eq!(explained.label, "high");
//! assert_eq!(explained.path[0].feature, "size");
//! assert_eq!(model.depth(), 1);
//! ```

mod helpers;

pub use helpers::{gini_impurity, majority_class, weighted_gini};

use crate::error::{HeveaError, Result};
use crate::primitives::Matrix;
use crate::traits::{check_fit_inputs, Classifier, Label, Predictor};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use tracing::debug;

/// Why induction stopped at a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every sample carries the same label
    Pure,
    /// Fewer samples than `min_samples_split`
    TooFewSamples,
    /// The node sits at `max_depth`
    MaxDepth,
    /// No threshold reduces impurity
    NoImprovingSplit,
}

impl StopReason {
    /// Short lowercase name used in renderings.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            StopReason::Pure => "pure",
            StopReason::TooFewSamples => "too few samples",
            StopReason::MaxDepth => "max depth",
            StopReason::NoImprovingSplit => "no improving split",
        }
    }
}

/// Internal node in a decision tree.
///
/// Contains a split condition (feature and threshold) and the two subtrees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node<L> {
    /// Index of the feature to split on
    pub feature_idx: usize,
    /// Threshold value for the split
    pub threshold: f64,
    /// Left subtree (samples where feature <= threshold)
    pub left: Box<TreeNode<L>>,
    /// Right subtree (samples where feature > threshold)
    pub right: Box<TreeNode<L>>,
    /// Number of training samples reaching this node
    pub n_samples: usize,
    /// Gini impurity of those samples
    pub impurity: f64,
}

/// Leaf node in a decision tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Leaf<L> {
    /// Predicted class label for this leaf
    pub class_label: L,
    /// Number of training samples in this leaf
    pub n_samples: usize,
    /// Gini impurity of those samples
    pub impurity: f64,
    /// Share of those samples carrying `class_label`
    pub purity: f64,
    /// Why the tree stopped growing here
    pub stop_reason: StopReason,
}

/// A node in a decision tree (either internal node or leaf).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum TreeNode<L> {
    /// Internal decision node with split condition
    Node(Node<L>),
    /// Leaf node with class prediction
    Leaf(Leaf<L>),
}

impl<L> TreeNode<L> {
    /// Returns the depth of the tree rooted at this node.
    ///
    /// Leaf nodes have depth 0, internal nodes have depth 1 + max(left, right).
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 0,
            TreeNode::Node(node) => 1 + node.left.depth().max(node.right.depth()),
        }
    }

    /// Number of leaves under this node.
    pub fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf(_) => 1,
            TreeNode::Node(node) => node.left.n_leaves() + node.right.n_leaves(),
        }
    }

    /// Number of training samples that reached this node.
    pub fn n_samples(&self) -> usize {
        match self {
            TreeNode::Leaf(leaf) => leaf.n_samples,
            TreeNode::Node(node) => node.n_samples,
        }
    }

    fn collect_leaves<'a>(&'a self, depth: usize, out: &mut Vec<(usize, &'a Leaf<L>)>) {
        match self {
            TreeNode::Leaf(leaf) => out.push((depth, leaf)),
            TreeNode::Node(node) => {
                node.left.collect_leaves(depth + 1, out);
                node.right.collect_leaves(depth + 1, out);
            }
        }
    }
}

/// Decision tree classifier using the CART algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTreeClassifier {
    max_depth: usize,
    min_samples_split: usize,
    feature_names: Option<Vec<String>>,
}

impl DecisionTreeClassifier {
    /// Creates a classifier with `max_depth = 5` and `min_samples_split = 2`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_depth: 5,
            min_samples_split: 2,
            feature_names: None,
        }
    }

    /// Sets the maximum depth of the tree.
    ///
    /// # Arguments
    ///
    /// * `depth` - Maximum depth (root has depth 0; 0 yields a single leaf)
    #[must_use]
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Sets the minimum number of samples required to split an internal node.
    ///
    /// # Arguments
    ///
    /// * `min_samples` - Minimum samples to split (clamped to >= 2)
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples: usize) -> Self {
        self.min_samples_split = min_samples.max(2);
        self
    }

    /// Names the features for decision paths and renderings.
    #[must_use]
    pub fn with_feature_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.feature_names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Maximum depth.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Minimum samples to split.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Fits the decision tree to training data.
    ///
    /// # Errors
    ///
    /// Returns `EmptyTrainingSet` for zero rows, `LengthMismatch` when row and
    /// label counts differ, and `DimensionMismatch` when feature names do not
    /// match the column count. NaN or infinite features are a `Validation`
    /// error.
    pub fn fit<L: Label>(&self, x: &Matrix<f64>, y: &[L]) -> Result<DecisionTreeModel<L>> {
        check_fit_inputs(x, y, "DecisionTree")?;

        let n_features = x.n_cols();
        let feature_names = match &self.feature_names {
            Some(names) if names.len() != n_features => {
                return Err(HeveaError::dimension_mismatch(
                    "feature names",
                    n_features,
                    names.len(),
                ));
            }
            Some(names) => names.clone(),
            None => (0..n_features).map(|i| format!("feature_{i}")).collect(),
        };

        let builder = helpers::TreeBuilder {
            x,
            y,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
        };
        let indices: Vec<usize> = (0..x.n_rows()).collect();
        let root = builder.build(&indices, 0);

        debug!(
            n_samples = x.n_rows(),
            n_features,
            depth = root.depth(),
            n_leaves = root.n_leaves(),
            "fitted decision tree"
        );

        Ok(DecisionTreeModel {
            root,
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            feature_names,
        })
    }
}

impl Default for DecisionTreeClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: Label> Classifier<L> for DecisionTreeClassifier {
    type Model = DecisionTreeModel<L>;

    fn fit(&self, x: &Matrix<f64>, y: &[L]) -> Result<DecisionTreeModel<L>> {
        DecisionTreeClassifier::fit(self, x, y)
    }
}

/// Which child a traversal step took.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// `value <= threshold`
    Left,
    /// `value > threshold`
    Right,
}

impl Direction {
    /// Comparison symbol matching the direction.
    #[must_use]
    pub fn comparison(self) -> &'static str {
        match self {
            Direction::Left => "≤",
            Direction::Right => ">",
        }
    }
}

/// One decision along a root-to-leaf traversal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathStep {
    /// Feature name
    pub feature: String,
    /// Feature index
    pub feature_index: usize,
    /// Split threshold
    pub threshold: f64,
    /// The sample's value for the feature
    pub value: f64,
    /// `≤` or `>`
    pub comparison: &'static str,
    /// Child taken
    pub direction: Direction,
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {:.2} {} {:.2}",
            self.feature, self.value, self.comparison, self.threshold
        )
    }
}

/// Prediction with its decision path.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreePrediction<L> {
    /// Leaf label
    pub label: L,
    /// Purity of the leaf reached
    pub confidence: f64,
    /// Decisions from root to leaf
    pub path: Vec<PathStep>,
    /// Training samples in the leaf reached
    pub leaf_samples: usize,
}

/// A fitted decision tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionTreeModel<L> {
    root: TreeNode<L>,
    max_depth: usize,
    min_samples_split: usize,
    feature_names: Vec<String>,
}

impl<L: Label> DecisionTreeModel<L> {
    /// Root node.
    #[must_use]
    pub fn root(&self) -> &TreeNode<L> {
        &self.root
    }

    /// Depth of the fitted tree (a single leaf has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.root.n_leaves()
    }

    /// Maximum depth the tree was grown with.
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Minimum samples to split the tree was grown with.
    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.min_samples_split
    }

    /// Feature names, one per column.
    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// All leaves with their depth, left to right.
    #[must_use]
    pub fn leaves(&self) -> Vec<(usize, &Leaf<L>)> {
        let mut out = Vec::new();
        self.root.collect_leaves(0, &mut out);
        out
    }

    /// Predicts the label of one sample.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `sample` has the wrong arity.
    pub fn predict(&self, sample: &[f64]) -> Result<L> {
        let leaf = self.descend(sample, |_, _, _| {})?;
        Ok(leaf.class_label.clone())
    }

    /// Decisions taken from root to leaf for `sample`.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `sample` has the wrong arity.
    pub fn decision_path(&self, sample: &[f64]) -> Result<Vec<PathStep>> {
        self.predict_explained(sample).map(|p| p.path)
    }

    /// Predicts one sample together with its decision path and leaf purity.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `sample` has the wrong arity.
    pub fn predict_explained(&self, sample: &[f64]) -> Result<TreePrediction<L>> {
        let mut path = Vec::new();
        let leaf = self.descend(sample, |node, value, direction| {
            path.push(PathStep {
                feature: self.feature_names[node.feature_idx].clone(),
                feature_index: node.feature_idx,
                threshold: node.threshold,
                value,
                comparison: direction.comparison(),
                direction,
            });
        })?;

        Ok(TreePrediction {
            label: leaf.class_label.clone(),
            confidence: leaf.purity,
            path,
            leaf_samples: leaf.n_samples,
        })
    }

    /// Predicts every row of `x`.
    ///
    /// # Errors
    ///
    /// Returns `DimensionMismatch` if `x` has the wrong number of columns.
    pub fn predict_batch(&self, x: &Matrix<f64>) -> Result<Vec<L>> {
        x.rows().map(|row| self.predict(row)).collect()
    }

    /// Accuracy on a labeled test split.
    ///
    /// # Errors
    ///
    /// Returns an error if the split is empty, lengths differ, or arity is wrong.
    pub fn evaluate(&self, x: &Matrix<f64>, y: &[L]) -> Result<f64> {
        self.score(x, y)
    }

    /// Indented text rendering, one line per node.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_node(&self.root, 0, &mut out);
        out
    }

    /// Single traversal shared by prediction and path extraction.
    fn descend<F>(&self, sample: &[f64], mut visit: F) -> Result<&Leaf<L>>
    where
        F: FnMut(&Node<L>, f64, Direction),
    {
        if sample.len() != self.feature_names.len() {
            return Err(HeveaError::dimension_mismatch(
                "decision tree sample",
                self.feature_names.len(),
                sample.len(),
            ));
        }

        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf(leaf) => return Ok(leaf),
                TreeNode::Node(internal) => {
                    let value = sample[internal.feature_idx];
                    let direction = if value <= internal.threshold {
                        Direction::Left
                    } else {
                        Direction::Right
                    };
                    visit(internal, value, direction);
                    node = match direction {
                        Direction::Left => &*internal.left,
                        Direction::Right => &*internal.right,
                    };
                }
            }
        }
    }

    fn render_node(&self, node: &TreeNode<L>, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        // Writing into a String cannot fail.
        match node {
            TreeNode::Leaf(leaf) => {
                let _ = writeln!(
                    out,
                    "{pad}predict {:?} (samples={}, purity={:.2}, {})",
                    leaf.class_label,
                    leaf.n_samples,
                    leaf.purity,
                    leaf.stop_reason.name()
                );
            }
            TreeNode::Node(internal) => {
                let name = &self.feature_names[internal.feature_idx];
                let _ = writeln!(
                    out,
                    "{pad}if {name} ≤ {:.4} (samples={}, gini={:.3})",
                    internal.threshold, internal.n_samples, internal.impurity
                );
                self.render_node(&internal.left, indent + 1, out);
                let _ = writeln!(out, "{pad}else");
                self.render_node(&internal.right, indent + 1, out);
            }
        }
    }
}

impl<L: Label> fmt::Display for DecisionTreeModel<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<L: Label> Predictor<L> for DecisionTreeModel<L> {
    fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    fn predict_label(&self, sample: &[f64]) -> Result<L> {
        self.predict(sample)
    }
}


#[cfg(test)]
mod tests_dt_contract;
