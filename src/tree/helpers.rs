//! Helper functions for tree building.
//!
//! Induction works on index subsets of the original training matrix, so no
//! partition copies the feature data.

use super::{Leaf, Node, StopReason, TreeNode};
use crate::primitives::Matrix;
use crate::traits::Label;
use std::collections::BTreeMap;

/// Candidate splits must beat the incumbent by more than this margin.
pub(crate) const SPLIT_TOLERANCE: f64 = 1e-12;

/// Calculate Gini impurity for a set of labels.
///
/// Formula: Gini = 1 - `Σ(p_i²)` where `p_i` is the proportion of class i.
/// An empty set has impurity 0.
pub fn gini_impurity<L: Ord>(labels: &[L]) -> f64 {
    let mut counts: BTreeMap<&L, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    gini_from_counts(counts.values().copied(), labels.len())
}

/// Sample-weighted Gini impurity of a two-way partition.
pub fn weighted_gini<L: Ord>(left: &[L], right: &[L]) -> f64 {
    let n = left.len() + right.len();
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    (left.len() as f64 / n) * gini_impurity(left) + (right.len() as f64 / n) * gini_impurity(right)
}

fn gini_from_counts(counts: impl Iterator<Item = usize>, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .map(|c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Most frequent label; equal counts resolve to the smallest label.
///
/// Returns `None` for an empty slice.
pub fn majority_class<L: Label>(labels: &[L]) -> Option<L> {
    let mut counts: BTreeMap<&L, usize> = BTreeMap::new();
    for label in labels {
        *counts.entry(label).or_insert(0) += 1;
    }
    majority_of(&counts).map(|(label, _)| label.clone())
}

/// Iterates in key order and only replaces on a strictly larger count.
fn majority_of<'a, L: Ord>(counts: &BTreeMap<&'a L, usize>) -> Option<(&'a L, usize)> {
    let mut best: Option<(&L, usize)> = None;
    for (&label, &count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((label, count));
        }
    }
    best
}

/// Best split found for one node.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Split {
    pub feature_idx: usize,
    pub threshold: f64,
    /// Sample-weighted Gini of the two partitions
    pub impurity: f64,
}

/// Finds the split with the lowest weighted Gini over the rows in `indices`.
///
/// For every feature the observed values are sorted and every midpoint
/// between consecutive distinct values is a candidate threshold. A candidate
/// replaces the current best only when it is lower by more than
/// [`SPLIT_TOLERANCE`], so ties keep the lower feature index and then the
/// lower threshold. Returns `None` when no candidate strictly reduces the
/// node's impurity.
pub(crate) fn find_best_split<L: Label>(
    x: &Matrix<f64>,
    y: &[L],
    indices: &[usize],
) -> Option<Split> {
    let n = indices.len();
    if n < 2 {
        return None;
    }

    let mut totals: BTreeMap<&L, usize> = BTreeMap::new();
    for &i in indices {
        *totals.entry(&y[i]).or_insert(0) += 1;
    }
    let parent_impurity = gini_from_counts(totals.values().copied(), n);

    let mut best: Option<Split> = None;
    let mut order: Vec<usize> = indices.to_vec();

    for feature_idx in 0..x.n_cols() {
        order.sort_by(|&a, &b| x.get(a, feature_idx).total_cmp(&x.get(b, feature_idx)));

        let mut left: BTreeMap<&L, usize> = BTreeMap::new();
        for pos in 0..n - 1 {
            *left.entry(&y[order[pos]]).or_insert(0) += 1;

            let current = x.get(order[pos], feature_idx);
            let next = x.get(order[pos + 1], feature_idx);
            if current == next {
                continue;
            }

            let n_left = pos + 1;
            let n_right = n - n_left;
            let gini_left = gini_from_counts(left.values().copied(), n_left);
            let gini_right = gini_from_counts(
                totals
                    .iter()
                    .map(|(label, &total)| total - left.get(label).copied().unwrap_or(0)),
                n_right,
            );
            let impurity =
                (n_left as f64 * gini_left + n_right as f64 * gini_right) / n as f64;

            if best
                .as_ref()
                .map_or(true, |b| impurity < b.impurity - SPLIT_TOLERANCE)
            {
                // Adjacent floats can round the midpoint up to `next`.
                let mid = (current + next) / 2.0;
                best = Some(Split {
                    feature_idx,
                    threshold: if mid < next { mid } else { current },
                    impurity,
                });
            }
        }
    }

    best.filter(|split| split.impurity < parent_impurity - SPLIT_TOLERANCE)
}

/// Partitions `indices` on `x[feature] <= threshold`.
///
/// Returns `None` if either side would be empty.
pub(crate) fn partition(
    x: &Matrix<f64>,
    indices: &[usize],
    feature_idx: usize,
    threshold: f64,
) -> Option<(Vec<usize>, Vec<usize>)> {
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| x.get(i, feature_idx) <= threshold);

    if left.is_empty() || right.is_empty() {
        None
    } else {
        Some((left, right))
    }
}

/// Recursive CART induction over index subsets.
pub(crate) struct TreeBuilder<'a, L> {
    pub x: &'a Matrix<f64>,
    pub y: &'a [L],
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl<L: Label> TreeBuilder<'_, L> {
    /// Builds the subtree for the rows in `indices` (never empty).
    pub(crate) fn build(&self, indices: &[usize], depth: usize) -> TreeNode<L> {
        let n_samples = indices.len();
        let mut counts: BTreeMap<&L, usize> = BTreeMap::new();
        for &i in indices {
            *counts.entry(&self.y[i]).or_insert(0) += 1;
        }
        let impurity = gini_from_counts(counts.values().copied(), n_samples);

        let stop = if counts.len() <= 1 {
            Some(StopReason::Pure)
        } else if n_samples < self.min_samples_split {
            Some(StopReason::TooFewSamples)
        } else if depth >= self.max_depth {
            Some(StopReason::MaxDepth)
        } else {
            None
        };
        if let Some(reason) = stop {
            return self.leaf(&counts, n_samples, impurity, reason);
        }

        let split = find_best_split(self.x, self.y, indices).and_then(|split| {
            partition(self.x, indices, split.feature_idx, split.threshold)
                .map(|sides| (split, sides))
        });
        let Some((split, (left, right))) = split else {
            return self.leaf(&counts, n_samples, impurity, StopReason::NoImprovingSplit);
        };

        TreeNode::Node(Node {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left: Box::new(self.build(&left, depth + 1)),
            right: Box::new(self.build(&right, depth + 1)),
            n_samples,
            impurity,
        })
    }

    fn leaf(
        &self,
        counts: &BTreeMap<&L, usize>,
        n_samples: usize,
        impurity: f64,
        stop_reason: StopReason,
    ) -> TreeNode<L> {
        // Callers never pass an empty partition, so counts has an entry.
        let (label, count) = majority_of(counts).unwrap_or((&self.y[0], 0));
        TreeNode::Leaf(Leaf {
            class_label: label.clone(),
            n_samples,
            impurity,
            purity: count as f64 / n_samples.max(1) as f64,
            stop_reason,
        })
    }
}

#[cfg(test)]
#[path = "helpers_tests.rs"]
mod tests;
