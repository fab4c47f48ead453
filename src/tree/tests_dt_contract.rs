// =========================================================================
// Decision tree contract: CART induction and traversal
//
// The explanation a tree gives must be the reason for its answer: the
// decision path ends at the very leaf `predict` reaches. Induction must stop
// only for a recorded reason, and with distinct feature values an impure
// node large enough to split always finds a split.
//
// References:
//   - Breiman et al. (1984) "Classification and Regression Trees"
// =========================================================================

use super::*;

/// Predictions are always training labels.
#[test]
fn contract_predictions_in_label_set() {
    let x = Matrix::from_vec(6, 2, vec![0.0, 0.0, 1.0, 0.0, 2.0, 0.0, 0.0, 1.0, 1.0, 1.0, 2.0, 1.0])
        .expect("valid matrix");
    let y = vec![0_usize, 0, 1, 1, 2, 2];

    let model = DecisionTreeClassifier::new().fit(&x, &y).expect("fit");
    for p in model.predict_batch(&x).expect("predict") {
        assert!(p <= 2, "prediction {p} not in [0, 2]");
    }
}

/// Depth never exceeds max_depth.
#[test]
fn contract_depth_bounded() {
    let x = Matrix::from_vec(8, 1, (0..8).map(f64::from).collect()).expect("valid");
    let y = vec![0, 1, 0, 1, 0, 1, 0, 1];
    for max_depth in 0..5 {
        let model = DecisionTreeClassifier::new()
            .with_max_depth(max_depth)
            .fit(&x, &y)
            .expect("fit");
        assert!(model.depth() <= max_depth);
    }
}

mod dt_proptest {
    use super::*;
    use proptest::prelude::*;

    /// Rows with distinct values in column 0 and arbitrary labels.
    fn distinct_training_set() -> impl Strategy<Value = (Matrix<f64>, Vec<u8>)> {
        (2usize..30).prop_flat_map(|n| {
            (
                proptest::collection::vec(-100.0f64..100.0, n),
                proptest::collection::vec(0u8..3, n),
            )
                .prop_map(move |(extra, labels)| {
                    let mut data = Vec::with_capacity(n * 2);
                    for (i, v) in extra.into_iter().enumerate() {
                        data.push(i as f64 * 1.5);
                        data.push(v);
                    }
                    (Matrix::from_vec(n, 2, data).expect("valid"), labels)
                })
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_path_ends_at_predicted_leaf(
            (x, y) in distinct_training_set(),
            max_depth in 0usize..6,
            q0 in -5.0f64..50.0,
            q1 in -120.0f64..120.0,
        ) {
            let model = DecisionTreeClassifier::new()
                .with_max_depth(max_depth)
                .fit(&x, &y)
                .expect("fit");
            let sample = [q0, q1];

            let label = model.predict(&sample).expect("predict");
            let explained = model.predict_explained(&sample).expect("explain");
            prop_assert_eq!(label, explained.label);

            // Replaying the path by hand lands on the same leaf.
            let mut node = model.root();
            for step in &explained.path {
                let TreeNode::Node(internal) = node else {
                    return Err(TestCaseError::fail("path longer than tree"));
                };
                prop_assert_eq!(step.feature_index, internal.feature_idx);
                node = match step.direction {
                    Direction::Left => &*internal.left,
                    Direction::Right => &*internal.right,
                };
            }
            let TreeNode::Leaf(leaf) = node else {
                return Err(TestCaseError::fail("path stopped at an internal node"));
            };
            prop_assert_eq!(leaf.class_label, label);
        }

        #[test]
        fn prop_leaves_stop_for_a_reason(
            (x, y) in distinct_training_set(),
            max_depth in 0usize..6,
            min_split in 2usize..6,
        ) {
            let model = DecisionTreeClassifier::new()
                .with_max_depth(max_depth)
                .with_min_samples_split(min_split)
                .fit(&x, &y)
                .expect("fit");

            for (depth, leaf) in model.leaves() {
                let pure = leaf.impurity == 0.0;
                let small = leaf.n_samples < min_split;
                let deep = depth == max_depth;
                prop_assert!(
                    pure || small || deep,
                    "leaf at depth {} with {} samples stopped for {:?}",
                    depth, leaf.n_samples, leaf.stop_reason
                );
                prop_assert!(leaf.purity > 0.0 && leaf.purity <= 1.0);
            }
        }

        #[test]
        fn prop_fit_deterministic(
            (x, y) in distinct_training_set(),
        ) {
            let dt = DecisionTreeClassifier::new();
            let a = dt.fit(&x, &y).expect("fit");
            let b = dt.fit(&x, &y).expect("fit");
            prop_assert_eq!(a, b);
        }
    }
}
