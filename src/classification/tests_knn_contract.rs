// =========================================================================
// KNN contract: neighbor search and voting
//
// A KNN prediction is a pure function of the stored training set, the query
// and the hyperparameters. These tests pin that: labels always come from the
// training set, confidence is a vote share, neighbors come back sorted, and
// repeated calls agree exactly.
//
// References:
//   - Cover & Hart (1967) "Nearest Neighbor Pattern Classification"
// =========================================================================

use super::*;

/// Predicted labels always come from the training labels.
#[test]
fn contract_predictions_in_label_set() {
    let x = Matrix::from_vec(
        6,
        2,
        vec![0.0, 0.0, 0.5, 0.5, 1.0, 0.0, 5.0, 5.0, 5.5, 5.5, 6.0, 5.0],
    )
    .expect("valid");
    let y = vec![0_usize, 0, 0, 1, 1, 1];

    let model = KNearestNeighbors::new(3).fit(&x, &y).expect("fit");
    for pred in model.predict_batch(&x).expect("predict") {
        assert!(pred.label <= 1, "prediction {} not in {{0, 1}}", pred.label);
    }
}

/// A training point with k = 1 predicts its own label.
#[test]
fn contract_k1_memorizes_training_set() {
    let x = Matrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]).expect("valid");
    let y = vec!['w', 'x', 'y', 'z'];

    let model = KNearestNeighbors::new(1).fit(&x, &y).expect("fit");
    for (row, label) in x.rows().zip(&y) {
        let pred = model.predict(row).expect("predict");
        assert_eq!(&pred.label, label);
        assert_eq!(pred.neighbors[0].distance, 0.0);
    }
}

mod knn_proptest {
    use super::*;
    use proptest::prelude::*;

    fn training_set() -> impl Strategy<Value = (Vec<f64>, Vec<u8>)> {
        (2usize..20).prop_flat_map(|n| {
            (
                proptest::collection::vec(-50.0f64..50.0, n * 2),
                proptest::collection::vec(0u8..4, n),
            )
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_label_from_training_set(
            (values, labels) in training_set(),
            k in 1usize..8,
            qx in -60.0f64..60.0,
            qy in -60.0f64..60.0,
        ) {
            let x = Matrix::from_vec(labels.len(), 2, values).expect("valid");
            let model = KNearestNeighbors::new(k).fit(&x, &labels).expect("fit");
            let pred = model.predict(&[qx, qy]).expect("predict");

            prop_assert!(labels.contains(&pred.label));
            prop_assert!(pred.confidence > 0.0 && pred.confidence <= 1.0);
            prop_assert_eq!(pred.neighbors.len(), k.min(labels.len()));
            let total: usize = pred.votes.iter().map(|v| v.votes).sum();
            prop_assert_eq!(total, pred.neighbors.len());
        }

        #[test]
        fn prop_prediction_deterministic(
            (values, labels) in training_set(),
            k in 1usize..8,
            qx in -60.0f64..60.0,
            qy in -60.0f64..60.0,
        ) {
            let x = Matrix::from_vec(labels.len(), 2, values).expect("valid");
            let knn = KNearestNeighbors::new(k).with_metric(DistanceMetric::Manhattan);
            let first = knn.fit(&x, &labels).expect("fit").predict(&[qx, qy]).expect("predict");
            let second = knn.fit(&x, &labels).expect("fit").predict(&[qx, qy]).expect("predict");
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_neighbors_sorted(
            (values, labels) in training_set(),
            qx in -60.0f64..60.0,
            qy in -60.0f64..60.0,
        ) {
            let x = Matrix::from_vec(labels.len(), 2, values).expect("valid");
            let model = KNearestNeighbors::new(labels.len())
                .with_metric(DistanceMetric::Minkowski)
                .fit(&x, &labels)
                .expect("fit");
            let neighbors = model.kneighbors(&[qx, qy]).expect("kneighbors");
            for pair in neighbors.windows(2) {
                prop_assert!(pair[0].distance <= pair[1].distance);
                if pair[0].distance == pair[1].distance {
                    prop_assert!(pair[0].index < pair[1].index);
                }
            }
        }
    }
}
