// =========================================================================
// Normalization contract: min-max profile properties
//
// The profile is fitted once on training data and must be reused verbatim
// for queries. These tests pin the three properties that make KNN distances
// trustworthy: training rows land in [0, 1], zero-variance columns collapse
// to 0, and a query is scaled by the stored ranges rather than its own.
// =========================================================================

use super::*;
use proptest::prelude::*;

/// Training rows always land in [0, 1].
#[test]
fn contract_training_rows_bounded() {
    let x = Matrix::from_vec(
        5,
        2,
        vec![
            -10.0, 100.0, 0.0, 200.0, 10.0, 300.0, 20.0, 400.0, 30.0, 500.0,
        ],
    )
    .expect("valid");

    let (scaled, _) = normalize(&x).expect("normalize");
    for (i, row) in scaled.rows().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            assert!(
                (0.0..=1.0).contains(&v),
                "value[{i},{j}]={v} outside [0, 1]"
            );
        }
    }
}

/// A query is scaled with the stored ranges, not with its own values.
#[test]
fn contract_query_uses_stored_profile() {
    let x = Matrix::from_vec(2, 1, vec![0.0, 10.0]).expect("valid");
    let (_, profile) = normalize(&x).expect("normalize");

    // Refitting on the query alone would give 0 (degenerate); the stored
    // profile gives 2.0.
    let scaled = profile.transform_row(&[20.0]).expect("arity");
    assert!((scaled[0] - 2.0).abs() < 1e-12);
}

/// Every training min maps to 0 and every training max maps to 1.
#[test]
fn contract_extremes_map_to_unit_bounds() {
    let x = Matrix::from_vec(3, 2, vec![3.0, -1.0, 9.0, 4.0, 6.0, 1.5]).expect("valid");
    let (scaled, _) = normalize(&x).expect("normalize");

    assert_eq!(scaled.get(0, 0), 0.0);
    assert_eq!(scaled.get(1, 0), 1.0);
    assert_eq!(scaled.get(0, 1), 0.0);
    assert_eq!(scaled.get(1, 1), 1.0);
}

mod normalization_proptest {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_rows_bounded(
            values in proptest::collection::vec(-1.0e6f64..1.0e6, 3..60),
        ) {
            let rows = values.len() / 3;
            let x = Matrix::from_vec(rows, 3, values[..rows * 3].to_vec()).expect("valid");
            let (scaled, profile) = normalize(&x).expect("normalize");

            prop_assert_eq!(profile.n_features(), 3);
            for &v in scaled.as_slice() {
                prop_assert!((-1e-12..=1.0 + 1e-12).contains(&v), "value {} out of range", v);
            }
        }

        #[test]
        fn prop_transform_row_matches_transform(
            values in proptest::collection::vec(-100.0f64..100.0, 4..40),
        ) {
            let rows = values.len() / 2;
            let x = Matrix::from_vec(rows, 2, values[..rows * 2].to_vec()).expect("valid");
            let (scaled, profile) = normalize(&x).expect("normalize");

            for (i, row) in x.rows().enumerate() {
                let single = profile.transform_row(row).expect("arity");
                prop_assert_eq!(single.as_slice(), scaled.row(i));
            }
        }
    }
}
