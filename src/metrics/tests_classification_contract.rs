// =========================================================================
// Classification metrics contract
//
// Every ratio lives in [0, 1], perfect predictions score 1 everywhere, and
// the confusion matrix accounts for every sample exactly once.
//
// References:
//   - Sokolova & Lapalme (2009) "A systematic analysis of performance measures"
// =========================================================================

use super::*;
use proptest::prelude::*;

/// Perfect predictions give accuracy and per-class F1 of 1.
#[test]
fn contract_perfect_predictions() {
    let y = vec!["A", "B", "C", "A", "B", "C"];
    let report = classification_report(&y, &y).expect("valid");

    assert_eq!(report.accuracy, 1.0);
    for metrics in report.per_class.values() {
        assert_eq!(metrics.precision, 1.0);
        assert_eq!(metrics.recall, 1.0);
        assert_eq!(metrics.f1, 1.0);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_metrics_bounded(
        pairs in proptest::collection::vec((0u8..4, 0u8..4), 1..50),
    ) {
        let (y_pred, y_true): (Vec<u8>, Vec<u8>) = pairs.into_iter().unzip();
        let report = classification_report(&y_pred, &y_true).expect("valid");

        prop_assert!((0.0..=1.0).contains(&report.accuracy));
        for m in report.per_class.values() {
            prop_assert!((0.0..=1.0).contains(&m.precision));
            prop_assert!((0.0..=1.0).contains(&m.recall));
            prop_assert!((0.0..=1.0).contains(&m.f1));
        }
        for avg in [Average::Macro, Average::Weighted] {
            prop_assert!((0.0..=1.0 + 1e-12).contains(&report.f1(avg)));
        }
    }

    #[test]
    fn prop_confusion_matrix_accounts_for_all_samples(
        pairs in proptest::collection::vec((0u8..5, 0u8..5), 1..50),
    ) {
        let (y_pred, y_true): (Vec<u8>, Vec<u8>) = pairs.into_iter().unzip();
        let cm = confusion_matrix(&y_pred, &y_true).expect("valid");

        let total: usize = cm.counts().as_slice().iter().sum();
        prop_assert_eq!(total, y_true.len());

        let diagonal: usize = (0..cm.labels().len()).map(|i| cm.counts().get(i, i)).sum();
        let acc = accuracy(&y_pred, &y_true).expect("valid");
        prop_assert!((acc - diagonal as f64 / y_true.len() as f64).abs() < 1e-12);
    }
}
