// =========================================================================
// KFold contract: cross-validation index arithmetic
//
// Every sample lands in exactly one test fold, train and test never overlap
// within a fold, and a seeded shuffle reproduces the same folds.
//
// References:
//   - Stone (1974) "Cross-Validatory Choice and Assessment of Predictions"
// =========================================================================

use super::*;

/// K-Fold produces exactly K splits
#[test]
fn contract_produces_k_splits() {
    let splits = KFold::new(5).split(100).expect("valid");
    assert_eq!(splits.len(), 5);
}

/// Train + test indices cover all samples per fold
#[test]
fn contract_train_test_cover_all() {
    let n = 17; // non-divisible by K to test remainder handling
    let splits = KFold::new(4).split(n).expect("valid");

    for (fold_idx, (train, test)) in splits.iter().enumerate() {
        let mut all: Vec<usize> = train.iter().chain(test.iter()).copied().collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), n, "fold {fold_idx} covers {} samples", all.len());
    }
}

/// Train and test sets are disjoint within each fold
#[test]
fn contract_train_test_disjoint() {
    use std::collections::HashSet;

    let splits = KFold::new(3).with_random_state(11).split(30).expect("valid");
    for (fold_idx, (train, test)) in splits.iter().enumerate() {
        let train_set: HashSet<usize> = train.iter().copied().collect();
        assert!(
            test.iter().all(|i| !train_set.contains(i)),
            "fold {fold_idx} shares samples between train and test"
        );
    }
}

mod kfold_proptest {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn prop_sample_coverage(
            k in 2..=10usize,
            n in 10..=50usize,
            seed in any::<u64>(),
        ) {
            let splits = KFold::new(k).with_random_state(seed).split(n).expect("valid");
            prop_assert_eq!(splits.len(), k);

            let mut test_counts = vec![0usize; n];
            for (_train, test) in &splits {
                for &idx in test {
                    test_counts[idx] += 1;
                }
            }
            prop_assert!(test_counts.iter().all(|&c| c == 1));
        }

        #[test]
        fn prop_seeded_shuffle_reproducible(
            n in 4..=40usize,
            seed in any::<u64>(),
        ) {
            let a = KFold::new(4).with_random_state(seed).split(n).expect("valid");
            let b = KFold::new(4).with_random_state(seed).split(n).expect("valid");
            prop_assert_eq!(a, b);
        }
    }
}
