use chrono::{Duration, TimeZone, Utc};
use proptest::prelude::*;
use std::collections::HashSet;
use std::ops::Range;
use tradelabel::config::Anchor;
use tradelabel::{
    CpcvConfig, CpcvSplitter, DataSplitter, ExitReason, Label, LabeledRecord,
    RollingHorizonSplitter, SplitConfig, TradelabelError,
};

fn records(n: usize, holding: usize) -> Vec<LabeledRecord> {
    let start = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| LabeledRecord {
            timestamp: start + Duration::days(i as i64),
            reference_price: 50.0 + i as f64,
            label: Label::ALL[i % 3],
            exit_timestamp: start + Duration::days((i + holding) as i64),
            exit_reason: ExitReason::Time,
            exit_price: 50.0 + (i + holding) as f64,
            return_pct: 0.01,
            holding_periods: holding,
        })
        .collect()
}

#[test]
fn test_latest_anchor_410_records() {
    let data = records(410, 1);
    let splitter = RollingHorizonSplitter::new(SplitConfig::new(200, 5, Anchor::Latest)).unwrap();
    let folds = splitter.split(&data).unwrap();

    assert_eq!(folds.len(), 2);
    assert_eq!(folds[0].index, 0);
    assert_eq!(folds[0].test_indices, (405..410).collect::<Vec<_>>());
    assert_eq!(folds[0].train_indices, (205..405).collect::<Vec<_>>());
    assert_eq!(folds[1].test_indices, (200..205).collect::<Vec<_>>());
    assert_eq!(folds[1].train_indices, (0..200).collect::<Vec<_>>());

    assert_eq!(folds[0].test_records[0], data[405]);
    assert_eq!(folds[1].train_records.len(), 200);
}

#[test]
fn test_three_records_are_insufficient() {
    let splitter = RollingHorizonSplitter::new(SplitConfig::new(200, 5, Anchor::Latest)).unwrap();
    let err = splitter.split(&records(3, 1)).unwrap_err();

    assert!(err.is_insufficient_data());
    assert!(matches!(
        err,
        TradelabelError::InsufficientData { available: 3, required: 205 }
    ));
}

#[test]
fn test_cpcv_fold_count() {
    let splitter = CpcvSplitter::new(CpcvConfig::default()).unwrap();
    let folds = splitter.split(&records(300, 3)).unwrap();
    assert_eq!(folds.len(), 45);
    assert_eq!(splitter.fold_count(), 45);
}

/// Contiguous runs of a sorted index list
fn runs(indices: &[usize]) -> Vec<Range<usize>> {
    let mut out: Vec<Range<usize>> = Vec::new();
    for &i in indices {
        match out.last_mut() {
            Some(last) if last.end == i => last.end = i + 1,
            _ => out.push(i..i + 1),
        }
    }
    out
}

fn binomial(n: usize, k: usize) -> usize {
    (0..k).fold(1, |acc, i| acc * (n - i) / (i + 1))
}

proptest! {
    #[test]
    fn prop_rolling_folds_never_repeat_records(
        total in 0usize..400,
        train in 1usize..60,
        test in 1usize..20,
        latest in any::<bool>(),
    ) {
        let anchor = if latest { Anchor::Latest } else { Anchor::Earliest };
        let splitter = RollingHorizonSplitter::new(SplitConfig::new(train, test, anchor)).unwrap();
        let data = records(total, 1);

        match splitter.split(&data) {
            Ok(folds) => {
                prop_assert_eq!(folds.len(), total / (train + test));

                let mut seen = HashSet::new();
                for fold in &folds {
                    prop_assert_eq!(fold.train_indices.len(), train);
                    prop_assert_eq!(fold.test_indices.len(), test);
                    prop_assert_eq!(fold.train_indices.last().unwrap() + 1, fold.test_indices[0]);
                    for &i in fold.train_indices.iter().chain(&fold.test_indices) {
                        prop_assert!(seen.insert(i));
                    }
                }

                if latest {
                    prop_assert_eq!(*folds[0].test_indices.last().unwrap(), total - 1);
                } else {
                    prop_assert_eq!(folds[0].train_indices[0], 0);
                }
            }
            Err(e) => {
                prop_assert!(e.is_insufficient_data());
                prop_assert!(total < train + test);
            }
        }
    }

    #[test]
    fn prop_cpcv_purges_and_embargoes(
        n_blocks in 2usize..8,
        test_pick in 1usize..8,
        extra in 0usize..80,
        purge in 0usize..5,
        embargo in 0usize..5,
    ) {
        let n_test_blocks = 1 + test_pick % (n_blocks - 1);
        let total = n_blocks + extra;
        let config = CpcvConfig {
            n_blocks,
            n_test_blocks,
            purge_window: purge,
            embargo_window: embargo,
            use_barrier_times: false,
        };
        let folds = CpcvSplitter::new(config).unwrap().split(&records(total, 2)).unwrap();

        prop_assert_eq!(folds.len(), binomial(n_blocks, n_test_blocks));

        for fold in &folds {
            let test: HashSet<usize> = fold.test_indices.iter().copied().collect();
            prop_assert!(fold.train_indices.iter().all(|i| !test.contains(i)));

            for run in runs(&fold.test_indices) {
                let purge_zone = run.start.saturating_sub(purge)..run.start;
                let embargo_zone = run.end..(run.end + embargo).min(total);
                for &i in &fold.train_indices {
                    prop_assert!(!purge_zone.contains(&i));
                    prop_assert!(!embargo_zone.contains(&i));
                }
            }
        }
    }

    #[test]
    fn prop_cpcv_barrier_purge_removes_overlaps(
        n_blocks in 2usize..6,
        extra in 0usize..60,
        holding in 1usize..6,
    ) {
        let total = n_blocks + extra;
        let data = records(total, holding);
        let config = CpcvConfig {
            n_blocks,
            n_test_blocks: 1,
            purge_window: 0,
            embargo_window: 0,
            use_barrier_times: true,
        };
        let folds = CpcvSplitter::new(config).unwrap().split(&data).unwrap();

        for fold in &folds {
            let first = &data[fold.test_indices[0]];
            let last_exit =
                fold.test_indices.iter().map(|&i| data[i].exit_timestamp).max().unwrap();
            for &i in &fold.train_indices {
                let r = &data[i];
                prop_assert!(r.exit_timestamp < first.timestamp || r.timestamp > last_exit);
            }
        }
    }
}
