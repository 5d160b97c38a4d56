//! Property-based tests for the bias analysis pipeline.
//!
//! Invariants checked for generated inputs:
//! - gender percentages sum to 100 whenever at least one value is recognized
//! - the bias score stays in `[0, 1]` and agrees with its label
//! - gender normalization is idempotent
//! - column resolution honours alias priority regardless of column order
//! - every valid age falls in exactly one band and band counts sum to
//!   `total_valid`

use proptest::prelude::*;

use cohort_bias::analyzers::{
    normalize_gender, resolve_column, AgeBand, AnalysisRunner, BiasLabel, DEFAULT_GENDER_ALIASES,
};
use cohort_bias::core::Dataset;

fn gender_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("M".to_string()),
        Just("f".to_string()),
        Just("1".to_string()),
        Just("0".to_string()),
        Just("Male.".to_string()),
        Just("female".to_string()),
        "[a-zA-Z ]{0,6}",
    ]
}

fn age_cell() -> impl Strategy<Value = String> {
    prop_oneof![
        (-20.0f64..150.0).prop_map(|a| format!("{a:.1}")),
        (0u32..130).prop_map(|a| a.to_string()),
        Just("n/a".to_string()),
        Just(String::new()),
    ]
}

fn cohort(rows: Vec<(String, String)>) -> Dataset {
    let rows = rows.into_iter().map(|(g, a)| vec![g, a]).collect();
    Dataset::new(vec!["gender".to_string(), "age".to_string()], rows).unwrap()
}

proptest! {
    #[test]
    fn prop_percentages_and_score(rows in prop::collection::vec((gender_cell(), age_cell()), 0..200)) {
        let report = AnalysisRunner::new().run(&cohort(rows)).unwrap();
        let gender = &report.gender;

        prop_assert_eq!(gender.total, gender.male_count + gender.female_count);
        if gender.total > 0 {
            prop_assert!((gender.male_percent + gender.female_percent - 100.0).abs() < 1e-9);
        } else {
            prop_assert_eq!(gender.male_percent, 0.0);
            prop_assert_eq!(gender.female_percent, 0.0);
        }
        prop_assert!((0.0..=1.0).contains(&gender.bias_score));
        prop_assert_eq!(gender.bias_label, BiasLabel::from_score(gender.bias_score));
    }

    #[test]
    fn prop_age_bands_partition(rows in prop::collection::vec((gender_cell(), age_cell()), 0..200)) {
        let report = AnalysisRunner::new().run(&cohort(rows)).unwrap();

        if let Some(age) = report.age {
            prop_assert!(age.total_valid > 0);
            prop_assert_eq!(age.age_groups.len(), AgeBand::ALL.len());
            let sum: u64 = age.age_groups.values().map(|g| g.count).sum();
            prop_assert_eq!(sum, age.total_valid);
            prop_assert!(age.min_age as f64 <= age.mean_age.ceil());
            prop_assert!(age.mean_age.floor() <= age.max_age as f64);
            prop_assert!(age.min_age >= 0 && age.max_age < 120);
        }
    }

    #[test]
    fn prop_every_age_has_one_band(age in 0.0f64..120.0) {
        let containing = AgeBand::ALL.iter().filter(|b| b.contains(age)).count();
        prop_assert_eq!(containing, 1);
        prop_assert!(AgeBand::for_age(age).is_some());
    }

    #[test]
    fn prop_normalization_idempotent(raw in "[ a-zA-Z0-9.]{0,8}") {
        let once = normalize_gender(&raw);
        prop_assert_eq!(normalize_gender(&once), once.clone());
    }

    #[test]
    fn prop_alias_priority(extra in prop::collection::vec("[a-z_]{3,10}", 0..5), gender_first in any::<bool>()) {
        let mut columns: Vec<String> = extra
            .into_iter()
            .filter(|c| !DEFAULT_GENDER_ALIASES.contains(&c.as_str()))
            .collect();
        if gender_first {
            columns.insert(0, "GENDER".to_string());
            columns.push("Sex".to_string());
        } else {
            columns.insert(0, "Sex".to_string());
            columns.push("GENDER".to_string());
        }

        prop_assert_eq!(
            resolve_column(&columns, DEFAULT_GENDER_ALIASES),
            Some("GENDER".to_string())
        );
    }
}
