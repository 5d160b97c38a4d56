//! Dataset builders for tests and benchmarks.
//!
//! Available in unit tests and, with the `test-utils` feature, to integration
//! tests and downstream crates.

use crate::core::Dataset;

/// Builds a dataset with a single gender column.
pub fn gender_dataset(column: &str, values: &[&str]) -> Dataset {
    let rows = values.iter().map(|v| vec![v.to_string()]).collect();
    Dataset::new(vec![column.to_string()], rows).expect("single-column fixture is well formed")
}

/// Builds a dataset with a single age column.
pub fn age_dataset(column: &str, values: &[&str]) -> Dataset {
    gender_dataset(column, values)
}

/// Builds a `gender`/`age` dataset from paired cells.
pub fn cohort_dataset(rows: &[(&str, &str)]) -> Dataset {
    let rows = rows
        .iter()
        .map(|(g, a)| vec![g.to_string(), a.to_string()])
        .collect();
    Dataset::new(vec!["gender".to_string(), "age".to_string()], rows)
        .expect("two-column fixture is well formed")
}

/// Builds a deterministic synthetic cohort of `size` rows.
///
/// Every `male_every`-th row is coded male (cycling through common codings),
/// the rest female; ages sweep 0..100 with every 17th cell left unparseable.
pub fn synthetic_cohort(size: usize, male_every: usize) -> Dataset {
    const MALE_CODES: [&str; 4] = ["M", "male", "1", "Male."];
    const FEMALE_CODES: [&str; 4] = ["F", "female", "0", "f."];

    let male_every = male_every.max(1);
    let rows = (0..size)
        .map(|i| {
            let gender = if i % male_every == 0 {
                MALE_CODES[i % MALE_CODES.len()]
            } else {
                FEMALE_CODES[i % FEMALE_CODES.len()]
            };
            let age = if i % 17 == 16 {
                "unknown".to_string()
            } else {
                ((i * 7) % 100).to_string()
            };
            vec![format!("P{i:06}"), gender.to_string(), age]
        })
        .collect();

    Dataset::new(
        vec![
            "patient_id".to_string(),
            "Sex".to_string(),
            "Patient_Age".to_string(),
        ],
        rows,
    )
    .expect("synthetic fixture is well formed")
}
