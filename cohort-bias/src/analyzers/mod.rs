//! Analyzer framework for demographic bias reporting.
//!
//! The pipeline has four stages:
//!
//! - **Schema resolution** (`schema`): locates the gender and age columns
//!   through prioritized, case-insensitive alias lists
//! - **Gender bias** (`gender`): normalizes raw codings, counts categories,
//!   computes percentages and an imbalance score/label
//! - **Age distribution** (`age`): parses ages, computes summary statistics
//!   and fixed-band counts; optional
//! - **Assembly** ([`crate::core::AnalysisReport::assemble`]), driven by the
//!   [`AnalysisRunner`]
//!
//! Each analyzer computes an intermediate [`AnalyzerState`] from the data and
//! then derives its report section from that state.
//!
//! ## Example Usage
//!
//! ```rust
//! use cohort_bias::analyzers::{AnalysisRunner, BiasLabel};
//! use cohort_bias::core::Dataset;
//!
//! let rows = ["Male", "female", "M", "F", "1", "0", "male.", "unknown"]
//!     .iter()
//!     .map(|v| vec![v.to_string()])
//!     .collect();
//! let data = Dataset::new(vec!["gender".to_string()], rows).unwrap();
//!
//! let report = AnalysisRunner::new().run(&data).unwrap();
//! assert_eq!(report.gender.male_count, 4);
//! assert_eq!(report.gender.female_count, 3);
//! assert_eq!(report.gender.bias_label, BiasLabel::MildlyImbalanced);
//! assert!(report.age.is_none());
//! ```

pub mod age;
pub mod errors;
pub mod gender;
pub mod runner;
pub mod schema;
pub mod traits;

pub use age::{parse_age, AgeBand, AgeDistributionAnalyzer, AgeGroup, AgeReport, AgeState};
pub use errors::{AnalyzerError, AnalyzerResult};
pub use gender::{
    normalize_gender, BiasLabel, GenderBiasAnalyzer, GenderCategory, GenderReport, GenderState,
};
pub use runner::AnalysisRunner;
pub use schema::{
    resolve_column, ColumnAliases, ColumnResolver, SemanticField, DEFAULT_AGE_ALIASES,
    DEFAULT_GENDER_ALIASES,
};
pub use traits::{Analyzer, AnalyzerState};

/// Rounds to `decimals` places, resolving exact ties to the even digit.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round_ties_even() / factor
}
