//! # cohort-bias - Demographic bias reporting for study datasets
//!
//! cohort-bias inspects a tabular dataset (typically a clinical or research
//! cohort) and reports how balanced it is by gender and how its ages are
//! distributed. It locates the relevant columns by name, normalizes the many
//! ways gender tends to be coded, scores the imbalance and summarizes ages
//! into fixed bands.
//!
//! ## Quick Start
//!
//! ```rust
//! use cohort_bias::prelude::*;
//!
//! # fn main() -> cohort_bias::Result<()> {
//! let csv = "Sex,Patient_Age\nM,71\nmale,24\nF,33\n1,n/a\n";
//! let dataset = CsvSource::from_bytes(csv.as_bytes().to_vec()).load()?;
//!
//! let report = AnalysisRunner::new().run(&dataset)?;
//! assert_eq!(report.gender.used_column, "Sex");
//! assert_eq!(report.gender.male_count, 3);
//! assert_eq!(report.bias_label(), BiasLabel::HighlyImbalanced);
//!
//! let age = report.age.as_ref().unwrap();
//! assert_eq!(age.total_valid, 3);
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. **Decode**: a [`sources::DataSource`] materializes the input into a
//!    [`core::Dataset`]
//! 2. **Resolve**: gender and age columns are matched case-insensitively
//!    against prioritized alias lists ([`analyzers::ColumnAliases`])
//! 3. **Analyze**: gender values are normalized and scored; ages are parsed,
//!    summarized and banded. A missing gender column is an error, a missing
//!    or unusable age column only drops the age section
//! 4. **Report**: the [`core::AnalysisReport`] serializes to JSON and can be
//!    rendered by the [`formatters`]
//!
//! Optionally, the [`insight`] module asks an OpenAI-compatible chat model to
//! comment on the computed statistics. A failing model never loses the report.
//!
//! ## Architecture
//!
//! - **`analyzers`**: column resolution, gender and age analyzers, the runner
//! - **`core`**: `Dataset` and `AnalysisReport`
//! - **`sources`**: CSV decoding
//! - **`formatters`**: JSON, console and Markdown output
//! - **`insight`**: narrative commentary through a chat-completions API
//! - **`logging`**: `tracing` configuration helpers

pub mod analyzers;
pub mod core;
pub mod error;
pub mod formatters;
pub mod insight;
pub mod logging;
pub mod prelude;
pub mod security;
pub mod sources;

pub use error::{BiasError, Result};

#[cfg(any(test, feature = "test-utils"))]
pub mod test_fixtures;
