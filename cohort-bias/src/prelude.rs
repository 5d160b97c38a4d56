//! Prelude for commonly used types and traits in cohort-bias.

pub use crate::analyzers::{AnalysisRunner, BiasLabel, ColumnAliases, SemanticField};
pub use crate::core::{AnalysisReport, Dataset};
pub use crate::error::{BiasError, Result};
pub use crate::formatters::{FormatterConfig, ReportFormatter};
pub use crate::insight::{analyze_with_insight, InsightGenerator, InsightOutcome};
pub use crate::logging::LogConfig;
pub use crate::sources::{CsvSource, DataSource};
