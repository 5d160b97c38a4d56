//! Orchestration of the resolve → analyze → assemble pipeline.

use std::time::Instant;
use tracing::{debug, info, instrument, warn};

use super::age::AgeDistributionAnalyzer;
use super::gender::GenderBiasAnalyzer;
use super::schema::{ColumnAliases, ColumnResolver, SemanticField};
use super::Analyzer;
use crate::core::{AnalysisReport, Dataset};
use crate::error::Result;
use crate::logging::{truncate_field, LogConfig};

/// Runs the full bias analysis for one dataset.
///
/// The runner holds only configuration; every call to [`AnalysisRunner::run`]
/// works on its own input and allocates its own output, so a single runner can
/// be shared across threads.
///
/// # Example
///
/// ```rust
/// use cohort_bias::analyzers::AnalysisRunner;
/// use cohort_bias::core::Dataset;
///
/// let data = Dataset::new(
///     vec!["Gender".to_string(), "Age".to_string()],
///     vec![
///         vec!["F".to_string(), "34".to_string()],
///         vec!["m".to_string(), "n/a".to_string()],
///     ],
/// )
/// .unwrap();
///
/// let report = AnalysisRunner::new().run(&data).unwrap();
/// assert_eq!(report.gender.used_column, "Gender");
/// assert_eq!(report.age.unwrap().total_valid, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct AnalysisRunner {
    resolver: ColumnResolver,
    log_config: LogConfig,
}

impl AnalysisRunner {
    /// Creates a runner with the default alias lists.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses custom alias lists for column resolution.
    pub fn with_aliases(mut self, aliases: ColumnAliases) -> Self {
        self.resolver = ColumnResolver::new(aliases);
        self
    }

    /// Sets the logging configuration.
    pub fn with_log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// The alias lists in use.
    pub fn aliases(&self) -> &ColumnAliases {
        self.resolver.aliases()
    }

    /// Runs gender and age analysis and assembles the report.
    ///
    /// Fails only when the gender section fails; any age failure degrades to
    /// an absent age section.
    #[instrument(skip(self, data), fields(rows = data.len(), columns = data.columns().len()))]
    pub fn run(&self, data: &Dataset) -> Result<AnalysisReport> {
        let started = Instant::now();

        let gender_column = self.resolver.resolve(data, SemanticField::Gender);
        let age_column = self.resolver.resolve(data, SemanticField::Age);
        crate::log_data_op!(
            self.log_config,
            gender_column = ?gender_column,
            age_column = ?age_column,
            "Resolved demographic columns"
        );

        let gender = GenderBiasAnalyzer::new(gender_column)
            .with_aliases(self.resolver.aliases().gender.clone())
            .analyze(data)?;

        if self.log_config.value_details_enabled() {
            debug!(
                raw_values = %truncate_field(
                    &gender.raw_unique_values.join(", "),
                    self.log_config.max_field_length
                ),
                normalized_values = %truncate_field(
                    &gender.normalized_unique_values.join(", "),
                    self.log_config.max_field_length
                ),
                "gender values"
            );
        }

        let age = match AgeDistributionAnalyzer::new(age_column).analyze(data) {
            Ok(age) => age,
            Err(e) => {
                warn!("Age analysis skipped: {e}");
                None
            }
        };

        let report = AnalysisReport::assemble(gender, age);
        info!(
            bias_score = report.gender.bias_score,
            bias_label = %report.gender.bias_label,
            age_analysis = report.has_age_analysis(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Analysis completed"
        );
        Ok(report)
    }
}
