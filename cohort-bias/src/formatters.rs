//! Report formatting for cohort bias analyses.
//!
//! This module renders an [`AnalysisReport`] as JSON, human-readable console
//! text, or Markdown. [`summary_text`] produces the compact numeric summary
//! that is also handed to insight generators.
//!
//! # Examples
//!
//! ```rust
//! use cohort_bias::analyzers::AnalysisRunner;
//! use cohort_bias::core::Dataset;
//! use cohort_bias::formatters::{HumanFormatter, ReportFormatter, FormatterConfig};
//!
//! let data = Dataset::new(
//!     vec!["sex".to_string()],
//!     vec![vec!["M".to_string()], vec!["F".to_string()]],
//! )
//! .unwrap();
//! let report = AnalysisRunner::new().run(&data).unwrap();
//!
//! let output = HumanFormatter::with_config(FormatterConfig::minimal())
//!     .format(&report)
//!     .unwrap();
//! assert!(output.contains("Balanced"));
//! ```

use std::fmt::{self, Write};

use crate::analyzers::{AgeBand, AgeGroup, AgeReport, BiasLabel, GenderReport};
use crate::core::AnalysisReport;
use crate::error::{BiasError, Result};
use crate::insight::AnalysisWithInsight;

/// Configuration options for formatting reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the raw and normalized gender value lists
    pub include_raw_values: bool,
    /// Include age bands with no members
    pub include_empty_bands: bool,
    /// Whether to use colorized output (for human formatter)
    pub use_colors: bool,
    /// Whether to include timestamps in output
    pub include_timestamps: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_raw_values: true,
            include_empty_bands: true,
            use_colors: true,
            include_timestamps: true,
        }
    }
}

impl FormatterConfig {
    /// Creates a minimal configuration showing only the statistics.
    pub fn minimal() -> Self {
        Self {
            include_raw_values: false,
            include_empty_bands: false,
            use_colors: false,
            include_timestamps: false,
        }
    }

    /// Creates a detailed configuration showing everything.
    pub fn detailed() -> Self {
        Self::default()
    }

    /// Sets whether to include the gender value lists.
    pub fn with_raw_values(mut self, include: bool) -> Self {
        self.include_raw_values = include;
        self
    }

    /// Sets whether to include empty age bands.
    pub fn with_empty_bands(mut self, include: bool) -> Self {
        self.include_empty_bands = include;
        self
    }

    /// Sets whether to use colorized output.
    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }

    /// Sets whether to include a generation timestamp.
    pub fn with_timestamps(mut self, include: bool) -> Self {
        self.include_timestamps = include;
        self
    }

    fn bands<'a>(&self, age: &'a AgeReport) -> Vec<(&'a AgeBand, &'a AgeGroup)> {
        if self.include_empty_bands {
            age.age_groups.iter().collect()
        } else {
            age.non_empty_groups().collect()
        }
    }
}

/// Trait for rendering analysis reports into an output format.
///
/// # Examples
///
/// ```rust
/// use cohort_bias::core::AnalysisReport;
/// use cohort_bias::formatters::ReportFormatter;
///
/// struct LabelOnly;
///
/// impl ReportFormatter for LabelOnly {
///     fn format(&self, report: &AnalysisReport) -> cohort_bias::Result<String> {
///         Ok(report.bias_label().to_string())
///     }
/// }
/// ```
pub trait ReportFormatter {
    /// Formats a report into a string representation.
    fn format(&self, report: &AnalysisReport) -> Result<String>;

    /// Formats a report with custom configuration.
    fn format_with_config(
        &self,
        report: &AnalysisReport,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(report)
    }

    /// Formats a report together with its insight outcome.
    ///
    /// The default appends the insight (or the reason it is missing) after the
    /// formatted report.
    fn format_with_insight(&self, result: &AnalysisWithInsight) -> Result<String> {
        let mut output = self.format(&result.report)?;
        if let Some(text) = result.insight() {
            output.push_str("\nInsight:\n");
            output.push_str(text);
            output.push('\n');
        } else if let Some(error) = result.insight_error() {
            output.push_str("\nInsight unavailable: ");
            output.push_str(error);
            output.push('\n');
        }
        Ok(output)
    }
}

fn render_error(e: fmt::Error) -> BiasError {
    BiasError::Internal(format!("Failed to render report: {e}"))
}

fn percent(value: f64, decimals: usize) -> String {
    format!("{value:.decimals$}%")
}

/// Renders the numeric summary of a report as plain text.
///
/// Gender percentages carry two decimals and band percentages one; empty age
/// bands are omitted.
pub fn summary_text(report: &AnalysisReport) -> String {
    let mut output = String::new();
    // Writing to a String cannot fail.
    let _ = write_summary(&mut output, report);
    output
}

fn write_summary(out: &mut String, report: &AnalysisReport) -> fmt::Result {
    let gender = &report.gender;
    writeln!(out, "Gender column: {}", gender.used_column)?;
    writeln!(
        out,
        "Male: {} ({})",
        gender.male_count,
        percent(gender.male_percent, 2)
    )?;
    writeln!(
        out,
        "Female: {} ({})",
        gender.female_count,
        percent(gender.female_percent, 2)
    )?;
    writeln!(out, "Total: {}", gender.total)?;
    writeln!(
        out,
        "Bias score: {:.2} ({})",
        gender.bias_score, gender.bias_label
    )?;

    if let Some(age) = &report.age {
        writeln!(out)?;
        writeln!(out, "Age column: {}", age.used_column)?;
        writeln!(out, "Valid ages: {}", age.total_valid)?;
        writeln!(
            out,
            "Mean: {:.1}, median: {:.1}, range: {}-{}",
            age.mean_age, age.median_age, age.min_age, age.max_age
        )?;
        if let Some(sd) = age.std_dev {
            writeln!(out, "Standard deviation: {sd:.1}")?;
        }
        writeln!(out, "Age groups:")?;
        for (band, group) in age.non_empty_groups() {
            writeln!(out, "{band}: {} ({})", group.count, percent(group.percent, 1))?;
        }
    }
    Ok(())
}

/// Formats reports as structured JSON.
///
/// The output has the same shape as the report's serde representation, so it
/// can be consumed by other tools. With [`FormatterConfig::include_raw_values`]
/// off, the value lists are emptied.
///
/// # Examples
///
/// ```rust
/// use cohort_bias::formatters::{JsonFormatter, ReportFormatter};
/// # use cohort_bias::analyzers::AnalysisRunner;
/// # use cohort_bias::core::Dataset;
/// # let data = Dataset::new(vec!["g".to_string()], vec![vec!["m".to_string()]]).unwrap();
/// # let report = AnalysisRunner::new().run(&data).unwrap();
///
/// let json = JsonFormatter::new().with_pretty(false).format(&report).unwrap();
/// assert!(json.starts_with('{'));
/// ```
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    config: FormatterConfig,
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a new JSON formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            pretty: true,
        }
    }

    /// Creates a new JSON formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            pretty: true,
        }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    fn to_json<T: serde::Serialize>(&self, value: &T) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        json.map_err(|e| BiasError::Serialization(format!("Failed to serialize report: {e}")))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for JsonFormatter {
    fn format(&self, report: &AnalysisReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &AnalysisReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        if config.include_raw_values {
            self.to_json(report)
        } else {
            self.to_json(&without_value_lists(report))
        }
    }

    fn format_with_insight(&self, result: &AnalysisWithInsight) -> Result<String> {
        if self.config.include_raw_values {
            return self.to_json(result);
        }
        let report = without_value_lists(&result.report);
        self.to_json(&InsightJson {
            report: &report,
            insight: result.insight(),
            insight_error: result.insight_error(),
        })
    }
}

/// Borrowed serialization shape of [`AnalysisWithInsight`].
#[derive(serde::Serialize)]
struct InsightJson<'a> {
    #[serde(flatten)]
    report: &'a AnalysisReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    insight: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    insight_error: Option<&'a str>,
}

fn without_value_lists(report: &AnalysisReport) -> AnalysisReport {
    let mut trimmed = report.clone();
    trimmed.gender.raw_unique_values.clear();
    trimmed.gender.normalized_unique_values.clear();
    trimmed
}

/// Formats reports for console output.
///
/// # Examples
///
/// ```rust
/// use cohort_bias::formatters::{HumanFormatter, ReportFormatter};
/// # use cohort_bias::analyzers::AnalysisRunner;
/// # use cohort_bias::core::Dataset;
/// # let data = Dataset::new(vec!["g".to_string()], vec![vec!["m".to_string()]]).unwrap();
/// # let report = AnalysisRunner::new().run(&data).unwrap();
///
/// let text = HumanFormatter::new().format(&report).unwrap();
/// println!("{text}");
/// ```
#[derive(Debug, Clone)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    /// Creates a new human formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
        }
    }

    /// Creates a new human formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn render(
        &self,
        out: &mut String,
        report: &AnalysisReport,
        config: &FormatterConfig,
    ) -> fmt::Result {
        let gender = &report.gender;

        writeln!(out)?;
        writeln!(out, "Cohort demographic report")?;
        if config.include_timestamps {
            writeln!(out, "Generated: {}", chrono::Utc::now().to_rfc3339())?;
        }

        writeln!(out)?;
        writeln!(out, "Gender (column '{}'):", gender.used_column)?;
        writeln!(
            out,
            "   Male:   {:>6} ({})",
            gender.male_count,
            percent(gender.male_percent, 2)
        )?;
        writeln!(
            out,
            "   Female: {:>6} ({})",
            gender.female_count,
            percent(gender.female_percent, 2)
        )?;
        writeln!(out, "   Total:  {:>6}", gender.total)?;
        writeln!(
            out,
            "   Bias score: {:.2} {}",
            gender.bias_score,
            colored_label(gender.bias_label, config.use_colors)
        )?;

        if config.include_raw_values {
            writeln!(out, "   Raw values: {}", gender.raw_unique_values.join(", "))?;
            writeln!(
                out,
                "   Normalized values: {}",
                gender.normalized_unique_values.join(", ")
            )?;
        }

        writeln!(out)?;
        match &report.age {
            Some(age) => {
                writeln!(out, "Age (column '{}'):", age.used_column)?;
                writeln!(out, "   Valid ages: {}", age.total_valid)?;
                writeln!(
                    out,
                    "   Mean {:.1} / median {:.1} / range {}-{}",
                    age.mean_age, age.median_age, age.min_age, age.max_age
                )?;
                match age.std_dev {
                    Some(sd) => writeln!(out, "   Std dev: {sd:.1}")?,
                    None => writeln!(out, "   Std dev: n/a")?,
                }
                for (band, group) in config.bands(age) {
                    writeln!(
                        out,
                        "   {:<9} {:>6} ({})",
                        band.label(),
                        group.count,
                        percent(group.percent, 1)
                    )?;
                }
            }
            None => writeln!(out, "Age: no usable age column")?,
        }

        writeln!(out)?;
        Ok(())
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for HumanFormatter {
    fn format(&self, report: &AnalysisReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &AnalysisReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        self.render(&mut output, report, config).map_err(render_error)?;
        Ok(output)
    }
}

fn colored_label(label: BiasLabel, use_colors: bool) -> String {
    if !use_colors {
        return label.to_string();
    }
    let color = match label {
        BiasLabel::Balanced => "32",
        BiasLabel::MildlyImbalanced => "33",
        BiasLabel::SignificantlyImbalanced => "35",
        BiasLabel::HighlyImbalanced => "31",
    };
    format!("\x1b[{color}m{label}\x1b[0m")
}

/// Formats reports as Markdown suitable for documentation.
///
/// # Examples
///
/// ```rust
/// use cohort_bias::formatters::{MarkdownFormatter, ReportFormatter};
/// # use cohort_bias::analyzers::AnalysisRunner;
/// # use cohort_bias::core::Dataset;
/// # let data = Dataset::new(vec!["g".to_string()], vec![vec!["m".to_string()]]).unwrap();
/// # let report = AnalysisRunner::new().run(&data).unwrap();
///
/// let markdown = MarkdownFormatter::new().with_heading_level(1).format(&report).unwrap();
/// assert!(markdown.starts_with("# "));
/// ```
#[derive(Debug, Clone)]
pub struct MarkdownFormatter {
    config: FormatterConfig,
    heading_level: u8,
}

impl MarkdownFormatter {
    /// Creates a new Markdown formatter with default configuration.
    pub fn new() -> Self {
        Self {
            config: FormatterConfig::default(),
            heading_level: 2,
        }
    }

    /// Creates a new Markdown formatter with the specified configuration.
    pub fn with_config(config: FormatterConfig) -> Self {
        Self {
            config,
            heading_level: 2,
        }
    }

    /// Sets the base heading level (1-6).
    pub fn with_heading_level(mut self, level: u8) -> Self {
        self.heading_level = level.clamp(1, 6);
        self
    }

    fn render(
        &self,
        out: &mut String,
        report: &AnalysisReport,
        config: &FormatterConfig,
    ) -> fmt::Result {
        let h = "#".repeat(self.heading_level as usize);
        let sub = "#".repeat((self.heading_level + 1).min(6) as usize);

        writeln!(out, "{h} Cohort Demographic Report")?;
        writeln!(out)?;
        if config.include_timestamps {
            writeln!(out, "*Generated {}*", chrono::Utc::now().to_rfc3339())?;
            writeln!(out)?;
        }

        write_gender_markdown(out, &report.gender, &sub, config)?;

        writeln!(out)?;
        writeln!(out, "{sub} Age")?;
        writeln!(out)?;
        match &report.age {
            Some(age) => {
                writeln!(
                    out,
                    "Column `{}`, {} valid ages. Mean {:.1}, median {:.1}, range {}-{}, standard deviation {}.",
                    age.used_column,
                    age.total_valid,
                    age.mean_age,
                    age.median_age,
                    age.min_age,
                    age.max_age,
                    age.std_dev
                        .map(|sd| format!("{sd:.1}"))
                        .unwrap_or_else(|| "n/a".to_string())
                )?;
                writeln!(out)?;
                writeln!(out, "| Band | Count | Percent |")?;
                writeln!(out, "|------|------:|--------:|")?;
                for (band, group) in config.bands(age) {
                    writeln!(
                        out,
                        "| {band} | {} | {} |",
                        group.count,
                        percent(group.percent, 1)
                    )?;
                }
            }
            None => writeln!(out, "No usable age column.")?,
        }
        Ok(())
    }
}

fn write_gender_markdown(
    out: &mut String,
    gender: &GenderReport,
    heading: &str,
    config: &FormatterConfig,
) -> fmt::Result {
    writeln!(out, "{heading} Gender")?;
    writeln!(out)?;
    writeln!(
        out,
        "Column `{}`: **{}** (bias score {:.2}).",
        gender.used_column, gender.bias_label, gender.bias_score
    )?;
    writeln!(out)?;
    writeln!(out, "| Category | Count | Percent |")?;
    writeln!(out, "|----------|------:|--------:|")?;
    writeln!(
        out,
        "| Male | {} | {} |",
        gender.male_count,
        percent(gender.male_percent, 2)
    )?;
    writeln!(
        out,
        "| Female | {} | {} |",
        gender.female_count,
        percent(gender.female_percent, 2)
    )?;
    writeln!(out, "| **Total** | {} | |", gender.total)?;

    if config.include_raw_values {
        writeln!(out)?;
        writeln!(out, "Raw values: {}", code_list(&gender.raw_unique_values))?;
        writeln!(out)?;
        writeln!(
            out,
            "Normalized values: {}",
            code_list(&gender.normalized_unique_values)
        )?;
    }
    Ok(())
}

fn code_list(values: &[String]) -> String {
    values
        .iter()
        .map(|v| format!("`{v}`"))
        .collect::<Vec<_>>()
        .join(", ")
}

impl Default for MarkdownFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportFormatter for MarkdownFormatter {
    fn format(&self, report: &AnalysisReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &AnalysisReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        self.render(&mut output, report, config).map_err(render_error)?;
        Ok(output)
    }
}
