//! Gender distribution and imbalance scoring.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, instrument};

use super::schema::{SemanticField, DEFAULT_GENDER_ALIASES};
use super::{round_to, Analyzer, AnalyzerError, AnalyzerResult, AnalyzerState};
use crate::core::Dataset;

/// Canonical gender categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenderCategory {
    Male,
    Female,
    Unrecognized,
}

impl GenderCategory {
    /// Classifies an already normalized value.
    pub fn of_normalized(value: &str) -> Self {
        match value {
            "male" => GenderCategory::Male,
            "female" => GenderCategory::Female,
            _ => GenderCategory::Unrecognized,
        }
    }

    /// Normalizes and classifies a raw cell.
    pub fn classify(raw: &str) -> Self {
        Self::of_normalized(&normalize_gender(raw))
    }
}

/// Lower-cases, trims and maps common codings onto `male`/`female`.
///
/// Values outside the substitution table are returned lower-cased and
/// trimmed; they classify as [`GenderCategory::Unrecognized`].
pub fn normalize_gender(raw: &str) -> String {
    let value = raw.trim().to_lowercase();
    match value.as_str() {
        "1" | "m" | "m." | "male." => "male".to_string(),
        "0" | "f" | "f." | "female." => "female".to_string(),
        _ => value,
    }
}

/// Imbalance classification derived from the bias score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BiasLabel {
    #[serde(rename = "Balanced")]
    Balanced,
    #[serde(rename = "Mildly Imbalanced")]
    MildlyImbalanced,
    #[serde(rename = "Significantly Imbalanced")]
    SignificantlyImbalanced,
    #[serde(rename = "Highly Imbalanced")]
    HighlyImbalanced,
}

impl BiasLabel {
    /// Buckets a score; lower bounds are inclusive.
    pub fn from_score(score: f64) -> Self {
        if score < 0.05 {
            BiasLabel::Balanced
        } else if score < 0.2 {
            BiasLabel::MildlyImbalanced
        } else if score < 0.4 {
            BiasLabel::SignificantlyImbalanced
        } else {
            BiasLabel::HighlyImbalanced
        }
    }

    /// Display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            BiasLabel::Balanced => "Balanced",
            BiasLabel::MildlyImbalanced => "Mildly Imbalanced",
            BiasLabel::SignificantlyImbalanced => "Significantly Imbalanced",
            BiasLabel::HighlyImbalanced => "Highly Imbalanced",
        }
    }
}

impl fmt::Display for BiasLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gender section of the analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenderReport {
    /// Column the values were read from, as spelled in the dataset.
    pub used_column: String,
    #[serde(rename = "male")]
    pub male_count: u64,
    #[serde(rename = "female")]
    pub female_count: u64,
    /// `male_count + female_count`; unrecognized values are excluded.
    pub total: u64,
    pub male_percent: f64,
    pub female_percent: f64,
    /// `|male - female| / total`, rounded to 2 decimals, in `[0, 1]`.
    pub bias_score: f64,
    pub bias_label: BiasLabel,
    /// Distinct raw cells in first-appearance order.
    #[serde(rename = "raw_values")]
    pub raw_unique_values: Vec<String>,
    /// Distinct normalized values in first-appearance order.
    #[serde(rename = "normalized_values")]
    pub normalized_unique_values: Vec<String>,
}

/// State for the gender bias analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenderState {
    pub column: String,
    pub male_count: u64,
    pub female_count: u64,
    pub unrecognized_count: u64,
    pub raw_values: Vec<String>,
    pub normalized_values: Vec<String>,
}

impl AnalyzerState for GenderState {
    fn is_empty(&self) -> bool {
        self.male_count + self.female_count + self.unrecognized_count == 0
    }
}

/// Analyzer that counts canonical gender categories and scores imbalance.
///
/// # Example
///
/// ```rust
/// use cohort_bias::analyzers::{Analyzer, BiasLabel, GenderBiasAnalyzer};
/// use cohort_bias::core::Dataset;
///
/// let data = Dataset::new(
///     vec!["Sex".to_string()],
///     vec![vec!["M".to_string()], vec!["f".to_string()]],
/// )
/// .unwrap();
///
/// let report = GenderBiasAnalyzer::new(Some("Sex".to_string()))
///     .analyze(&data)
///     .unwrap();
/// assert_eq!(report.total, 2);
/// assert_eq!(report.bias_label, BiasLabel::Balanced);
/// ```
#[derive(Debug, Clone)]
pub struct GenderBiasAnalyzer {
    /// Resolved column, `None` if resolution failed.
    column: Option<String>,
    /// Aliases reported back when the column is unresolved.
    aliases: Vec<String>,
}

impl GenderBiasAnalyzer {
    /// Creates an analyzer over a resolved (or unresolved) column.
    pub fn new(column: Option<String>) -> Self {
        Self {
            column,
            aliases: DEFAULT_GENDER_ALIASES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Sets the alias list that is reported when the column is unresolved.
    pub fn with_aliases(mut self, aliases: Vec<String>) -> Self {
        self.aliases = aliases;
        self
    }

    /// Returns the column being analyzed.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }
}

impl Analyzer for GenderBiasAnalyzer {
    type State = GenderState;
    type Metric = GenderReport;

    #[instrument(skip(self, data), fields(analyzer = "gender_bias", column = ?self.column, rows = data.len()))]
    fn compute_state_from_data(&self, data: &Dataset) -> AnalyzerResult<Self::State> {
        let column = self
            .column
            .as_deref()
            .ok_or_else(|| AnalyzerError::UnresolvedColumn {
                field: SemanticField::Gender,
                accepted_aliases: self.aliases.clone(),
                available_columns: data.columns().to_vec(),
            })?;

        let values = data
            .column_values(column)
            .ok_or_else(|| AnalyzerError::ColumnNotFound {
                field: SemanticField::Gender,
                column: column.to_string(),
                available_columns: data.columns().to_vec(),
            })?;

        let mut state = GenderState {
            column: column.to_string(),
            ..Default::default()
        };
        let mut seen_raw = HashSet::new();
        let mut seen_normalized = HashSet::new();

        for raw in values {
            if seen_raw.insert(raw) {
                state.raw_values.push(raw.to_string());
            }

            let normalized = normalize_gender(raw);
            match GenderCategory::of_normalized(&normalized) {
                GenderCategory::Male => state.male_count += 1,
                GenderCategory::Female => state.female_count += 1,
                GenderCategory::Unrecognized => state.unrecognized_count += 1,
            }
            if !seen_normalized.contains(&normalized) {
                seen_normalized.insert(normalized.clone());
                state.normalized_values.push(normalized);
            }
        }

        debug!(
            male = state.male_count,
            female = state.female_count,
            unrecognized = state.unrecognized_count,
            "counted gender values"
        );
        Ok(state)
    }

    fn compute_metric_from_state(&self, state: &Self::State) -> AnalyzerResult<Self::Metric> {
        let total = state.male_count + state.female_count;

        let (male_percent, female_percent, bias_score) = if total > 0 {
            let total_f = total as f64;
            let male_percent = round_to(state.male_count as f64 / total_f * 100.0, 2);
            // Derived from the male share so the pair always sums to 100.
            let female_percent = round_to(100.0 - male_percent, 2);
            let diff = state.male_count.abs_diff(state.female_count) as f64;
            (male_percent, female_percent, round_to(diff / total_f, 2))
        } else {
            (0.0, 0.0, 0.0)
        };

        if !(0.0..=1.0).contains(&bias_score) {
            return Err(AnalyzerError::metric_computation(format!(
                "bias score {bias_score} outside [0, 1]"
            )));
        }

        Ok(GenderReport {
            used_column: state.column.clone(),
            male_count: state.male_count,
            female_count: state.female_count,
            total,
            male_percent,
            female_percent,
            bias_score,
            bias_label: BiasLabel::from_score(bias_score),
            raw_unique_values: state.raw_values.clone(),
            normalized_unique_values: state.normalized_values.clone(),
        })
    }

    fn name(&self) -> &str {
        "gender_bias"
    }

    fn description(&self) -> &str {
        "Counts canonical gender categories and scores their imbalance"
    }

    fn columns(&self) -> Vec<&str> {
        self.column.as_deref().into_iter().collect()
    }
}
