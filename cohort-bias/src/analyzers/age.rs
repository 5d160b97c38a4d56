//! Age distribution: summary statistics and fixed age bands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, instrument};

use super::schema::SemanticField;
use super::{round_to, Analyzer, AnalyzerError, AnalyzerResult, AnalyzerState};
use crate::core::Dataset;

/// Ages at or above this bound are out of range.
pub const MAX_AGE: f64 = 120.0;

/// One of the five fixed, half-open age ranges.
///
/// Ordering follows the ranges, so a `BTreeMap<AgeBand, _>` iterates youngest
/// first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "Under 18")]
    Under18,
    #[serde(rename = "18-34")]
    From18To34,
    #[serde(rename = "35-49")]
    From35To49,
    #[serde(rename = "50-64")]
    From50To64,
    #[serde(rename = "65+")]
    Over65,
}

impl AgeBand {
    /// All bands in ascending order.
    pub const ALL: [AgeBand; 5] = [
        AgeBand::Under18,
        AgeBand::From18To34,
        AgeBand::From35To49,
        AgeBand::From50To64,
        AgeBand::Over65,
    ];

    /// Inclusive lower and exclusive upper bound.
    pub fn bounds(&self) -> (f64, f64) {
        match self {
            AgeBand::Under18 => (0.0, 18.0),
            AgeBand::From18To34 => (18.0, 35.0),
            AgeBand::From35To49 => (35.0, 50.0),
            AgeBand::From50To64 => (50.0, 65.0),
            AgeBand::Over65 => (65.0, MAX_AGE),
        }
    }

    /// Whether `age` falls in `[lower, upper)`.
    pub fn contains(&self, age: f64) -> bool {
        let (lower, upper) = self.bounds();
        age >= lower && age < upper
    }

    /// The band containing `age`, if it is in range.
    pub fn for_age(age: f64) -> Option<AgeBand> {
        Self::ALL.into_iter().find(|band| band.contains(age))
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            AgeBand::Under18 => "Under 18",
            AgeBand::From18To34 => "18-34",
            AgeBand::From35To49 => "35-49",
            AgeBand::From50To64 => "50-64",
            AgeBand::Over65 => "65+",
        }
    }
}

impl fmt::Display for AgeBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Member count and share of one age band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgeGroup {
    pub count: u64,
    /// Share of `total_valid`, rounded to 1 decimal.
    pub percent: f64,
}

/// Age section of the analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeReport {
    pub used_column: String,
    pub mean_age: f64,
    pub median_age: f64,
    pub min_age: i64,
    pub max_age: i64,
    /// Sample standard deviation; `None` with fewer than two ages.
    pub std_dev: Option<f64>,
    pub total_valid: u64,
    /// Every band, including empty ones.
    pub age_groups: BTreeMap<AgeBand, AgeGroup>,
}

impl AgeReport {
    /// Bands that have at least one member.
    pub fn non_empty_groups(&self) -> impl Iterator<Item = (&AgeBand, &AgeGroup)> {
        self.age_groups.iter().filter(|(_, group)| group.count > 0)
    }
}

/// State for the age distribution analyzer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgeState {
    /// Column the ages came from; `None` when unresolved.
    pub column: Option<String>,
    /// Valid ages in row order.
    pub ages: Vec<f64>,
    /// Cells that were not a usable age.
    pub dropped: u64,
}

impl AgeState {
    fn median(&self) -> Option<f64> {
        if self.ages.is_empty() {
            return None;
        }
        let mut sorted = self.ages.clone();
        sorted.sort_by(f64::total_cmp);
        let mid = sorted.len() / 2;
        if sorted.len() % 2 == 0 {
            Some((sorted[mid - 1] + sorted[mid]) / 2.0)
        } else {
            Some(sorted[mid])
        }
    }

    fn mean(&self) -> Option<f64> {
        if self.ages.is_empty() {
            None
        } else {
            Some(self.ages.iter().sum::<f64>() / self.ages.len() as f64)
        }
    }

    /// Sample standard deviation (n - 1 denominator).
    fn sample_std_dev(&self) -> Option<f64> {
        if self.ages.len() < 2 {
            return None;
        }
        let mean = self.mean()?;
        let squared: f64 = self.ages.iter().map(|a| (a - mean) * (a - mean)).sum();
        Some((squared / (self.ages.len() - 1) as f64).sqrt())
    }
}

impl AnalyzerState for AgeState {
    fn is_empty(&self) -> bool {
        self.ages.is_empty()
    }
}

/// Parses one cell as an age.
///
/// Unparseable, non-finite and out-of-range cells yield `None`.
pub fn parse_age(raw: &str) -> Option<f64> {
    let age: f64 = raw.trim().parse().ok()?;
    (age.is_finite() && (0.0..MAX_AGE).contains(&age)).then_some(age)
}

/// Analyzer that summarizes ages and buckets them into [`AgeBand`]s.
///
/// Age analysis is best-effort: an unresolved column or a column without a
/// single usable age yields `None` instead of an error.
#[derive(Debug, Clone)]
pub struct AgeDistributionAnalyzer {
    column: Option<String>,
}

impl AgeDistributionAnalyzer {
    /// Creates an analyzer over a resolved (or unresolved) column.
    pub fn new(column: Option<String>) -> Self {
        Self { column }
    }

    /// Returns the column being analyzed.
    pub fn column(&self) -> Option<&str> {
        self.column.as_deref()
    }
}

impl Analyzer for AgeDistributionAnalyzer {
    type State = AgeState;
    type Metric = Option<AgeReport>;

    #[instrument(skip(self, data), fields(analyzer = "age_distribution", column = ?self.column, rows = data.len()))]
    fn compute_state_from_data(&self, data: &Dataset) -> AnalyzerResult<Self::State> {
        let Some(column) = self.column.as_deref() else {
            return Ok(AgeState::default());
        };

        let values = data
            .column_values(column)
            .ok_or_else(|| AnalyzerError::ColumnNotFound {
                field: SemanticField::Age,
                column: column.to_string(),
                available_columns: data.columns().to_vec(),
            })?;

        let mut state = AgeState {
            column: Some(column.to_string()),
            ..Default::default()
        };
        for raw in values {
            match parse_age(raw) {
                Some(age) => state.ages.push(age),
                None => state.dropped += 1,
            }
        }

        debug!(valid = state.ages.len(), dropped = state.dropped, "parsed ages");
        Ok(state)
    }

    fn compute_metric_from_state(&self, state: &Self::State) -> AnalyzerResult<Self::Metric> {
        let Some(column) = state.column.clone() else {
            return Ok(None);
        };
        if state.is_empty() {
            return Ok(None);
        }

        let mut counts: BTreeMap<AgeBand, u64> = AgeBand::ALL.iter().map(|b| (*b, 0)).collect();
        for age in &state.ages {
            let band = AgeBand::for_age(*age).ok_or_else(|| {
                AnalyzerError::metric_computation(format!("age {age} outside every band"))
            })?;
            *counts.entry(band).or_default() += 1;
        }

        let total_valid = state.ages.len() as u64;
        let age_groups = counts
            .into_iter()
            .map(|(band, count)| {
                let percent = round_to(count as f64 / total_valid as f64 * 100.0, 1);
                (band, AgeGroup { count, percent })
            })
            .collect();

        let min = state.ages.iter().copied().fold(f64::INFINITY, f64::min);
        let max = state.ages.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Some(AgeReport {
            used_column: column,
            mean_age: round_to(state.mean().unwrap_or_default(), 1),
            median_age: round_to(state.median().unwrap_or_default(), 1),
            min_age: min.trunc() as i64,
            max_age: max.trunc() as i64,
            std_dev: state.sample_std_dev().map(|sd| round_to(sd, 1)),
            total_valid,
            age_groups,
        }))
    }

    fn name(&self) -> &str {
        "age_distribution"
    }

    fn description(&self) -> &str {
        "Summarizes ages and buckets them into fixed bands"
    }

    fn columns(&self) -> Vec<&str> {
        self.column.as_deref().into_iter().collect()
    }
}
