//! The assembled per-request analysis report.

use serde::{Deserialize, Serialize};

use crate::analyzers::{AgeReport, BiasLabel, GenderReport};

/// Result of one analysis request: the gender section plus an optional age
/// section.
///
/// Gender fields serialize at the top level; the age section sits under the
/// `age_analysis` key and is omitted entirely when no usable age data exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Gender distribution and imbalance.
    #[serde(flatten)]
    pub gender: GenderReport,
    /// Age distribution, absent when no age column or no valid ages.
    #[serde(
        rename = "age_analysis",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub age: Option<AgeReport>,
}

impl AnalysisReport {
    /// Merges the two stage results into one report.
    pub fn assemble(gender: GenderReport, age: Option<AgeReport>) -> Self {
        Self { gender, age }
    }

    /// Shortcut for the gender imbalance label.
    pub fn bias_label(&self) -> BiasLabel {
        self.gender.bias_label
    }

    /// Whether the report carries an age section.
    pub fn has_age_analysis(&self) -> bool {
        self.age.is_some()
    }
}
