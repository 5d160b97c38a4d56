//! Combining a computed report with an optional narrative insight.

use async_trait::async_trait;
use serde::Serialize;
use tracing::{info, instrument, warn};

use super::InsightResult;
use super::InsightError;
use crate::analyzers::AnalysisRunner;
use crate::core::{AnalysisReport, Dataset};
use crate::error::Result;

/// Produces a natural-language commentary for a computed report.
#[async_trait]
pub trait InsightGenerator: Send + Sync {
    /// Generates commentary for `report`.
    async fn generate(&self, report: &AnalysisReport) -> InsightResult<String>;
}

/// What happened when an insight was requested.
#[derive(Debug)]
pub enum InsightOutcome {
    Generated(String),
    Failed(InsightError),
    Skipped,
}

impl InsightOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            InsightOutcome::Generated(text) => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&InsightError> {
        match self {
            InsightOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// A report together with the outcome of the insight request.
///
/// Serializes as the report's fields plus `insight` when one was generated or
/// `insight_error` when generation failed.
#[derive(Debug, Serialize)]
pub struct AnalysisWithInsight {
    #[serde(flatten)]
    pub report: AnalysisReport,
    #[serde(skip)]
    pub outcome: InsightOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    insight: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    insight_error: Option<String>,
}

impl AnalysisWithInsight {
    pub fn new(report: AnalysisReport, outcome: InsightOutcome) -> Self {
        let insight = outcome.text().map(str::to_string);
        let insight_error = outcome.error().map(ToString::to_string);
        Self {
            report,
            outcome,
            insight,
            insight_error,
        }
    }

    pub fn insight(&self) -> Option<&str> {
        self.insight.as_deref()
    }

    pub fn insight_error(&self) -> Option<&str> {
        self.insight_error.as_deref()
    }
}

/// Runs the analysis and, when a generator is given, asks it for commentary.
///
/// Analysis errors are returned as-is. A failing generator never discards the
/// computed statistics: the failure is recorded in the outcome instead.
#[instrument(skip_all, fields(rows = dataset.len(), insight = generator.is_some()))]
pub async fn analyze_with_insight(
    runner: &AnalysisRunner,
    dataset: &Dataset,
    generator: Option<&dyn InsightGenerator>,
) -> Result<AnalysisWithInsight> {
    let report = runner.run(dataset)?;

    let outcome = match generator {
        None => InsightOutcome::Skipped,
        Some(generator) => match generator.generate(&report).await {
            Ok(text) => {
                info!(chars = text.len(), "Insight attached to report");
                InsightOutcome::Generated(text)
            }
            Err(e) => {
                warn!(error = %e, "Insight generation failed; returning statistics only");
                InsightOutcome::Failed(e)
            }
        },
    };

    Ok(AnalysisWithInsight::new(report, outcome))
}
