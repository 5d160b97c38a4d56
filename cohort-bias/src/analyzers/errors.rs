//! Error types for the analyzer framework.

use thiserror::Error;

use super::schema::SemanticField;

/// Result type for analyzer operations.
pub type AnalyzerResult<T> = Result<T, AnalyzerError>;

/// Errors that can occur during analyzer operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyzerError {
    /// No alias of the field matched any dataset column.
    #[error("No {field} column found. Accepted column names: {}", accepted_aliases.join(", "))]
    UnresolvedColumn {
        field: SemanticField,
        accepted_aliases: Vec<String>,
        available_columns: Vec<String>,
    },

    /// The analyzer was pointed at a column the dataset does not have.
    #[error("{field} column '{column}' not found in dataset")]
    ColumnNotFound {
        field: SemanticField,
        column: String,
        available_columns: Vec<String>,
    },

    /// Error occurred while computing metric from state.
    #[error("Failed to compute metric: {0}")]
    MetricComputation(String),
}

impl AnalyzerError {
    /// Creates a metric computation error with the given message.
    pub fn metric_computation(msg: impl Into<String>) -> Self {
        Self::MetricComputation(msg.into())
    }
}
