//! Error types for the cohort-bias library.
//!
//! All failures a caller can observe from an analysis request are represented
//! by the [`BiasError`] enum. Stage-level errors ([`AnalyzerError`]) and
//! collaborator errors ([`InsightError`]) convert into it.
//!
//! [`AnalyzerError`]: crate::analyzers::AnalyzerError
//! [`InsightError`]: crate::insight::InsightError

use thiserror::Error;

use crate::analyzers::{AnalyzerError, SemanticField};
use crate::insight::InsightError;

/// The main error type for the cohort-bias library.
#[derive(Error, Debug)]
pub enum BiasError {
    /// A required column could not be resolved from the dataset's column set.
    #[error(
        "No {field} column found. Accepted column names: {}",
        accepted_aliases.join(", ")
    )]
    Schema {
        /// The semantic field that could not be resolved
        field: SemanticField,
        /// Alias list that was searched, in priority order
        accepted_aliases: Vec<String>,
        /// Columns the dataset actually has
        available_columns: Vec<String>,
    },

    /// The input could not be decoded into records.
    #[error("Malformed input: {message}")]
    MalformedInput {
        /// Detailed error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The insight-generation collaborator failed.
    #[error("Insight generation failed: {0}")]
    Collaborator(#[from] InsightError),

    /// Error from I/O operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error related to configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, BiasError>`.
pub type Result<T> = std::result::Result<T, BiasError>;

impl BiasError {
    /// Creates a malformed input error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a malformed input error with a source error.
    pub fn malformed_with_source(
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::MalformedInput {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Returns true if the error is a schema resolution failure.
    pub fn is_schema_error(&self) -> bool {
        matches!(self, Self::Schema { .. })
    }

    /// Returns the accepted aliases for a schema error, if this is one.
    pub fn accepted_aliases(&self) -> Option<&[String]> {
        match self {
            Self::Schema {
                accepted_aliases, ..
            } => Some(accepted_aliases),
            _ => None,
        }
    }
}

impl From<AnalyzerError> for BiasError {
    fn from(err: AnalyzerError) -> Self {
        match err {
            AnalyzerError::UnresolvedColumn {
                field,
                accepted_aliases,
                available_columns,
            } => Self::Schema {
                field,
                accepted_aliases,
                available_columns,
            },
            AnalyzerError::ColumnNotFound {
                field,
                column,
                available_columns,
            } => Self::Schema {
                field,
                accepted_aliases: vec![column],
                available_columns,
            },
            err @ AnalyzerError::MetricComputation(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<csv::Error> for BiasError {
    fn from(err: csv::Error) -> Self {
        let message = match err.position() {
            Some(pos) => format!("CSV parse error at line {}: {err}", pos.line()),
            None => format!("CSV parse error: {err}"),
        };
        Self::malformed_with_source(message, Box::new(err))
    }
}

impl From<serde_json::Error> for BiasError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
