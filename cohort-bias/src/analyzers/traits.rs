//! Core analyzer traits.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

use super::errors::AnalyzerResult;
use crate::core::Dataset;

/// Core trait for analyzers that compute a report section from a dataset.
///
/// Computation is split in two steps: a single pass over the data that
/// produces a serializable [`AnalyzerState`], and a pure transformation of that
/// state into the final metric. Analyzers hold only their configuration, so one
/// instance can serve concurrent requests.
///
/// # Example
///
/// ```rust
/// use cohort_bias::analyzers::{Analyzer, AnalyzerResult, AnalyzerState};
/// use cohort_bias::core::Dataset;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, Serialize, Deserialize)]
/// struct SizeState {
///     count: usize,
/// }
///
/// impl AnalyzerState for SizeState {}
///
/// #[derive(Debug)]
/// struct SizeAnalyzer;
///
/// impl Analyzer for SizeAnalyzer {
///     type State = SizeState;
///     type Metric = usize;
///
///     fn compute_state_from_data(&self, data: &Dataset) -> AnalyzerResult<SizeState> {
///         Ok(SizeState { count: data.len() })
///     }
///
///     fn compute_metric_from_state(&self, state: &SizeState) -> AnalyzerResult<usize> {
///         Ok(state.count)
///     }
///
///     fn name(&self) -> &str {
///         "size"
///     }
/// }
///
/// let data = Dataset::with_columns(["gender"]).unwrap();
/// assert_eq!(SizeAnalyzer.analyze(&data).unwrap(), 0);
/// ```
pub trait Analyzer: Send + Sync + Debug {
    /// The intermediate state produced by the data pass.
    type State: AnalyzerState;

    /// The value produced by this analyzer.
    type Metric: Send + Sync + Debug;

    /// Computes the state from the input data.
    fn compute_state_from_data(&self, data: &Dataset) -> AnalyzerResult<Self::State>;

    /// Computes the final metric from the state.
    fn compute_metric_from_state(&self, state: &Self::State) -> AnalyzerResult<Self::Metric>;

    /// Runs both steps.
    fn analyze(&self, data: &Dataset) -> AnalyzerResult<Self::Metric> {
        let state = self.compute_state_from_data(data)?;
        self.compute_metric_from_state(&state)
    }

    /// Returns the name of this analyzer.
    fn name(&self) -> &str;

    /// Returns a description of what this analyzer computes.
    fn description(&self) -> &str {
        ""
    }

    /// Returns the column(s) this analyzer operates on, if any.
    fn columns(&self) -> Vec<&str> {
        vec![]
    }
}

/// Trait for analyzer state.
///
/// States are serializable so they can be logged or cached by callers.
pub trait AnalyzerState:
    Clone + Send + Sync + Debug + Serialize + for<'de> Deserialize<'de>
{
    /// Returns whether this state represents an empty computation.
    fn is_empty(&self) -> bool {
        false
    }
}
