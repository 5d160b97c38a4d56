//! Data sources that decode raw input into a [`Dataset`].
//!
//! Decoding is kept apart from analysis: the analyzers only ever see an
//! already materialized [`Dataset`].

use std::fmt::Debug;

use crate::core::Dataset;
use crate::error::Result;

mod csv;

pub use self::csv::{CsvInput, CsvOptions, CsvSource};

/// A source of tabular records.
///
/// # Examples
///
/// ```rust
/// use cohort_bias::sources::{CsvSource, DataSource};
///
/// let source = CsvSource::from_bytes(b"gender,age\nF,34\nM,51\n".to_vec());
/// let data = source.load().unwrap();
/// assert_eq!(data.len(), 2);
/// ```
pub trait DataSource: Debug + Send + Sync {
    /// Decodes the whole input into memory.
    fn load(&self) -> Result<Dataset>;

    /// Returns a human-readable description of this data source.
    fn description(&self) -> String;
}
