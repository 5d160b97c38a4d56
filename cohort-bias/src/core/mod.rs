//! Core types: the in-memory dataset and the assembled report.

pub mod dataset;
pub mod report;

pub use dataset::{Dataset, Record};
pub use report::AnalysisReport;
