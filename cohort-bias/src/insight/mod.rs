//! Optional natural-language commentary on a computed report.
//!
//! The statistics are always computed locally. An [`InsightGenerator`] may then
//! be asked to explain them; with the `insight` feature enabled,
//! [`InsightClient`] does so through an OpenAI-compatible chat-completions API.
//! A failing generator never loses the computed report.
//!
//! ```rust,no_run
//! # #[cfg(feature = "insight")]
//! # async fn example() -> cohort_bias::Result<()> {
//! use cohort_bias::analyzers::AnalysisRunner;
//! use cohort_bias::insight::{analyze_with_insight, InsightClient, InsightConfig};
//! use cohort_bias::sources::{CsvSource, DataSource};
//!
//! let dataset = CsvSource::from_path("cohort.csv").load()?;
//! let client = InsightClient::new(InsightConfig::load(None)?)?;
//! let result = analyze_with_insight(&AnalysisRunner::new(), &dataset, Some(&client)).await?;
//! println!("{}", result.insight().unwrap_or("no insight"));
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "insight")]
mod client;
mod config;
mod error;
mod prompt;
mod service;

#[cfg(feature = "insight")]
pub use client::{ChatChoice, ChatRequest, ChatResponse, InsightClient};
pub use config::{InsightConfig, InsightSettings, DEFAULT_ENDPOINT, DEFAULT_MODEL};
pub use error::{InsightError, InsightResult};
pub use prompt::{build_messages, ChatMessage};
pub use service::{analyze_with_insight, AnalysisWithInsight, InsightGenerator, InsightOutcome};
