//! Chat prompt built from a computed report.

use serde::{Deserialize, Serialize};

use crate::core::AnalysisReport;
use crate::formatters::summary_text;

const SYSTEM_PROMPT: &str = "You are a clinical research methodologist. \
Given demographic statistics of a study dataset, explain in plain language \
whether the cohort is balanced, what the imbalance could mean for the \
generalizability of results, and one concrete recruitment or weighting \
recommendation. Do not invent numbers that are not in the statistics. \
Answer in at most two short paragraphs.";

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Builds the system and user messages for `report`.
pub fn build_messages(report: &AnalysisReport) -> Vec<ChatMessage> {
    let user = format!(
        "Dataset demographic statistics:\n\n{}\nWrite the assessment.",
        summary_text(report)
    );
    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(user)]
}
