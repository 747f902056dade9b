//! Insight memo resource.
//!
//! Insights are appended by the `append_insight` tool and rendered as a
//! plain-text memo under [`INSIGHTS_MEMO_URI`].

use chrono::{DateTime, Utc};
use std::sync::RwLock;

pub const INSIGHTS_MEMO_URI: &str = "memo://insights";

const EMPTY_MEMO: &str = "No data insights have been discovered yet.";

#[derive(Debug, Clone)]
pub struct Insight {
    pub text: String,
    pub recorded_at: DateTime<Utc>,
}

/// Append-only list of insights, shared across tool calls.
#[derive(Debug, Default)]
pub struct InsightLog {
    entries: RwLock<Vec<Insight>>,
}

impl InsightLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, text: impl Into<String>) {
        let insight = Insight {
            text: text.into(),
            recorded_at: Utc::now(),
        };
        self.entries
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push(insight);
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn entries(&self) -> Vec<Insight> {
        self.entries
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Render the memo text.
    pub fn memo(&self) -> String {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        if entries.is_empty() {
            return EMPTY_MEMO.to_string();
        }

        let lines: Vec<String> = entries.iter().map(|i| format!("- {}", i.text)).collect();

        let mut memo = String::from("📊 Data Intelligence Memo 📊\n\n");
        memo.push_str("Key Insights Discovered:\n\n");
        memo.push_str(&lines.join("\n"));

        if entries.len() > 1 {
            memo.push_str(&format!(
                "\n\nSummary:\nAnalysis has revealed {} key data insights that suggest opportunities for strategic optimization and growth.",
                entries.len()
            ));
        }

        memo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_memo() {
        let log = InsightLog::new();
        assert!(log.is_empty());
        assert_eq!(log.memo(), "No data insights have been discovered yet.");
    }

    #[test]
    fn test_single_insight_has_no_summary() {
        let log = InsightLog::new();
        log.append("Churn peaks in March");

        let memo = log.memo();
        assert!(memo.starts_with("📊 Data Intelligence Memo 📊"));
        assert!(memo.ends_with("- Churn peaks in March"));
        assert!(!memo.contains("Summary:"));
    }

    #[test]
    fn test_summary_counts_insights() {
        let log = InsightLog::new();
        log.append("first");
        log.append("second");

        let memo = log.memo();
        assert!(memo.contains("- first\n- second"));
        assert!(memo.contains("Analysis has revealed 2 key data insights"));
        assert_eq!(log.entries()[1].text, "second");
    }
}
