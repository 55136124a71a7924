use serde::{Deserialize, Serialize};

/// A single format rule evaluated against a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckItem {
    /// Grouping label, e.g. "Page Settings" or "Level 1 Heading"
    pub category: String,
    pub name: String,
    pub passed: bool,
    /// Value found in the document
    pub current: String,
    /// Value required by the configuration
    pub expected: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl CheckItem {
    /// Suggestion text, treating an empty string as absent
    pub fn suggestion(&self) -> Option<&str> {
        self.suggestion.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Result of a format check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckReport {
    #[serde(default)]
    pub total_items: usize,
    /// Percentage of passed items, rounded to one decimal
    pub pass_rate: f64,
    pub passed_items: usize,
    pub failed_items: usize,
    pub items: Vec<CheckItem>,
}

impl CheckReport {
    /// Build a report whose totals and pass rate agree with `items`
    pub fn from_items(items: Vec<CheckItem>) -> Self {
        let total_items = items.len();
        let passed_items = items.iter().filter(|item| item.passed).count();
        let pass_rate = if total_items == 0 {
            0.0
        } else {
            (passed_items as f64 * 1000.0 / total_items as f64).round() / 10.0
        };

        Self {
            total_items,
            pass_rate,
            passed_items,
            failed_items: total_items - passed_items,
            items,
        }
    }

    pub fn is_fully_compliant(&self) -> bool {
        self.failed_items == 0
    }
}
