//! JSON output formatting

use crate::engine::executor::Report;

pub fn format_json(report: &Report) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}
