//! Degenerate-content guard.
//!
//! A narrow rule list that rejects filler values for a handful of element
//! types (a zero metric, "lorem ipsum" body text). It is deliberately not a
//! general validation mechanism; add a rule only for a concrete element type.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One guarded argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardRule {
    pub element_type: String,
    pub argument: String,
    /// Reject a numeric zero (or text that parses to zero).
    #[serde(default)]
    pub reject_zero: bool,
    /// Lowercase placeholder phrases, compared against the trimmed value.
    #[serde(default)]
    pub placeholders: Vec<String>,
}

impl GuardRule {
    pub fn new(element_type: impl Into<String>, argument: impl Into<String>) -> Self {
        Self {
            element_type: element_type.into(),
            argument: argument.into(),
            reject_zero: false,
            placeholders: Vec::new(),
        }
    }

    pub fn rejecting_zero(mut self) -> Self {
        self.reject_zero = true;
        self
    }

    pub fn with_placeholders<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.placeholders
            .extend(phrases.into_iter().map(|p| p.as_ref().trim().to_lowercase()));
        self
    }

    /// Describe why `value` is degenerate, or `None` when it is acceptable.
    fn check(&self, value: &Value) -> Option<String> {
        match value {
            Value::String(s) => {
                let normalized = s.trim().to_lowercase();
                if normalized.is_empty() {
                    return Some(format!("'{}' is empty", self.argument));
                }
                if self.reject_zero && is_zero_text(&normalized) {
                    return Some(format!("'{}' is zero", self.argument));
                }
                if self.placeholders.iter().any(|p| *p == normalized) {
                    return Some(format!("'{}' is the placeholder '{}'", self.argument, s.trim()));
                }
                None
            }
            Value::Number(n) if self.reject_zero && n.as_f64() == Some(0.0) => {
                Some(format!("'{}' is zero", self.argument))
            }
            _ => None,
        }
    }
}

fn is_zero_text(text: &str) -> bool {
    let digits: String = text
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '%' | ',' | ' '))
        .collect();
    !digits.is_empty() && digits.parse::<f64>().is_ok_and(|v| v == 0.0)
}

/// Rule list applied by the schema validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DegenerateContentGuard {
    rules: Vec<GuardRule>,
}

impl DegenerateContentGuard {
    pub fn new(rules: Vec<GuardRule>) -> Self {
        Self { rules }
    }

    /// A guard that accepts everything.
    pub fn disabled() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn rules(&self) -> &[GuardRule] {
        &self.rules
    }

    /// First degenerate argument of an element, if any.
    ///
    /// Only arguments that are present are checked; absence is the
    /// required-argument check's concern.
    pub fn inspect(
        &self,
        element_type: &str,
        arguments: &serde_json::Map<String, Value>,
    ) -> Option<String> {
        self.rules
            .iter()
            .filter(|rule| rule.element_type == element_type)
            .find_map(|rule| arguments.get(&rule.argument).and_then(|v| rule.check(v)))
    }
}

impl Default for DegenerateContentGuard {
    fn default() -> Self {
        const METRIC_PLACEHOLDERS: [&str; 7] = ["$0", "0%", "n/a", "tbd", "--", "...", "placeholder"];
        Self::new(vec![
            GuardRule::new("MetricCard", "value")
                .rejecting_zero()
                .with_placeholders(METRIC_PLACEHOLDERS),
            GuardRule::new("StatCard", "value")
                .rejecting_zero()
                .with_placeholders(METRIC_PLACEHOLDERS),
            GuardRule::new("TextBlock", "content").with_placeholders([
                "summary",
                "lorem ipsum",
                "placeholder",
                "text goes here",
            ]),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_metric_card_filler_rejected() {
        let guard = DegenerateContentGuard::default();
        for filler in ["", "  ", "0", "$0", "0%", "N/A", "tbd", "--", "...", "Placeholder", "$0.00"] {
            assert!(
                guard
                    .inspect("MetricCard", &args(json!({"value": filler})))
                    .is_some(),
                "expected '{filler}' to be rejected"
            );
        }
        assert!(guard.inspect("MetricCard", &args(json!({"value": 0}))).is_some());
    }

    #[test]
    fn test_metric_card_real_values_pass() {
        let guard = DegenerateContentGuard::default();
        for real in ["1,204", "$12.4k", "98%", "0.5", "up 3%"] {
            assert!(guard.inspect("MetricCard", &args(json!({"value": real}))).is_none());
        }
        assert!(guard.inspect("StatCard", &args(json!({"value": 42}))).is_none());
    }

    #[test]
    fn test_text_block_placeholders() {
        let guard = DegenerateContentGuard::default();
        assert!(guard
            .inspect("TextBlock", &args(json!({"content": " Lorem Ipsum "})))
            .is_some());
        assert!(guard
            .inspect("TextBlock", &args(json!({"content": "Q3 revenue grew 12%"})))
            .is_none());
        // zero is meaningful prose for text blocks
        assert!(guard.inspect("TextBlock", &args(json!({"content": "0"}))).is_none());
    }

    #[test]
    fn test_unguarded_types_untouched() {
        let guard = DegenerateContentGuard::default();
        assert!(guard.inspect("Chart", &args(json!({"value": "placeholder"}))).is_none());
        assert!(DegenerateContentGuard::disabled()
            .inspect("MetricCard", &args(json!({"value": "$0"})))
            .is_none());
    }

    #[test]
    fn test_absent_argument_not_checked() {
        let guard = DegenerateContentGuard::default();
        assert!(guard.inspect("MetricCard", &args(json!({"title": "Revenue"}))).is_none());
    }
}
