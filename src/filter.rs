//! The bulk-deletion filter and its wire shape.
//!
//! Confidence bounds travel on the server's 0-100 percentage scale, and the
//! local `matches` predicate mirrors the server's deletion query exactly so
//! the UI can preview how many loaded alerts a filter would remove.

use serde::{Deserialize, Serialize};

use crate::alert::{Alert, AlertType};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none", default)]
    pub alert_type: Option<AlertType>,
    #[serde(rename = "minConfidence")]
    pub min_confidence: f64,
    #[serde(rename = "maxConfidence")]
    pub max_confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub to: Option<String>,
}

impl Default for Filter {
    fn default() -> Self {
        Self {
            alert_type: None,
            min_confidence: 0.0,
            max_confidence: 100.0,
            from: None,
            to: None,
        }
    }
}

impl Filter {
    pub fn set_min_confidence_input(&mut self, raw: &str) {
        self.min_confidence = parse_confidence(raw);
    }

    pub fn set_max_confidence_input(&mut self, raw: &str) {
        self.max_confidence = parse_confidence(raw);
    }

    /// Empty strings mean "unset", matching the server's truthiness checks.
    pub fn set_time_range(&mut self, from: String, to: String) {
        self.from = none_if_empty(from);
        self.to = none_if_empty(to);
    }

    /// The server only adds a confidence clause when the bounds are not the
    /// full 0-100 window.
    #[must_use]
    pub fn confidence_active(&self) -> bool {
        self.min_confidence > 0.0 || self.max_confidence < 100.0
    }

    /// Replicates the server's deletion query against one alert.
    ///
    /// Timestamps are compared as strings, exactly like the backing query
    /// does; ISO-8601 strings of this shape order lexicographically.
    #[must_use]
    pub fn matches(&self, alert: &Alert) -> bool {
        if let Some(want) = self.alert_type {
            if alert.alert_type != want {
                return false;
            }
        }
        if self.confidence_active() {
            let pct = alert.confidence_pct();
            if pct < self.min_confidence || pct > self.max_confidence {
                return false;
            }
        }
        // The range only applies when both bounds are present.
        if let (Some(from), Some(to)) = (self.from.as_deref(), self.to.as_deref()) {
            let ts = alert.timestamp.as_str();
            if ts < from || ts > to {
                return false;
            }
        }
        true
    }

    /// How many of the given alerts this filter would delete.
    #[must_use]
    pub fn match_count(&self, alerts: &[Alert]) -> usize {
        alerts.iter().filter(|a| self.matches(a)).count()
    }
}

/// `parseFloat(x) || 0` semantics: anything that is not a finite number
/// clamps to zero rather than erroring.
#[must_use]
pub fn parse_confidence(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn none_if_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
