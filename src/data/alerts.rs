//! Alert severity and filtering.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::color::StatusColor;
use super::timestamp::format_timestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Critical,
    Warning,
    Info,
}

impl AlertSeverity {
    pub const ALL: [AlertSeverity; 3] =
        [AlertSeverity::Critical, AlertSeverity::Warning, AlertSeverity::Info];

    /// Parse a severity name; unknown names are warnings.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "critical" => AlertSeverity::Critical,
            "info" => AlertSeverity::Info,
            _ => AlertSeverity::Warning,
        }
    }

    pub fn color(&self) -> StatusColor {
        match self {
            AlertSeverity::Critical => StatusColor::Red,
            AlertSeverity::Warning => StatusColor::Orange,
            AlertSeverity::Info => StatusColor::Blue,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AlertSeverity::Critical => "critical",
            AlertSeverity::Warning => "warning",
            AlertSeverity::Info => "info",
        }
    }
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One alert as listed on the alerts view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub message: String,
    pub timestamp: Option<String>,
    pub severity: AlertSeverity,
}

impl Alert {
    pub fn formatted_timestamp(&self) -> String {
        format_timestamp(self.timestamp.as_deref())
    }
}

/// Severity and free-text filter for the alert list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    /// `None` shows every severity.
    pub severity: Option<AlertSeverity>,
    pub query: String,
}

impl AlertFilter {
    /// Whether `alert` passes both the severity and the search filter.
    ///
    /// The search is case-insensitive over the message and the formatted
    /// timestamp.
    pub fn matches(&self, alert: &Alert) -> bool {
        if self.severity.is_some_and(|s| s != alert.severity) {
            return false;
        }
        if self.query.is_empty() {
            return true;
        }
        let query = self.query.to_lowercase();
        alert.message.to_lowercase().contains(&query)
            || alert.formatted_timestamp().to_lowercase().contains(&query)
    }

    pub fn apply<'a>(&self, alerts: &'a [Alert]) -> Vec<&'a Alert> {
        alerts.iter().filter(|alert| self.matches(alert)).collect()
    }

    /// Step through all → critical → warning → info → all.
    pub fn cycle_severity(&mut self) {
        self.severity = match self.severity {
            None => Some(AlertSeverity::Critical),
            Some(AlertSeverity::Critical) => Some(AlertSeverity::Warning),
            Some(AlertSeverity::Warning) => Some(AlertSeverity::Info),
            Some(AlertSeverity::Info) => None,
        };
    }

    pub fn clear(&mut self) {
        self.severity = None;
        self.query.clear();
    }

    pub fn is_active(&self) -> bool {
        self.severity.is_some() || !self.query.is_empty()
    }

    pub fn severity_label(&self) -> &'static str {
        self.severity.map(|s| s.label()).unwrap_or("all")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: &str, message: &str, severity: AlertSeverity) -> Alert {
        Alert {
            id: id.to_string(),
            message: message.to_string(),
            timestamp: Some("2025-05-16T12:00:00.000Z".to_string()),
            severity,
        }
    }

    fn sample() -> Vec<Alert> {
        vec![
            alert("a", "Low Fuel Level (15.2%)", AlertSeverity::Warning),
            alert("b", "High Temperature (95.5 °C)", AlertSeverity::Critical),
            alert("c", "Maintenance Required", AlertSeverity::Info),
        ]
    }

    #[test]
    fn test_severity_parse_defaults_to_warning() {
        assert_eq!(AlertSeverity::parse("critical"), AlertSeverity::Critical);
        assert_eq!(AlertSeverity::parse("Info"), AlertSeverity::Info);
        assert_eq!(AlertSeverity::parse("warning"), AlertSeverity::Warning);
        assert_eq!(AlertSeverity::parse("severe"), AlertSeverity::Warning);
        assert_eq!(AlertSeverity::parse(""), AlertSeverity::Warning);
    }

    #[test]
    fn test_severity_colors() {
        assert_eq!(AlertSeverity::Critical.color(), StatusColor::Red);
        assert_eq!(AlertSeverity::Warning.color(), StatusColor::Orange);
        assert_eq!(AlertSeverity::Info.color(), StatusColor::Blue);
    }

    #[test]
    fn test_default_filter_shows_all() {
        let alerts = sample();
        let filter = AlertFilter::default();
        assert!(!filter.is_active());
        assert_eq!(filter.apply(&alerts).len(), 3);
    }

    #[test]
    fn test_filter_by_severity() {
        let alerts = sample();
        let filter = AlertFilter {
            severity: Some(AlertSeverity::Critical),
            ..AlertFilter::default()
        };
        let shown = filter.apply(&alerts);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, "b");
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let alerts = sample();
        let filter = AlertFilter {
            query: "FUEL".to_string(),
            ..AlertFilter::default()
        };
        let shown = filter.apply(&alerts);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, "a");
    }

    #[test]
    fn test_search_matches_formatted_timestamp() {
        let alerts = sample();
        let filter = AlertFilter {
            query: "may 16, 2025".to_string(),
            ..AlertFilter::default()
        };
        assert_eq!(filter.apply(&alerts).len(), 3);
    }

    #[test]
    fn test_cycle_and_clear() {
        let mut filter = AlertFilter::default();
        let mut seen = Vec::new();
        for _ in 0..4 {
            filter.cycle_severity();
            seen.push(filter.severity_label());
        }
        assert_eq!(seen, vec!["critical", "warning", "info", "all"]);

        filter.cycle_severity();
        filter.query = "oil".to_string();
        assert!(filter.is_active());
        filter.clear();
        assert_eq!(filter, AlertFilter::default());
    }
}
