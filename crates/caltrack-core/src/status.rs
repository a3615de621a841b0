//! Calibration status and dashboard metrics
//!
//! Status dashboards answer the question: "How are this sheet's calibrations
//! doing right now?"
//!
//! # Core Concepts
//!
//! - **Status**: Pending, On Time or Late, derived per row and never stored
//! - **StatusSummary**: counts and percentages over a view
//!
//! # Example
//!
//! ```rust
//! use caltrack_core::status::{Status, StatusSummary};
//!
//! let summary = StatusSummary::from_statuses([Status::Late, Status::OnTime, Status::OnTime]);
//!
//! assert_eq!(summary.total, 3);
//! assert_eq!(summary.percent_label(summary.on_time), "66.7%");
//! ```

use serde::{Deserialize, Serialize};

// ============================================================================
// Core Types
// ============================================================================

/// Timeliness of one calibration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// No usable realization date yet
    Pending,
    /// Realized on or before the expected date
    OnTime,
    /// Realized after the expected date
    Late,
}

impl Status {
    /// Sort key: late items first, completed items last
    pub const fn priority(self) -> u8 {
        match self {
            Status::Late => 0,
            Status::Pending => 1,
            Status::OnTime => 2,
        }
    }

    /// Machine label
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "PENDING",
            Status::OnTime => "ON_TIME",
            Status::Late => "LATE",
        }
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::OnTime => "On Time",
            Status::Late => "Late",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Aggregated status counts for a view
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Number of planned calibrations in the view
    pub total: usize,
    pub on_time: usize,
    pub late: usize,
    pub pending: usize,
}

impl StatusSummary {
    pub fn from_statuses(statuses: impl IntoIterator<Item = Status>) -> Self {
        let mut summary = Self::default();
        for status in statuses {
            summary.total += 1;
            match status {
                Status::OnTime => summary.on_time += 1,
                Status::Late => summary.late += 1,
                Status::Pending => summary.pending += 1,
            }
        }
        summary
    }

    /// Share of `count` in the total, `None` for an empty view
    pub fn percent(&self, count: usize) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(count as f64 / self.total as f64 * 100.0)
    }

    /// Formatted percentage (e.g., "33.3%"), "0%" for an empty view
    pub fn percent_label(&self, count: usize) -> String {
        match self.percent(count) {
            Some(p) => format!("{p:.1}%"),
            None => "0%".to_string(),
        }
    }

    pub fn count(&self, status: Status) -> usize {
        match status {
            Status::OnTime => self.on_time,
            Status::Late => self.late,
            Status::Pending => self.pending,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_orders_late_pending_on_time() {
        assert!(Status::Late.priority() < Status::Pending.priority());
        assert!(Status::Pending.priority() < Status::OnTime.priority());
    }

    #[test]
    fn status_display() {
        assert_eq!(Status::OnTime.as_str(), "ON_TIME");
        assert_eq!(Status::Late.label(), "Late");
        assert_eq!(format!("{}", Status::Pending), "Pending");
    }

    #[test]
    fn summary_counts() {
        let summary = StatusSummary::from_statuses([
            Status::Late,
            Status::Pending,
            Status::OnTime,
            Status::OnTime,
        ]);

        assert_eq!(summary.total, 4);
        assert_eq!(summary.on_time, 2);
        assert_eq!(summary.late, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(summary.count(Status::OnTime), 2);
    }

    #[test]
    fn percent_labels() {
        let summary = StatusSummary::from_statuses([Status::Late, Status::OnTime, Status::OnTime]);
        assert_eq!(summary.percent_label(summary.late), "33.3%");
        assert_eq!(summary.percent_label(summary.on_time), "66.7%");
        assert_eq!(summary.percent_label(summary.pending), "0.0%");
    }

    #[test]
    fn empty_summary_guards_division() {
        let summary = StatusSummary::from_statuses(std::iter::empty());
        assert_eq!(summary.total, 0);
        assert_eq!(summary.percent(0), None);
        assert_eq!(summary.percent_label(0), "0%");
    }
}
