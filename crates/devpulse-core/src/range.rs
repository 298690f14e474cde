//! Symbolic range tokens and their resolution to concrete date windows.

use chrono::{Duration, NaiveDate};

/// An inclusive calendar date window, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Number of days covered, inclusive of both endpoints.
    #[must_use]
    pub fn num_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Resolve a symbolic range token to a concrete window ending at `today`.
///
/// `"30d"` covers the trailing 30 days, `"90d"` the trailing 90, and `"1y"`
/// the trailing 365. Any unrecognized token silently falls back to the
/// one-year window; callers never see a validation error for a bad token.
#[must_use]
pub fn resolve_range(token: &str, today: NaiveDate) -> DateRange {
    let offset_days = match token {
        "30d" => 29,
        "90d" => 89,
        _ => 364,
    };

    DateRange {
        start: today - Duration::days(offset_days),
        end: today,
    }
}
