//! Domain rules for the lost-and-found workflow.
//!
//! Everything here is pure: parsing of listing filters, the claim state
//! machine and calendar-date normalization. Persistence lives in `crate::db`.

pub mod claim;
pub mod item;

use chrono::{DateTime, NaiveDate};

/// Sort direction, used instead of a bare `bool`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Normalizes a calendar date to `YYYY-MM-DD`.
///
/// Accepts a bare date or a full RFC 3339 timestamp (browsers send either),
/// returning `None` for anything else.
///
/// # Examples
///
/// ```rust
/// use lostfound::domain::normalize_date;
///
/// assert_eq!(normalize_date("2025-03-14").as_deref(), Some("2025-03-14"));
/// assert_eq!(
///     normalize_date("2025-03-14T09:30:00Z").as_deref(),
///     Some("2025-03-14")
/// );
/// assert_eq!(normalize_date("14/03/2025"), None);
/// ```
#[must_use]
pub fn normalize_date(input: &str) -> Option<String> {
    let input = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Some(date.format("%Y-%m-%d").to_string());
    }

    DateTime::parse_from_rfc3339(input)
        .ok()
        .map(|dt| dt.date_naive().format("%Y-%m-%d").to_string())
}
