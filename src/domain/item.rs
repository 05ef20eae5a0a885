//! Listing filters for the public item board.

use super::{SortOrder, normalize_date};
use crate::entities::items::ItemStatus;
use serde::Deserialize;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid status filter: {0}")]
    Status(String),

    #[error("Invalid sort option: {0}")]
    Sort(String),

    #[error("Invalid date: {0}")]
    Date(String),
}

/// Which lifecycle slice of the board to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    /// Available and not archived.
    #[default]
    Open,
    /// Collected items, archived ones included.
    Collected,
    /// A single non-terminal status.
    Only(ItemStatus),
    /// Any status, archived items excluded.
    All,
}

impl FromStr for StatusFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Ok(Self::Open),
            "available" => Ok(Self::Only(ItemStatus::Available)),
            "claimed" => Ok(Self::Only(ItemStatus::Claimed)),
            "collected" => Ok(Self::Collected),
            "all" => Ok(Self::All),
            other => Err(FilterError::Status(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    FoundDate,
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ItemSort {
    /// Found date, newest first; ties broken by creation time.
    #[default]
    Recent,
    Oldest,
    TitleAsc,
    TitleDesc,
}

impl ItemSort {
    #[must_use]
    pub const fn key(self) -> (SortField, SortOrder) {
        match self {
            Self::Recent => (SortField::FoundDate, SortOrder::Descending),
            Self::Oldest => (SortField::FoundDate, SortOrder::Ascending),
            Self::TitleAsc => (SortField::Title, SortOrder::Ascending),
            Self::TitleDesc => (SortField::Title, SortOrder::Descending),
        }
    }
}

impl FromStr for ItemSort {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "recent" => Ok(Self::Recent),
            "oldest" => Ok(Self::Oldest),
            "az" => Ok(Self::TitleAsc),
            "za" => Ok(Self::TitleDesc),
            other => Err(FilterError::Sort(other.to_string())),
        }
    }
}

/// Raw query-string values as received.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ItemFilterParams {
    pub search: Option<String>,
    pub status: Option<String>,
    pub location: Option<String>,
    pub date: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub sort: Option<String>,
}

/// Validated listing filter handed to the item repository.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub search: Option<String>,
    pub status: StatusFilter,
    pub location: Option<String>,
    pub found_on: Option<String>,
    pub found_from: Option<String>,
    pub found_to: Option<String>,
    pub sort: ItemSort,
}

impl TryFrom<ItemFilterParams> for ItemFilter {
    type Error = FilterError;

    fn try_from(params: ItemFilterParams) -> Result<Self, Self::Error> {
        let status = params.status.as_deref().unwrap_or("").trim().parse()?;
        let sort = params.sort.as_deref().unwrap_or("").trim().parse()?;

        let location = non_blank(params.location).filter(|l| !l.eq_ignore_ascii_case("all"));

        Ok(Self {
            search: non_blank(params.search),
            status,
            location,
            found_on: parse_optional_date(params.date)?,
            found_from: parse_optional_date(params.from)?,
            found_to: parse_optional_date(params.to)?,
            sort,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_optional_date(value: Option<String>) -> Result<Option<String>, FilterError> {
    match non_blank(value) {
        None => Ok(None),
        Some(raw) => normalize_date(&raw)
            .map(Some)
            .ok_or(FilterError::Date(raw)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_params_show_open_items_newest_first() {
        let filter = ItemFilter::try_from(ItemFilterParams::default()).unwrap();
        assert_eq!(filter.status, StatusFilter::Open);
        assert_eq!(filter.sort, ItemSort::Recent);
        assert_eq!(filter.search, None);
    }

    #[test]
    fn blank_and_all_locations_are_ignored() {
        let params = ItemFilterParams {
            location: Some("all".to_string()),
            search: Some("   ".to_string()),
            ..Default::default()
        };
        let filter = ItemFilter::try_from(params).unwrap();
        assert_eq!(filter.location, None);
        assert_eq!(filter.search, None);
    }

    #[test]
    fn status_values_map_to_slices() {
        assert_eq!("collected".parse(), Ok(StatusFilter::Collected));
        assert_eq!(
            "claimed".parse(),
            Ok(StatusFilter::Only(ItemStatus::Claimed))
        );
        assert_eq!(
            "archived".parse::<StatusFilter>(),
            Err(FilterError::Status("archived".to_string()))
        );
    }

    #[test]
    fn sort_keys() {
        assert_eq!(
            "az".parse::<ItemSort>().unwrap().key(),
            (SortField::Title, SortOrder::Ascending)
        );
        assert_eq!(
            "oldest".parse::<ItemSort>().unwrap().key(),
            (SortField::FoundDate, SortOrder::Ascending)
        );
        assert!("newest".parse::<ItemSort>().is_err());
    }

    #[test]
    fn dates_are_normalized_or_rejected() {
        let params = ItemFilterParams {
            from: Some("2025-1-2".to_string()),
            to: Some("2025-01-31T00:00:00Z".to_string()),
            ..Default::default()
        };
        let filter = ItemFilter::try_from(params).unwrap();
        assert_eq!(filter.found_from.as_deref(), Some("2025-01-02"));
        assert_eq!(filter.found_to.as_deref(), Some("2025-01-31"));

        let bad = ItemFilterParams {
            date: Some("yesterday".to_string()),
            ..Default::default()
        };
        assert_eq!(
            ItemFilter::try_from(bad),
            Err(FilterError::Date("yesterday".to_string()))
        );
    }
}
