//! Domain types for the catalog with strong typing.
//!
//! The list/detail views dispatch on [`EntityKind`] instead of a per-entity
//! view hierarchy; [`RecordId`] carries the parsed primary key for each kind.

pub mod validation;

pub use validation::FieldErrors;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::entities::book_instance::LoanStatus;

/// Every entity exposed through the catalog views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Book,
    Author,
    Genre,
    Language,
    BookInstance,
}

impl EntityKind {
    pub const ALL: [Self; 5] = [
        Self::Book,
        Self::Author,
        Self::Genre,
        Self::Language,
        Self::BookInstance,
    ];

    /// Path segment used in URLs and on the command line.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Book => "books",
            Self::Author => "authors",
            Self::Genre => "genres",
            Self::Language => "languages",
            Self::BookInstance => "bookinstances",
        }
    }

    /// Human readable singular name, used in error messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Book => "Book",
            Self::Author => "Author",
            Self::Genre => "Genre",
            Self::Language => "Language",
            Self::BookInstance => "Book instance",
        }
    }

    /// Parses a raw path id into the key type of this kind.
    ///
    /// Book instances are keyed by UUID, everything else by a positive integer.
    #[must_use]
    pub fn parse_id(self, raw: &str) -> Option<RecordId> {
        let raw = raw.trim();
        match self {
            Self::BookInstance => Uuid::parse_str(raw).ok().map(RecordId::Uuid),
            _ => raw
                .parse::<i32>()
                .ok()
                .filter(|id| *id > 0)
                .map(RecordId::Int),
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

/// Error returned when a path segment names no known entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntityKind(pub String);

impl fmt::Display for UnknownEntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity type '{}'", self.0)
    }
}

impl std::error::Error for UnknownEntityKind {}

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "books" | "book" => Ok(Self::Book),
            "authors" | "author" => Ok(Self::Author),
            "genres" | "genre" => Ok(Self::Genre),
            "languages" | "language" => Ok(Self::Language),
            "bookinstances" | "bookinstance" | "instances" | "copies" => Ok(Self::BookInstance),
            other => Err(UnknownEntityKind(other.to_string())),
        }
    }
}

/// Primary key of a catalog row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordId {
    Int(i32),
    Uuid(Uuid),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(id) => write!(f, "{id}"),
            Self::Uuid(id) => write!(f, "{id}"),
        }
    }
}

/// Due-date buckets offered by the admin copy listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DueBackFilter {
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
    HasDate,
    NoDate,
}

impl DueBackFilter {
    /// Half-open `[start, end)` window for the date buckets, `None` for the
    /// presence filters.
    #[must_use]
    pub fn window(self, today: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let tomorrow = today + Duration::days(1);
        match self {
            Self::Today => Some((today, tomorrow)),
            Self::PastSevenDays => Some((today - Duration::days(7), tomorrow)),
            Self::ThisMonth => {
                let start = today.with_day(1)?;
                let end = if today.month() == 12 {
                    NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?
                } else {
                    NaiveDate::from_ymd_opt(today.year(), today.month() + 1, 1)?
                };
                Some((start, end))
            }
            Self::ThisYear => Some((
                NaiveDate::from_ymd_opt(today.year(), 1, 1)?,
                NaiveDate::from_ymd_opt(today.year() + 1, 1, 1)?,
            )),
            Self::HasDate | Self::NoDate => None,
        }
    }
}

/// Filter for the admin listing of book copies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct InstanceFilter {
    pub status: Option<LoanStatus>,
    pub due_back: Option<DueBackFilter>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_kind_round_trips_through_slug() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.slug().parse::<EntityKind>(), Ok(kind));
        }
        assert_eq!("Copies".parse::<EntityKind>(), Ok(EntityKind::BookInstance));
        assert!("shelves".parse::<EntityKind>().is_err());
    }

    #[test]
    fn parse_id_depends_on_kind() {
        let uuid = Uuid::new_v4();
        assert_eq!(EntityKind::Book.parse_id("7"), Some(RecordId::Int(7)));
        assert_eq!(EntityKind::Book.parse_id("0"), None);
        assert_eq!(EntityKind::Author.parse_id("abc"), None);
        assert_eq!(
            EntityKind::BookInstance.parse_id(&uuid.to_string()),
            Some(RecordId::Uuid(uuid))
        );
        assert_eq!(EntityKind::BookInstance.parse_id("12"), None);
    }

    #[test]
    fn due_back_windows() {
        let today = NaiveDate::from_ymd_opt(2024, 12, 15).unwrap();

        assert_eq!(
            DueBackFilter::Today.window(today),
            Some((today, NaiveDate::from_ymd_opt(2024, 12, 16).unwrap()))
        );
        assert_eq!(
            DueBackFilter::PastSevenDays.window(today),
            Some((
                NaiveDate::from_ymd_opt(2024, 12, 8).unwrap(),
                NaiveDate::from_ymd_opt(2024, 12, 16).unwrap()
            ))
        );
        assert_eq!(
            DueBackFilter::ThisMonth.window(today),
            Some((
                NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
            ))
        );
        assert_eq!(
            DueBackFilter::ThisYear.window(today),
            Some((
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
            ))
        );
        assert_eq!(DueBackFilter::NoDate.window(today), None);
    }
}
