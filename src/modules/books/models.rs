use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::Date;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

/// A lendable book as held in memory after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Unique identifier, also the row key
    pub id: u32,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    #[serde(with = "iso_date")]
    pub date_borrowed: Date,
    pub borrow_status: BorrowStatus,
}

/// A book exactly as it appears in the source document, before the borrow
/// date has been parsed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBook {
    pub id: u32,
    pub title: String,
    pub author: String,
    pub publication_year: i32,
    pub date_borrowed: String,
    pub borrow_status: BorrowStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorrowStatus {
    Available,
    #[serde(rename = "On loan")]
    OnLoan,
}

impl BorrowStatus {
    /// Text shown in the table and used when sorting by status.
    pub fn label(self) -> &'static str {
        match self {
            BorrowStatus::Available => "Available",
            BorrowStatus::OnLoan => "On loan",
        }
    }

    pub fn is_available(self) -> bool {
        self == BorrowStatus::Available
    }
}

impl fmt::Display for BorrowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Sortable column. Wire names match the source document's field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortKey {
    Id,
    Title,
    Author,
    PublicationYear,
    DateBorrowed,
    BorrowStatus,
}

impl SortKey {
    /// Columns in display order.
    pub const COLUMNS: [SortKey; 6] = [
        SortKey::Id,
        SortKey::Title,
        SortKey::Author,
        SortKey::PublicationYear,
        SortKey::BorrowStatus,
        SortKey::DateBorrowed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Id => "id",
            SortKey::Title => "title",
            SortKey::Author => "author",
            SortKey::PublicationYear => "publicationYear",
            SortKey::DateBorrowed => "dateBorrowed",
            SortKey::BorrowStatus => "borrowStatus",
        }
    }

    /// Column header text.
    pub fn header(self) -> &'static str {
        match self {
            SortKey::Id => "ID",
            SortKey::Title => "Title",
            SortKey::Author => "Author",
            SortKey::PublicationYear => "Year Published",
            SortKey::DateBorrowed => "Due date",
            SortKey::BorrowStatus => "Borrow Status",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortKey::COLUMNS
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| QueryError::UnknownKey(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: std::cmp::Ordering) -> std::cmp::Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortDirection {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(QueryError::UnknownDirection(other.to_string())),
        }
    }
}

/// The active sort: which column, which way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

/// A user interaction against the table: an optional sort click and an
/// optional search keyword.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableQuery {
    pub sort: Option<SortState>,
    pub keyword: Option<String>,
}

impl TableQuery {
    /// Build a query from loosely typed parameters.
    ///
    /// A direction without a key is ignored; a key without a direction sorts
    /// ascending.
    pub fn parse(
        sort: Option<&str>,
        direction: Option<&str>,
        keyword: Option<&str>,
    ) -> Result<Self, QueryError> {
        let sort = match sort.filter(|key| !key.is_empty()) {
            Some(key) => Some(SortState {
                key: key.parse()?,
                direction: match direction.filter(|dir| !dir.is_empty()) {
                    Some(dir) => dir.parse()?,
                    None => SortDirection::default(),
                },
            }),
            None => None,
        };

        Ok(Self {
            sort,
            keyword: keyword.map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("unknown sort key '{0}'")]
    UnknownKey(String),
    #[error("unknown sort direction '{0}'; expected asc or desc")]
    UnknownDirection(String),
}

impl QueryError {
    /// Name of the offending query parameter.
    pub fn field(&self) -> &'static str {
        match self {
            QueryError::UnknownKey(_) => "sort",
            QueryError::UnknownDirection(_) => "dir",
        }
    }
}
