//! Reads the static book document and turns it into in-memory records.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, UtcOffset};

use super::models::{Book, RawBook};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("malformed book document: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("book {id} has an unparsable dateBorrowed '{value}'")]
    InvalidDate { id: u32, value: String },

    #[error("duplicate book id {0}")]
    DuplicateId(u32),
}

/// Somewhere a book document can be read from.
#[async_trait]
pub trait BookSource: Send + Sync {
    /// Human-readable location, used in logs.
    fn location(&self) -> &str;

    /// Read and decode the document once.
    async fn fetch_books(&self) -> Result<Vec<RawBook>, LoadError>;
}

/// A JSON document on the local filesystem.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    display: String,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let display = path.display().to_string();
        Self { path, display }
    }
}

#[async_trait]
impl BookSource for FileSource {
    fn location(&self) -> &str {
        &self.display
    }

    async fn fetch_books(&self) -> Result<Vec<RawBook>, LoadError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| LoadError::Io {
                path: self.display.clone(),
                source,
            })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// A JSON document served over HTTP.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LoadError> {
        let url = url.into();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| LoadError::Transport {
                url: url.clone(),
                source,
            })?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl BookSource for HttpSource {
    fn location(&self) -> &str {
        &self.url
    }

    async fn fetch_books(&self) -> Result<Vec<RawBook>, LoadError> {
        let transport = |source| LoadError::Transport {
            url: self.url.clone(),
            source,
        };

        let response = self.client.get(&self.url).send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(transport)?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Pick a source for a configured location: `http(s)://` URLs are fetched,
/// anything else is a path relative to the working directory.
pub fn source_for(location: &str, timeout: Duration) -> Result<Box<dyn BookSource>, LoadError> {
    if location.starts_with("http://") || location.starts_with("https://") {
        Ok(Box::new(HttpSource::new(location, timeout)?))
    } else {
        Ok(Box::new(FileSource::new(location)))
    }
}

/// Parse a borrow date. Accepts `YYYY-MM-DD`, an RFC 3339 timestamp (the UTC
/// calendar date is kept) or an ISO 8601 local date-time without offset (its
/// own calendar date is kept).
pub fn parse_borrowed_date(value: &str) -> Option<Date> {
    let value = value.trim();
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .ok()
        .or_else(|| {
            OffsetDateTime::parse(value, &Rfc3339)
                .ok()
                .map(|timestamp| timestamp.to_offset(UtcOffset::UTC).date())
        })
        .or_else(|| {
            PrimitiveDateTime::parse(
                value,
                format_description!(
                    "[year]-[month]-[day]T[hour]:[minute][optional [:[second][optional [.[subsecond]]]]]"
                ),
            )
            .ok()
            .map(PrimitiveDateTime::date)
        })
}

/// Convert raw records, parsing every borrow date and checking id uniqueness.
/// Order is preserved.
pub fn into_books(raw: Vec<RawBook>) -> Result<Vec<Book>, LoadError> {
    let mut seen = HashSet::with_capacity(raw.len());

    raw.into_iter()
        .map(|record| {
            if !seen.insert(record.id) {
                return Err(LoadError::DuplicateId(record.id));
            }

            let date_borrowed =
                parse_borrowed_date(&record.date_borrowed).ok_or_else(|| LoadError::InvalidDate {
                    id: record.id,
                    value: record.date_borrowed.clone(),
                })?;

            Ok(Book {
                id: record.id,
                title: record.title,
                author: record.author,
                publication_year: record.publication_year,
                date_borrowed,
                borrow_status: record.borrow_status,
            })
        })
        .collect()
}

/// Fetch from `source` and convert.
pub async fn load_books(source: &dyn BookSource) -> Result<Vec<Book>, LoadError> {
    let raw = source.fetch_books().await?;
    into_books(raw)
}
