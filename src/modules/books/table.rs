//! The lending table component: loaded records plus the session state that
//! decides what is displayed.

use serde::Serialize;

use super::filter::filter;
use super::loader::{load_books, BookSource, LoadError};
use super::models::{Book, SortDirection, SortKey, SortState, TableQuery};
use super::sort::sort;

#[derive(Debug, Clone)]
pub struct LendingTable {
    loading: bool,
    loaded: Vec<Book>,
    displayed: Vec<Book>,
    sort: Option<SortState>,
    keyword: String,
}

/// Serializable view of what the table currently shows.
#[derive(Debug, Clone, Serialize)]
pub struct TablePage {
    pub loading: bool,
    pub sort: Option<SortState>,
    pub keyword: String,
    pub books: Vec<Book>,
}

impl LendingTable {
    /// A fresh, unmounted table: loading and empty.
    pub fn new() -> Self {
        Self {
            loading: true,
            loaded: Vec::new(),
            displayed: Vec::new(),
            sort: None,
            keyword: String::new(),
        }
    }

    /// Load the book list from `source`. Only the first call fetches.
    pub async fn mount(&mut self, source: &dyn BookSource) {
        if !self.loading {
            tracing::debug!(location = source.location(), "table already mounted");
            return;
        }

        let result = load_books(source).await;
        self.complete_load(source.location(), result);
    }

    /// Settle a load started elsewhere. Failures are logged and leave the
    /// records untouched; either way the loading flag drops.
    pub fn complete_load(&mut self, location: &str, result: Result<Vec<Book>, LoadError>) {
        if !self.loading {
            tracing::warn!(location, "ignoring load result for an already mounted table");
            return;
        }

        match result {
            Ok(books) => {
                tracing::info!(location, count = books.len(), "books loaded");
                self.loaded = books;
                self.refresh();
            }
            Err(err) => {
                tracing::error!(location, error = %err, "failed to load books");
            }
        }

        self.loading = false;
    }

    /// Sort what is currently displayed and remember the choice.
    pub fn sort_by(&mut self, key: SortKey, direction: SortDirection) {
        self.displayed = sort(&self.displayed, key, direction);
        self.sort = Some(SortState { key, direction });
    }

    /// Filter the loaded records by `keyword`, keeping the active sort.
    pub fn search(&mut self, keyword: impl Into<String>) {
        self.keyword = keyword.into();
        self.refresh();
    }

    /// Replay a user interaction: search first, then sort.
    pub fn apply(&mut self, query: &TableQuery) {
        if let Some(keyword) = &query.keyword {
            self.search(keyword.clone());
        }
        if let Some(state) = query.sort {
            self.sort_by(state.key, state.direction);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn displayed(&self) -> &[Book] {
        &self.displayed
    }

    pub fn sort_state(&self) -> Option<SortState> {
        self.sort
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn page(&self) -> TablePage {
        TablePage {
            loading: self.loading,
            sort: self.sort,
            keyword: self.keyword.clone(),
            books: self.displayed.clone(),
        }
    }

    fn refresh(&mut self) {
        let filtered = filter(&self.loaded, &self.keyword);
        self.displayed = match self.sort {
            Some(state) => sort(&filtered, state.key, state.direction),
            None => filtered,
        };
    }
}

impl Default for LendingTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::loader::FileSource;
    use crate::modules::books::models::{BorrowStatus, RawBook};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use time::macros::date;

    struct CountingSource {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSource {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl BookSource for CountingSource {
        fn location(&self) -> &str {
            "memory"
        }

        async fn fetch_books(&self) -> Result<Vec<RawBook>, LoadError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(LoadError::Status {
                    url: "memory".into(),
                    status: 500,
                });
            }
            Ok(vec![
                raw(
                    1,
                    "Daisies in the field",
                    "Alex Johnson",
                    1992,
                    "2025-09-06",
                    BorrowStatus::Available,
                ),
                raw(
                    2,
                    "Waterworld",
                    "Jenny Spikes",
                    2004,
                    "2025-10-01",
                    BorrowStatus::OnLoan,
                ),
                raw(
                    3,
                    "Green Grass",
                    "Labra Dor",
                    2025,
                    "2025-08-02",
                    BorrowStatus::Available,
                ),
            ])
        }
    }

    fn raw(
        id: u32,
        title: &str,
        author: &str,
        year: i32,
        date_borrowed: &str,
        status: BorrowStatus,
    ) -> RawBook {
        RawBook {
            id,
            title: title.into(),
            author: author.into(),
            publication_year: year,
            date_borrowed: date_borrowed.into(),
            borrow_status: status,
        }
    }

    async fn mounted() -> LendingTable {
        let mut table = LendingTable::new();
        table.mount(&CountingSource::new(false)).await;
        table
    }

    fn ids(table: &LendingTable) -> Vec<u32> {
        table.displayed().iter().map(|b| b.id).collect()
    }

    #[test]
    fn starts_loading_and_empty() {
        let table = LendingTable::new();
        assert!(table.is_loading());
        assert!(table.displayed().is_empty());
        assert_eq!(table.sort_state(), None);
        assert_eq!(table.keyword(), "");
    }

    #[tokio::test]
    async fn mount_populates_in_source_order() {
        let table = mounted().await;
        assert!(!table.is_loading());
        assert_eq!(ids(&table), vec![1, 2, 3]);
        assert_eq!(table.displayed()[1].date_borrowed, date!(2025 - 10 - 01));
    }

    #[tokio::test]
    async fn mount_fetches_only_once() {
        let source = CountingSource::new(false);
        let mut table = LendingTable::new();
        table.mount(&source).await;
        table.mount(&source).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failed_load_clears_loading_and_stays_empty() {
        let mut table = LendingTable::new();
        table.mount(&CountingSource::new(true)).await;
        assert!(!table.is_loading());
        assert!(table.displayed().is_empty());
    }

    #[tokio::test]
    async fn missing_file_degrades_to_empty_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut table = LendingTable::new();
        table
            .mount(&FileSource::new(dir.path().join("nope.json")))
            .await;
        assert!(!table.is_loading());
        assert!(table.displayed().is_empty());
    }

    #[tokio::test]
    async fn single_record_document_parses_date() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("books.json");
        std::fs::write(
            &file,
            r#"[{"id":1,"title":"A","author":"B","publicationYear":2000,"dateBorrowed":"2025-01-01","borrowStatus":"Available"}]"#,
        )
        .unwrap();

        let mut table = LendingTable::new();
        table.mount(&FileSource::new(&file)).await;
        assert_eq!(table.displayed().len(), 1);
        assert_eq!(table.displayed()[0].date_borrowed, date!(2025 - 01 - 01));
    }

    #[tokio::test]
    async fn sort_records_active_state() {
        let mut table = mounted().await;
        table.sort_by(SortKey::PublicationYear, SortDirection::Desc);
        assert_eq!(ids(&table), vec![3, 2, 1]);
        assert_eq!(
            table.sort_state(),
            Some(SortState {
                key: SortKey::PublicationYear,
                direction: SortDirection::Desc,
            })
        );
    }

    #[tokio::test]
    async fn search_keeps_active_sort() {
        let mut table = mounted().await;
        table.sort_by(SortKey::Title, SortDirection::Desc);
        table.search("a");
        // "a" hits all three titles or authors
        assert_eq!(ids(&table), vec![2, 3, 1]);

        table.search("en");
        assert_eq!(ids(&table), vec![2, 3]);
    }

    #[tokio::test]
    async fn search_widens_again_when_keyword_shrinks() {
        let mut table = mounted().await;
        table.search("water");
        assert_eq!(ids(&table), vec![2]);
        table.search("");
        assert_eq!(ids(&table), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn sort_after_search_only_sorts_matches() {
        let mut table = mounted().await;
        table.search("green");
        table.sort_by(SortKey::Id, SortDirection::Desc);
        assert_eq!(ids(&table), vec![3]);
    }

    #[tokio::test]
    async fn apply_replays_search_then_sort() {
        let mut table = mounted().await;
        let query = TableQuery::parse(Some("dateBorrowed"), Some("asc"), Some("S")).unwrap();
        table.apply(&query);

        assert_eq!(ids(&table), vec![3, 1, 2]);
        assert_eq!(table.keyword(), "S");

        let page = table.page();
        assert!(!page.loading);
        assert_eq!(page.books.len(), 3);
    }

    #[test]
    fn late_result_after_mount_is_ignored() {
        let mut table = LendingTable::new();
        table.complete_load("first", Ok(Vec::new()));
        table.complete_load(
            "second",
            Err(LoadError::Status {
                url: "second".into(),
                status: 500,
            }),
        );
        assert!(!table.is_loading());
    }
}
