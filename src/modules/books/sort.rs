use std::cmp::Ordering;

use super::models::{Book, SortDirection, SortKey};

/// Compare two books on one column, ascending. Numbers compare numerically,
/// text lexicographically, dates chronologically.
pub fn compare(a: &Book, b: &Book, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::Title => a.title.cmp(&b.title),
        SortKey::Author => a.author.cmp(&b.author),
        SortKey::PublicationYear => a.publication_year.cmp(&b.publication_year),
        SortKey::DateBorrowed => a.date_borrowed.cmp(&b.date_borrowed),
        SortKey::BorrowStatus => a.borrow_status.label().cmp(b.borrow_status.label()),
    }
}

/// Return a sorted copy of `records`. The sort is stable.
pub fn sort(records: &[Book], key: SortKey, direction: SortDirection) -> Vec<Book> {
    let mut sorted = records.to_vec();
    sorted.sort_by(|a, b| direction.apply(compare(a, b, key)));
    sorted
}
