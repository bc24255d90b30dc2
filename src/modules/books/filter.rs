use super::models::Book;

/// Keep books whose title or author contains `keyword`, ignoring case.
///
/// A keyword that is blank after trimming keeps everything, in input order.
pub fn filter(records: &[Book], keyword: &str) -> Vec<Book> {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return records.to_vec();
    }

    records
        .iter()
        .filter(|book| matches(book, &needle))
        .cloned()
        .collect()
}

fn matches(book: &Book, needle: &str) -> bool {
    book.title.to_lowercase().contains(needle) || book.author.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::models::BorrowStatus;
    use time::macros::date;

    fn book(id: u32, title: &str, author: &str) -> Book {
        Book {
            id,
            title: title.into(),
            author: author.into(),
            publication_year: 2000,
            date_borrowed: date!(2025 - 01 - 01),
            borrow_status: BorrowStatus::Available,
        }
    }

    fn sample() -> Vec<Book> {
        vec![
            book(1, "Daisies in the field", "Alex Johnson"),
            book(2, "Waterworld", "Jenny Spikes"),
            book(3, "Green Grass", "Labra Dor"),
        ]
    }

    #[test]
    fn empty_keyword_is_identity() {
        assert_eq!(filter(&sample(), ""), sample());
        assert_eq!(filter(&sample(), "   "), sample());
    }

    #[test]
    fn match_is_case_insensitive() {
        let found = filter(&sample(), "water");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Waterworld");

        assert_eq!(filter(&sample(), "GREEN")[0].id, 3);
    }

    #[test]
    fn author_matches_too() {
        let found = filter(&sample(), "spikes");
        assert_eq!(found[0].id, 2);
    }

    #[test]
    fn substring_may_hit_several_records() {
        let found: Vec<u32> = filter(&sample(), "s").iter().map(|b| b.id).collect();
        assert_eq!(found, vec![1, 2, 3]);
    }

    #[test]
    fn no_match_is_empty() {
        assert!(filter(&sample(), "submarine").is_empty());
    }

    #[test]
    fn filtering_is_idempotent() {
        let once = filter(&sample(), "in");
        let twice = filter(&once, "in");
        assert_eq!(once, twice);
    }
}
