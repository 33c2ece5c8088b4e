//! Catalog operations over the in-memory copy
//!
//! These are the file-mode paths of the session operations. They work on a
//! plain slice of normalized books and never touch storage.

use shelf_domain::{genre_constraint, genre_listing, Book, SearchField, SortKey, StatusFilter};

/// Books whose `field` contains `term`, case-insensitively, in catalog order.
pub fn search(books: &[Book], term: &str, field: SearchField) -> Vec<Book> {
    books
        .iter()
        .filter(|book| field.matches(book, term))
        .cloned()
        .collect()
}

/// Narrow by status and genre ("All" means any), then stable-sort by `sort`.
pub fn filter_sort(books: &[Book], status: StatusFilter, genre: &str, sort: SortKey) -> Vec<Book> {
    let genre = genre_constraint(genre);
    let mut selected: Vec<Book> = books
        .iter()
        .filter(|book| status.matches(book.read))
        .filter(|book| genre.map_or(true, |genre| book.genre == genre))
        .cloned()
        .collect();
    sort.sort(&mut selected);
    selected
}

/// Remove the first book with `id`, returning its position and the book.
pub fn remove(books: &mut Vec<Book>, id: &str) -> Option<(usize, Book)> {
    let index = books.iter().position(|book| book.id == id)?;
    Some((index, books.remove(index)))
}

/// Flip `read` on the first book with `id`. Returns the new value.
pub fn toggle_read(books: &mut [Book], id: &str) -> Option<bool> {
    let book = books.iter_mut().find(|book| book.id == id)?;
    book.read = !book.read;
    Some(book.read)
}

/// Set `read` on the first book with `id`. Returns whether one matched.
pub fn set_read(books: &mut [Book], id: &str, read: bool) -> bool {
    match books.iter_mut().find(|book| book.id == id) {
        Some(book) => {
            book.read = read;
            true
        }
        None => false,
    }
}

pub fn distinct_genres(books: &[Book]) -> Vec<String> {
    genre_listing(books.iter().map(|book| book.genre.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn book(id: &str, title: &str, genre: &str, year: i32, read: bool) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: format!("Author of {title}"),
            year,
            genre: genre.to_string(),
            read,
            date_added: "2024-03-01".to_string(),
        }
    }

    fn catalog() -> Vec<Book> {
        vec![
            book("1", "Neuromancer", "Sci-Fi", 1984, true),
            book("2", "Dune", "Sci-Fi", 1965, false),
            book("3", "Emma", "Romance", 1815, false),
        ]
    }

    #[test]
    fn test_search_by_title_and_year() {
        let books = catalog();
        let hits = search(&books, "DUNE", SearchField::Title);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "2");

        let hits = search(&books, "198", SearchField::Year);
        assert_eq!(hits[0].title, "Neuromancer");
        assert!(search(&books, "", SearchField::Genre).len() == 3);
    }

    #[test]
    fn test_filter_sort_unread_scifi() {
        let books = catalog();
        let unread = filter_sort(&books, StatusFilter::Unread, "Sci-Fi", SortKey::TitleAsc);
        assert_eq!(unread.len(), 1);
        assert_eq!(unread[0].title, "Dune");

        let all = filter_sort(&books, StatusFilter::All, "All", SortKey::YearDesc);
        let years: Vec<i32> = all.iter().map(|b| b.year).collect();
        assert_eq!(years, vec![1984, 1965, 1815]);
    }

    #[test]
    fn test_remove_first_match_only() {
        let mut books = catalog();
        books.push(book("2", "Dune Messiah", "Sci-Fi", 1969, false));
        let (index, removed) = remove(&mut books, "2").unwrap();
        assert_eq!(index, 1);
        assert_eq!(removed.title, "Dune");
        assert_eq!(books.len(), 3);
        assert!(remove(&mut books, "missing").is_none());
    }

    #[test]
    fn test_toggle_and_set_read() {
        let mut books = catalog();
        assert_eq!(toggle_read(&mut books, "3"), Some(true));
        assert_eq!(toggle_read(&mut books, "3"), Some(false));
        assert_eq!(toggle_read(&mut books, "nope"), None);
        assert!(set_read(&mut books, "1", false));
        assert!(!books[0].read);
        assert!(!set_read(&mut books, "nope", true));
    }

    #[test]
    fn test_distinct_genres() {
        assert_eq!(distinct_genres(&catalog()), vec!["All", "Romance", "Sci-Fi"]);
    }

    proptest! {
        #[test]
        fn prop_filter_sort_partitions_by_status(reads in proptest::collection::vec(any::<bool>(), 0..20)) {
            let books: Vec<Book> = reads
                .iter()
                .enumerate()
                .map(|(i, read)| book(&i.to_string(), &format!("T{i}"), "Fiction", 2000, *read))
                .collect();
            let read = filter_sort(&books, StatusFilter::Read, "All", SortKey::TitleAsc);
            let unread = filter_sort(&books, StatusFilter::Unread, "All", SortKey::TitleAsc);
            prop_assert_eq!(read.len() + unread.len(), books.len());
            prop_assert!(read.iter().all(|b| b.read));
            prop_assert!(unread.iter().all(|b| !b.read));
        }
    }
}
