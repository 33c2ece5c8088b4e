//! Aggregate reading statistics

use serde::{Deserialize, Serialize};

use crate::book::Book;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    pub read: usize,
    pub unread: usize,
    pub percentage_read: f64,
}

impl Statistics {
    /// Derive the full record from the two counts a store can answer.
    ///
    /// `read` is clamped to `total` so `total == read + unread` holds even
    /// if a store reports inconsistent counts.
    pub fn from_counts(total: usize, read: usize) -> Self {
        let read = read.min(total);
        let percentage_read = if total > 0 {
            read as f64 / total as f64 * 100.0
        } else {
            0.0
        };
        Self {
            total,
            read,
            unread: total - read,
            percentage_read,
        }
    }

    pub fn from_books(books: &[Book]) -> Self {
        let read = books.iter().filter(|book| book.read).count();
        Self::from_counts(books.len(), read)
    }
}
