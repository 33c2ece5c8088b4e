//! Browse and search vocabulary: status filter, sort keys, search fields

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::book::Book;
use crate::genre::ALL_GENRES;

/// A label that does not name any known option.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown {kind}: {value}")]
pub struct ParseOptionError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseOptionError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Read-status narrowing for list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusFilter {
    #[default]
    All,
    Read,
    Unread,
}

impl StatusFilter {
    /// The `read` value a document must have, if any.
    pub fn wanted(self) -> Option<bool> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Read => Some(true),
            StatusFilter::Unread => Some(false),
        }
    }

    pub fn matches(self, read: bool) -> bool {
        self.wanted().map_or(true, |wanted| wanted == read)
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StatusFilter::All => "All",
            StatusFilter::Read => "Read",
            StatusFilter::Unread => "Unread",
        };
        f.write_str(label)
    }
}

impl FromStr for StatusFilter {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "all" => Ok(StatusFilter::All),
            "read" => Ok(StatusFilter::Read),
            "unread" => Ok(StatusFilter::Unread),
            _ => Err(ParseOptionError::new("status", s)),
        }
    }
}

/// Ordering applied by list views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    TitleAsc,
    AuthorAsc,
    YearDesc,
    DateAddedDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 4] = [
        SortKey::TitleAsc,
        SortKey::AuthorAsc,
        SortKey::YearDesc,
        SortKey::DateAddedDesc,
    ];

    /// Document field the key sorts on.
    pub fn field(self) -> &'static str {
        match self {
            SortKey::TitleAsc => "title",
            SortKey::AuthorAsc => "author",
            SortKey::YearDesc => "year",
            SortKey::DateAddedDesc => "date_added",
        }
    }

    pub fn ascending(self) -> bool {
        matches!(self, SortKey::TitleAsc | SortKey::AuthorAsc)
    }

    pub fn compare(self, a: &Book, b: &Book) -> Ordering {
        match self {
            SortKey::TitleAsc => a.title.cmp(&b.title),
            SortKey::AuthorAsc => a.author.cmp(&b.author),
            SortKey::YearDesc => b.year.cmp(&a.year),
            SortKey::DateAddedDesc => b.date_added.cmp(&a.date_added),
        }
    }

    /// Stable sort; equal keys keep their incoming order.
    pub fn sort(self, books: &mut [Book]) {
        books.sort_by(|a, b| self.compare(a, b));
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SortKey::TitleAsc => "Title (A-Z)",
            SortKey::AuthorAsc => "Author (A-Z)",
            SortKey::YearDesc => "Year (Newest)",
            SortKey::DateAddedDesc => "Added",
        };
        f.write_str(label)
    }
}

impl FromStr for SortKey {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" | "title (a-z)" => Ok(SortKey::TitleAsc),
            "author" | "author (a-z)" => Ok(SortKey::AuthorAsc),
            "year" | "year (newest)" => Ok(SortKey::YearDesc),
            "added" | "date_added" => Ok(SortKey::DateAddedDesc),
            _ => Err(ParseOptionError::new("sort key", s)),
        }
    }
}

/// Field a search term is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchField {
    #[default]
    Title,
    Author,
    Year,
    Genre,
}

impl SearchField {
    pub fn name(self) -> &'static str {
        match self {
            SearchField::Title => "title",
            SearchField::Author => "author",
            SearchField::Year => "year",
            SearchField::Genre => "genre",
        }
    }

    /// String form of the field used for substring matching.
    pub fn value_of(self, book: &Book) -> String {
        match self {
            SearchField::Title => book.title.clone(),
            SearchField::Author => book.author.clone(),
            SearchField::Year => book.year.to_string(),
            SearchField::Genre => book.genre.clone(),
        }
    }

    /// Case-insensitive substring match on the field's string form.
    pub fn matches(self, book: &Book, term: &str) -> bool {
        self.value_of(book)
            .to_lowercase()
            .contains(&term.to_lowercase())
    }
}

impl fmt::Display for SearchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SearchField {
    type Err = ParseOptionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "title" => Ok(SearchField::Title),
            "author" => Ok(SearchField::Author),
            "year" => Ok(SearchField::Year),
            "genre" => Ok(SearchField::Genre),
            _ => Err(ParseOptionError::new("search field", s)),
        }
    }
}

/// Turn a genre selection into an optional exact-match constraint.
pub fn genre_constraint(genre: &str) -> Option<&str> {
    if genre == ALL_GENRES {
        None
    } else {
        Some(genre)
    }
}

/// Whether a search term asks for an exact year.
pub fn exact_year(term: &str) -> Option<i32> {
    if !term.is_empty() && term.chars().all(|c| c.is_ascii_digit()) {
        term.parse().ok()
    } else {
        None
    }
}
