//! Remote document collection
//!
//! The session talks to the remote store only through [`DocumentCollection`].
//! Filters are typed here and translated by each implementation; the
//! matching rules in [`BookFilter::matches`] are the reference both follow.

pub mod data_api;
pub mod memory;
pub mod mongo;
mod translate;

pub use data_api::{ConnectionString, DataApiCollection};
pub use memory::MemoryCollection;
pub use mongo::MongoCollection;

use shelf_domain::{exact_year, Book, RawBook, SearchField, SortKey, StatusFilter};

use crate::config::RemoteConfig;
use crate::error::RemoteError;

pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Open the backend named by the secret's scheme and confirm it answers.
///
/// `mongodb://` and `mongodb+srv://` URIs go to the driver; `https://` and
/// `http://` go to a Data API endpoint.
pub fn connect(
    secret: &str,
    settings: &RemoteConfig,
) -> RemoteResult<Box<dyn DocumentCollection>> {
    let secret = secret.trim();
    let scheme = secret
        .split_once("://")
        .map(|(scheme, _)| scheme.to_ascii_lowercase())
        .ok_or_else(|| {
            RemoteError::InvalidConnectionString("missing scheme before '://'".to_string())
        })?;

    match scheme.as_str() {
        "mongodb" | "mongodb+srv" => Ok(Box::new(MongoCollection::connect(secret, settings)?)),
        "https" | "http" => {
            let connection: ConnectionString = secret.parse()?;
            Ok(Box::new(DataApiCollection::connect(&connection, settings)?))
        }
        other => Err(RemoteError::InvalidConnectionString(format!(
            "unsupported scheme '{other}'"
        ))),
    }
}

/// Field constraint produced by a search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextMatch {
    /// Case-insensitive literal substring on the field's string form.
    Contains { field: SearchField, term: String },
    /// Exact integer equality on `year`.
    YearEquals(i32),
}

/// Typed query against the collection. Empty matches every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFilter {
    pub read: Option<bool>,
    pub genre: Option<String>,
    pub text: Option<TextMatch>,
}

impl BookFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn read(value: bool) -> Self {
        Self {
            read: Some(value),
            ..Self::default()
        }
    }

    /// Status and genre narrowing for list views. `genre` of "All" means any.
    pub fn listing(status: StatusFilter, genre: &str) -> Self {
        Self {
            read: status.wanted(),
            genre: shelf_domain::genre_constraint(genre).map(str::to_string),
            text: None,
        }
    }

    /// An all-digit term on `year` becomes an exact match; anything else is
    /// a substring match.
    pub fn search(term: &str, field: SearchField) -> Self {
        let text = match (field, exact_year(term)) {
            (SearchField::Year, Some(year)) => TextMatch::YearEquals(year),
            _ => TextMatch::Contains {
                field,
                term: term.to_string(),
            },
        };
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    /// Whether a stored document satisfies the filter.
    ///
    /// `read: Some(false)` also matches documents without a `read` field, and
    /// a missing genre compares as the default genre, so counts agree with
    /// what normalization hands to callers. A missing field never satisfies a
    /// substring match.
    pub fn matches(&self, doc: &RawBook) -> bool {
        if let Some(wanted) = self.read {
            if doc.read.unwrap_or(false) != wanted {
                return false;
            }
        }

        if let Some(genre) = &self.genre {
            if doc.genre_or_default() != genre {
                return false;
            }
        }

        match &self.text {
            None => true,
            Some(TextMatch::YearEquals(year)) => doc.year == Some(*year),
            Some(TextMatch::Contains { field, term }) => {
                let value = match field {
                    SearchField::Title => doc.title.clone(),
                    SearchField::Author => doc.author.clone(),
                    SearchField::Genre => doc.genre.clone(),
                    SearchField::Year => doc.year.map(|year| year.to_string()),
                };
                value.is_some_and(|value| value.to_lowercase().contains(&term.to_lowercase()))
            }
        }
    }
}

/// A remote collection of book documents.
///
/// Every call is a blocking round trip. Implementations report failures as
/// [`RemoteError`]; deciding what to do about them is the session's job.
pub trait DocumentCollection {
    /// Short human-readable location, for logs.
    fn describe(&self) -> String;

    /// Cheap round trip used to confirm the store is reachable.
    fn ping(&self) -> RemoteResult<()>;

    fn find(&self, filter: &BookFilter, sort: Option<SortKey>) -> RemoteResult<Vec<RawBook>>;

    fn find_one(&self, id: &str) -> RemoteResult<Option<RawBook>>;

    fn insert_one(&self, book: &Book) -> RemoteResult<()>;

    /// Delete the first document with `id`. Returns the deleted count.
    fn delete_one(&self, id: &str) -> RemoteResult<u64>;

    /// Delete every document. Returns the deleted count.
    fn delete_all(&self) -> RemoteResult<u64>;

    /// Set `read` on the first document with `id`. Returns the matched count.
    fn set_read(&self, id: &str, read: bool) -> RemoteResult<u64>;

    fn count(&self, filter: &BookFilter) -> RemoteResult<u64>;

    /// Distinct genre values, missing genres reported as the default genre.
    fn distinct_genres(&self) -> RemoteResult<Vec<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(title: &str, year: Option<i32>, genre: Option<&str>, read: Option<bool>) -> RawBook {
        RawBook {
            id: Some(title.to_lowercase()),
            title: Some(title.to_string()),
            author: Some("Anon".to_string()),
            year,
            genre: genre.map(str::to_string),
            read,
            date_added: None,
        }
    }

    #[test]
    fn test_search_year_digits_is_exact() {
        let filter = BookFilter::search("1965", SearchField::Year);
        assert_eq!(filter.text, Some(TextMatch::YearEquals(1965)));
        assert!(filter.matches(&doc("Dune", Some(1965), None, None)));
        assert!(!filter.matches(&doc("Other", Some(19650), None, None)));
    }

    #[test]
    fn test_search_year_partial_digits_is_exact() {
        let filter = BookFilter::search("96", SearchField::Year);
        assert_eq!(filter.text, Some(TextMatch::YearEquals(96)));
        assert!(!filter.matches(&doc("Dune", Some(1965), None, None)));
        assert!(filter.matches(&doc("Ancient", Some(96), None, None)));
    }

    #[test]
    fn test_search_year_non_digits_is_substring() {
        let filter = BookFilter::search("9x", SearchField::Year);
        assert!(matches!(filter.text, Some(TextMatch::Contains { .. })));
        assert!(!filter.matches(&doc("Dune", Some(1965), None, None)));

        let filter = BookFilter::search("19 ", SearchField::Year);
        assert!(matches!(filter.text, Some(TextMatch::Contains { .. })));
        assert!(!filter.matches(&doc("Dune", Some(1965), None, None)));
    }

    #[test]
    fn test_search_text_case_insensitive() {
        let filter = BookFilter::search("DUN", SearchField::Title);
        assert!(filter.matches(&doc("Dune", None, None, None)));
        assert!(!BookFilter::search("x", SearchField::Genre).matches(&doc("Dune", None, None, None)));
    }

    #[test]
    fn test_unread_matches_missing_read() {
        let unread = BookFilter::listing(StatusFilter::Unread, "All");
        assert!(unread.matches(&doc("A", None, None, None)));
        assert!(unread.matches(&doc("B", None, None, Some(false))));
        assert!(!unread.matches(&doc("C", None, None, Some(true))));
    }

    #[test]
    fn test_connect_rejects_unknown_scheme() {
        let settings = RemoteConfig::default();
        for secret in ["redis://localhost:6379", "cluster0.example.net"] {
            match connect(secret, &settings) {
                Err(RemoteError::InvalidConnectionString(_)) => {}
                Err(other) => panic!("unexpected error for {secret}: {other}"),
                Ok(_) => panic!("{secret} should not connect"),
            }
        }
    }

    #[test]
    fn test_missing_genre_is_default() {
        let other = BookFilter::listing(StatusFilter::All, "Other");
        assert!(other.matches(&doc("A", None, None, None)));
        assert!(!BookFilter::listing(StatusFilter::All, "Poetry").matches(&doc("A", None, None, None)));
        assert!(BookFilter::listing(StatusFilter::All, "All").matches(&doc("A", None, None, None)));
    }
}
