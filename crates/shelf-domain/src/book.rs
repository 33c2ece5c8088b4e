//! Book record and the read-boundary normalization

use serde::{Deserialize, Deserializer, Serialize};

use crate::genre::DEFAULT_GENRE;

/// Format used for `date_added` stamps.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A catalog record as handed to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub genre: String,
    pub read: bool,
    pub date_added: String, // YYYY-MM-DD
}

impl Book {
    /// Label used by list views.
    pub fn status_label(&self) -> &'static str {
        if self.read {
            "Read"
        } else {
            "Unread"
        }
    }
}

/// A document as stored, before normalization.
///
/// Stores are schema-less, so every field may be missing. Unknown fields
/// (including store-internal identifiers such as `_id`) are ignored.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawBook {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_added: Option<String>,
}

impl RawBook {
    /// Whether normalization has to invent an `id` or `read` value.
    pub fn needs_backfill(&self) -> bool {
        self.id.is_none() || self.read.is_none()
    }

    /// Genre as the stores compare it: missing counts as [`DEFAULT_GENRE`].
    pub fn genre_or_default(&self) -> &str {
        self.genre.as_deref().unwrap_or(DEFAULT_GENRE)
    }
}

impl From<&Book> for RawBook {
    fn from(book: &Book) -> Self {
        Self {
            id: Some(book.id.clone()),
            title: Some(book.title.clone()),
            author: Some(book.author.clone()),
            year: Some(book.year),
            genre: Some(book.genre.clone()),
            read: Some(book.read),
            date_added: Some(book.date_added.clone()),
        }
    }
}

/// Generate a fresh record id.
pub fn new_book_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Turn a raw document into a fully populated [`Book`].
///
/// Missing `id` gets a fresh random id and missing `read` becomes `false`.
/// Text fields default to the empty string, `year` to zero and `genre` to
/// [`DEFAULT_GENRE`]. The backfilled values live only in the returned book.
pub fn normalize(raw: RawBook) -> Book {
    Book {
        id: raw.id.unwrap_or_else(new_book_id),
        title: raw.title.unwrap_or_default(),
        author: raw.author.unwrap_or_default(),
        year: raw.year.unwrap_or(0),
        genre: raw.genre.unwrap_or_else(|| DEFAULT_GENRE.to_string()),
        read: raw.read.unwrap_or(false),
        date_added: raw.date_added.unwrap_or_default(),
    }
}

/// Normalize a batch of raw documents, preserving order.
pub fn normalize_all(raws: impl IntoIterator<Item = RawBook>) -> Vec<Book> {
    raws.into_iter().map(normalize).collect()
}

/// Accepts integers, integral floats and numeric strings; anything else is
/// treated as absent rather than failing the whole document.
fn lenient_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
            .and_then(|y| i32::try_from(y).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_backfills_id_and_read() {
        let raw: RawBook =
            serde_json::from_str(r#"{"title": "Dune", "author": "Frank Herbert"}"#).unwrap();
        assert!(raw.needs_backfill());

        let book = normalize(raw);
        assert!(!book.id.is_empty());
        assert!(!book.read);
        assert_eq!(book.title, "Dune");
        assert_eq!(book.year, 0);
        assert_eq!(book.genre, DEFAULT_GENRE);
        assert_eq!(book.date_added, "");
    }

    #[test]
    fn test_normalize_keeps_present_fields() {
        let raw: RawBook = serde_json::from_str(
            r#"{"id": "12345", "title": "Emma", "author": "Jane Austen", "year": 1815,
                "genre": "Romance", "read": true, "date_added": "2024-03-01"}"#,
        )
        .unwrap();
        assert!(!raw.needs_backfill());

        let book = normalize(raw);
        assert_eq!(book.id, "12345");
        assert!(book.read);
        assert_eq!(book.year, 1815);
        assert_eq!(book.genre, "Romance");
        assert_eq!(book.date_added, "2024-03-01");
    }

    #[test]
    fn test_backfilled_ids_differ() {
        let a = normalize(RawBook::default());
        let b = normalize(RawBook::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_lenient_year_forms() {
        let from_string: RawBook = serde_json::from_str(r#"{"year": " 1999 "}"#).unwrap();
        assert_eq!(from_string.year, Some(1999));

        let from_float: RawBook = serde_json::from_str(r#"{"year": 2001.0}"#).unwrap();
        assert_eq!(from_float.year, Some(2001));

        let garbage: RawBook = serde_json::from_str(r#"{"year": "soon"}"#).unwrap();
        assert_eq!(garbage.year, None);

        let null: RawBook = serde_json::from_str(r#"{"year": null}"#).unwrap();
        assert_eq!(null.year, None);
    }

    #[test]
    fn test_store_internal_fields_ignored() {
        let raw: RawBook =
            serde_json::from_str(r#"{"_id": "65f0c0ffee", "id": "1", "read": false}"#).unwrap();
        assert_eq!(raw.id.as_deref(), Some("1"));
    }

    #[test]
    fn test_raw_from_book_round_trips_through_normalize() {
        let book = Book {
            id: "abc".to_string(),
            title: "Kindred".to_string(),
            author: "Octavia E. Butler".to_string(),
            year: 1979,
            genre: "Sci-Fi".to_string(),
            read: false,
            date_added: "2025-01-02".to_string(),
        };
        assert_eq!(normalize(RawBook::from(&book)), book);
    }
}
