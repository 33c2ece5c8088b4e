//! Query documents shared by the remote backends
//!
//! Filters, sorts and aggregation pipelines are built as JSON once and
//! handed to whichever backend is in use. Aggregation rows decode into the
//! small structs below.

use serde::Deserialize;
use serde_json::{json, Value};
use shelf_domain::{SearchField, SortKey, DEFAULT_GENRE};

use super::{BookFilter, TextMatch};

/// Row produced by [`count_pipeline`].
#[derive(Debug, Deserialize)]
pub(crate) struct CountRow {
    pub n: u64,
}

/// Row produced by [`genre_pipeline`].
#[derive(Debug, Deserialize)]
pub(crate) struct GenreRow {
    #[serde(rename = "_id")]
    pub id: Option<String>,
}

/// Translate a typed filter into a query document.
pub(crate) fn filter_document(filter: &BookFilter) -> Value {
    let mut clauses = Vec::new();

    match filter.read {
        Some(true) => clauses.push(json!({ "read": true })),
        // Documents without `read` are unread.
        Some(false) => clauses.push(json!({ "read": { "$ne": true } })),
        None => {}
    }

    if let Some(genre) = &filter.genre {
        if genre == DEFAULT_GENRE {
            clauses.push(json!({ "genre": { "$in": [genre, null] } }));
        } else {
            clauses.push(json!({ "genre": genre }));
        }
    }

    match &filter.text {
        None => {}
        Some(TextMatch::YearEquals(year)) => clauses.push(json!({ "year": year })),
        Some(TextMatch::Contains { field, term }) => {
            let pattern = regex::escape(term);
            if *field == SearchField::Year {
                clauses.push(json!({
                    "$expr": {
                        "$regexMatch": {
                            "input": { "$toString": "$year" },
                            "regex": pattern,
                            "options": "i"
                        }
                    }
                }));
            } else {
                clauses.push(json!({ field.name(): { "$regex": pattern, "$options": "i" } }));
            }
        }
    }

    match clauses.len() {
        0 => json!({}),
        1 => clauses.remove(0),
        _ => json!({ "$and": clauses }),
    }
}

pub(crate) fn sort_document(key: SortKey) -> Value {
    let direction = if key.ascending() { 1 } else { -1 };
    json!({ key.field(): direction })
}

pub(crate) fn count_pipeline(filter: &BookFilter) -> Value {
    json!([
        { "$match": filter_document(filter) },
        { "$count": "n" }
    ])
}

pub(crate) fn genre_pipeline() -> Value {
    json!([
        { "$group": { "_id": { "$ifNull": ["$genre", DEFAULT_GENRE] } } },
        { "$sort": { "_id": 1 } }
    ])
}

/// `$count` emits no row at all when nothing matched.
pub(crate) fn first_count(rows: &[CountRow]) -> u64 {
    rows.first().map_or(0, |row| row.n)
}

pub(crate) fn genre_names(rows: Vec<GenreRow>) -> Vec<String> {
    rows.into_iter().filter_map(|row| row.id).collect()
}
