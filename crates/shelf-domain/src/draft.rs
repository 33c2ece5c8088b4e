//! User input for new books and its validation

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::book::{new_book_id, Book, DATE_FORMAT};

/// Reasons a draft is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Title and author are required.")]
    MissingTitleOrAuthor,

    #[error("Year must be a valid number.")]
    YearNotANumber(String),

    #[error("Year must be between 0 and {max}.")]
    YearOutOfRange { year: i64, max: i32 },
}

/// Unvalidated input for a new catalog entry.
///
/// `year` is kept as the text the user typed; [`BookDraft::into_book`]
/// decides whether it is acceptable.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub year: String,
    pub genre: String,
    pub read: bool,
}

impl BookDraft {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        year: impl ToString,
        genre: impl Into<String>,
        read: bool,
    ) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            year: year.to_string(),
            genre: genre.into(),
            read,
        }
    }

    /// Check the draft against the calendar year of `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<i32, ValidationError> {
        if self.title.trim().is_empty() || self.author.trim().is_empty() {
            return Err(ValidationError::MissingTitleOrAuthor);
        }

        let year: i64 = self
            .year
            .trim()
            .parse()
            .map_err(|_| ValidationError::YearNotANumber(self.year.clone()))?;

        let max = today.year();
        if !(0..=i64::from(max)).contains(&year) {
            return Err(ValidationError::YearOutOfRange { year, max });
        }

        // Bounded by `max` above.
        Ok(year as i32)
    }

    /// Validate and stamp a fresh id and `date_added`.
    pub fn into_book(self, today: NaiveDate) -> Result<Book, ValidationError> {
        let year = self.validate(today)?;
        Ok(Book {
            id: new_book_id(),
            title: self.title,
            author: self.author,
            year,
            genre: self.genre,
            read: self.read,
            date_added: today.format(DATE_FORMAT).to_string(),
        })
    }
}
