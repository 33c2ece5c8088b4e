//! Domain types for the shelf book catalog
//!
//! This crate provides the record model shared by every store and front end:
//! - Book: a normalized catalog record with every field populated
//! - RawBook: the schema-less document shape read back from a store
//! - BookDraft: unvalidated user input for adding a book
//! - StatusFilter, SortKey, SearchField: the browse/search vocabulary
//! - Statistics: aggregate read/unread counts
//!
//! Records read from any store go through [`normalize`] exactly once, at the
//! store boundary, so callers never see a book without an `id` or `read`.

pub mod book;
pub mod draft;
pub mod genre;
pub mod query;
pub mod statistics;

pub use book::*;
pub use draft::*;
pub use genre::*;
pub use query::*;
pub use statistics::*;
