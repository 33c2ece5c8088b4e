//! # shelf-core
//!
//! Storage and catalog operations for shelf.
//!
//! A [`Session`] prefers the remote document store and falls back to a local
//! JSON file the moment the remote store fails. Every record read from either
//! store is normalized before callers see it. Operations report problems as
//! [`Notice`]s instead of errors.
//!
//! ```no_run
//! use shelf_core::{Session, ShelfConfig};
//! use shelf_domain::{SortKey, StatusFilter};
//!
//! let config = ShelfConfig::load(None)?;
//! let mut session = Session::open(&config);
//! let unread = session.filter_sort(StatusFilter::Unread, "All", SortKey::TitleAsc);
//! for notice in session.take_notices() {
//!     eprintln!("{}", notice.message);
//! }
//! # Ok::<(), shelf_core::ConfigError>(())
//! ```

pub mod config;
pub mod error;
pub mod file_store;
pub mod local;
pub mod notice;
pub mod operations;
pub mod remote;
pub mod session;

pub use config::{RemoteConfig, ShelfConfig, CONNECTION_ENV, SECRETS_FILE};
pub use error::{ConfigError, FileStoreError, RemoteError, Result, ShelfError};
pub use file_store::{FileStore, DEFAULT_LIBRARY_FILE};
pub use notice::{Notice, NoticeLevel, Notices};
pub use remote::{
    BookFilter, ConnectionString, DataApiCollection, DocumentCollection, MemoryCollection,
    MongoCollection, TextMatch,
};
pub use session::{Session, StoreMode};
