//! Session context
//!
//! A [`Session`] owns everything one run of the catalog needs: the remote
//! collection (while it keeps working), the file store, the in-memory copy of
//! the catalog and the pending notices. The catalog operations themselves
//! live in [`crate::operations`].

use std::fmt;
use std::path::Path;

use shelf_domain::{normalize_all, Book, RawBook};

use crate::config::ShelfConfig;
use crate::error::RemoteError;
use crate::file_store::FileStore;
use crate::notice::{Notice, Notices};
use crate::remote::{self, DocumentCollection, RemoteResult};

/// Which store the session is currently using.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Remote,
    File,
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreMode::Remote => write!(f, "remote"),
            StoreMode::File => write!(f, "file"),
        }
    }
}

pub struct Session {
    pub(crate) remote: Option<Box<dyn DocumentCollection>>,
    pub(crate) file: FileStore,
    pub(crate) cache: Vec<Book>,
    pub(crate) notices: Notices,
}

impl Session {
    /// Connect using `config` and load the catalog.
    ///
    /// With a connection secret configured the remote store is tried first;
    /// any problem reaching it leaves the session in file mode.
    pub fn open(config: &ShelfConfig) -> Self {
        let file = FileStore::new(&config.library_file);
        let mut notices = Notices::default();

        let remote = match config.connection_secret() {
            Ok(Some(secret)) => match remote::connect(&secret, &config.remote) {
                Ok(collection) => Some(collection),
                Err(err) => {
                    tracing::warn!(error = %err, "remote store unreachable at startup");
                    notices.error(format!(
                        "Could not connect to the remote store ({err}). Using local file storage."
                    ));
                    None
                }
            },
            Ok(None) => {
                tracing::info!(path = %file.path().display(), "no remote store configured");
                None
            }
            Err(err) => {
                notices.warn(format!(
                    "Could not read the remote store secret ({err}). Using local file storage."
                ));
                None
            }
        };

        let mut session = Self {
            remote,
            file,
            cache: Vec::new(),
            notices,
        };
        session.load();
        session
    }

    /// Session backed by `collection`, falling back to `file`.
    ///
    /// The collection is pinged first; if that fails the session starts in
    /// file mode.
    pub fn with_remote(collection: impl DocumentCollection + 'static, file: FileStore) -> Self {
        let mut session = Self {
            remote: Some(Box::new(collection)),
            file,
            cache: Vec::new(),
            notices: Notices::default(),
        };
        if session.try_remote("connect", |remote| remote.ping()).is_some() {
            tracing::info!("remote store reachable");
        }
        session.load();
        session
    }

    /// Session that only ever uses `file`.
    pub fn file_only(file: FileStore) -> Self {
        let mut session = Self {
            remote: None,
            file,
            cache: Vec::new(),
            notices: Notices::default(),
        };
        session.load();
        session
    }

    pub fn mode(&self) -> StoreMode {
        if self.remote.is_some() {
            StoreMode::Remote
        } else {
            StoreMode::File
        }
    }

    /// The session's copy of the catalog as of the last load or mutation.
    pub fn books(&self) -> &[Book] {
        &self.cache
    }

    pub fn file_path(&self) -> &Path {
        self.file.path()
    }

    pub fn notices(&self) -> &[Notice] {
        self.notices.pending()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take()
    }

    /// Run `call` against the remote store, if the session still has one.
    ///
    /// `None` means the caller must take the file path: either the session
    /// is in file mode or the call failed and the session was downgraded.
    pub(crate) fn try_remote<T>(
        &mut self,
        action: &str,
        call: impl FnOnce(&dyn DocumentCollection) -> RemoteResult<T>,
    ) -> Option<T> {
        let result = call(self.remote.as_deref()?);
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.degrade(action, err);
                None
            }
        }
    }

    /// Drop the remote store for the rest of the session.
    fn degrade(&mut self, action: &str, err: RemoteError) {
        if let Some(remote) = self.remote.take() {
            tracing::warn!(
                store = %remote.describe(),
                action,
                error = %err,
                "remote store failed; switching to file storage"
            );
        }
        self.notices.error(format!(
            "Remote store error during {action}: {err}. Falling back to local file storage."
        ));
    }

    /// Write the cache to the library file.
    pub(crate) fn persist_cache(&mut self) -> bool {
        self.file.save(&self.cache, &mut self.notices)
    }
}

/// Normalize documents read from `source`, logging any backfilled records.
pub(crate) fn normalize_read(raws: Vec<RawBook>, source: &str) -> Vec<Book> {
    let backfilled = raws.iter().filter(|raw| raw.needs_backfill()).count();
    if backfilled > 0 {
        tracing::debug!(source, backfilled, "backfilled id/read on stored records");
    }
    normalize_all(raws)
}
