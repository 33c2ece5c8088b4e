//! Catalog operations
//!
//! Each operation tries the remote store first. When the session has no
//! remote store, or the remote call fails (which downgrades the session),
//! the same operation runs against the cached catalog and the library file.
//! Failures end up as notices; nothing here returns an error.

use shelf_domain::{
    genre_listing, Book, BookDraft, SearchField, SortKey, Statistics, StatusFilter,
};

use crate::local;
use crate::remote::BookFilter;
use crate::session::{normalize_read, Session};

impl Session {
    /// Reload the catalog from the active store into the cache.
    pub fn load(&mut self) -> Vec<Book> {
        let books = match self.try_remote("load", |remote| remote.find(&BookFilter::all(), None)) {
            Some(raws) => normalize_read(raws, "remote"),
            None => self.file.load(&mut self.notices),
        };
        tracing::debug!(mode = %self.mode(), books = books.len(), "catalog loaded");
        self.cache = books.clone();
        books
    }

    /// Replace the whole catalog with `books`.
    ///
    /// The remote path deletes everything and inserts each book in turn. A
    /// failure partway leaves the remote store holding a subset; the books
    /// are then written to the library file instead. The cache always ends
    /// up holding `books`.
    pub fn save(&mut self, books: Vec<Book>) -> bool {
        let saved_remotely = self
            .try_remote("save", |remote| {
                remote.delete_all()?;
                for book in &books {
                    remote.insert_one(book)?;
                }
                Ok(())
            })
            .is_some();

        let saved = saved_remotely || self.file.save(&books, &mut self.notices);
        self.cache = books;
        saved
    }

    /// Validate `draft` and add it as a new book.
    pub fn add(&mut self, draft: BookDraft) -> bool {
        let today = chrono::Local::now().date_naive();
        match draft.into_book(today) {
            Ok(book) => self.insert(book),
            Err(err) => {
                self.notices.error(err.to_string());
                false
            }
        }
    }

    /// Append an already-built book to the store and the cache.
    pub fn insert(&mut self, book: Book) -> bool {
        let title = book.title.clone();
        let stored = match self.try_remote("add", |remote| remote.insert_one(&book)) {
            Some(()) => {
                self.cache.push(book);
                true
            }
            None => {
                self.cache.push(book);
                let persisted = self.persist_cache();
                if !persisted {
                    self.cache.pop();
                }
                persisted
            }
        };

        if stored {
            self.notices.info(format!("Added '{title}' successfully!"));
        }
        stored
    }

    /// Delete the first book with `id`. Unknown ids report `false`.
    ///
    /// In file mode a failed write puts the book back, so the cache keeps
    /// matching the file.
    pub fn remove(&mut self, id: &str) -> bool {
        let found = match self.try_remote("remove", |remote| remote.delete_one(id)) {
            Some(deleted) => {
                local::remove(&mut self.cache, id);
                deleted > 0
            }
            None => match local::remove(&mut self.cache, id) {
                Some((index, book)) => {
                    if !self.persist_cache() {
                        self.cache.insert(index, book);
                        return false;
                    }
                    true
                }
                None => false,
            },
        };

        if !found {
            self.notices.warn(format!("No book with id {id} was removed."));
        }
        found
    }

    /// Flip the read flag of the book with `id`. Unknown ids report `false`.
    ///
    /// In file mode a failed write flips the cached flag back.
    pub fn toggle_read(&mut self, id: &str) -> bool {
        let remote_result = self.try_remote("toggle read", |remote| {
            let Some(doc) = remote.find_one(id)? else {
                return Ok(None);
            };
            let read = !doc.read.unwrap_or(false);
            let matched = remote.set_read(id, read)?;
            Ok((matched > 0).then_some(read))
        });

        let toggled = match remote_result {
            Some(Some(read)) => {
                local::set_read(&mut self.cache, id, read);
                true
            }
            Some(None) => false,
            None => match local::toggle_read(&mut self.cache, id) {
                Some(read) => {
                    if !self.persist_cache() {
                        local::set_read(&mut self.cache, id, !read);
                        return false;
                    }
                    true
                }
                None => false,
            },
        };

        if !toggled {
            self.notices.warn(format!("No book with id {id} to update."));
        }
        toggled
    }

    /// Books whose `field` contains `term`, ignoring case.
    pub fn search(&mut self, term: &str, field: SearchField) -> Vec<Book> {
        let filter = BookFilter::search(term, field);
        match self.try_remote("search", |remote| remote.find(&filter, None)) {
            Some(raws) => normalize_read(raws, "remote"),
            None => local::search(&self.cache, term, field),
        }
    }

    /// Books narrowed by status and genre ("All" for any), sorted by `sort`.
    pub fn filter_sort(&mut self, status: StatusFilter, genre: &str, sort: SortKey) -> Vec<Book> {
        let filter = BookFilter::listing(status, genre);
        match self.try_remote("filter", |remote| remote.find(&filter, Some(sort))) {
            Some(raws) => {
                // Re-sort so missing fields order like their defaults.
                let mut books = normalize_read(raws, "remote");
                sort.sort(&mut books);
                books
            }
            None => local::filter_sort(&self.cache, status, genre, sort),
        }
    }

    pub fn statistics(&mut self) -> Statistics {
        let counts = self.try_remote("statistics", |remote| {
            let total = remote.count(&BookFilter::all())?;
            let read = remote.count(&BookFilter::read(true))?;
            Ok((total, read))
        });
        match counts {
            Some((total, read)) => Statistics::from_counts(total as usize, read as usize),
            None => Statistics::from_books(&self.cache),
        }
    }

    /// Sorted distinct genres, headed by "All".
    pub fn distinct_genres(&mut self) -> Vec<String> {
        match self.try_remote("genres", |remote| remote.distinct_genres()) {
            Some(genres) => genre_listing(genres),
            None => local::distinct_genres(&self.cache),
        }
    }
}
