//! In-process document collection
//!
//! Behaves like the remote store, including outages: it can be switched
//! unreachable, and inserts can be made to fail after a number of successes.
//! Clones share the same documents.

use std::sync::{Arc, Mutex, MutexGuard};

use shelf_domain::{normalize, Book, RawBook, SortKey};

use super::{BookFilter, DocumentCollection, RemoteResult};
use crate::error::RemoteError;

#[derive(Debug, Default)]
struct State {
    documents: Vec<RawBook>,
    reachable: bool,
    inserts_left: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct MemoryCollection {
    state: Arc<Mutex<State>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::with_documents(Vec::new())
    }

    pub fn with_documents(documents: Vec<RawBook>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                documents,
                reachable: true,
                inserts_left: None,
            })),
        }
    }

    /// While unreachable every call fails.
    pub fn set_reachable(&self, reachable: bool) {
        if let Ok(mut state) = self.state.lock() {
            state.reachable = reachable;
        }
    }

    /// Let `n` more inserts succeed, then fail every insert after that.
    pub fn fail_inserts_after(&self, n: usize) {
        if let Ok(mut state) = self.state.lock() {
            state.inserts_left = Some(n);
        }
    }

    /// Snapshot of the stored documents.
    pub fn documents(&self) -> Vec<RawBook> {
        self.state
            .lock()
            .map(|state| state.documents.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.state.lock().map(|state| state.documents.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn open(&self) -> RemoteResult<MutexGuard<'_, State>> {
        let state = self
            .state
            .lock()
            .map_err(|_| RemoteError::Unavailable("collection lock poisoned".to_string()))?;
        if !state.reachable {
            return Err(RemoteError::Unavailable("connection refused".to_string()));
        }
        Ok(state)
    }
}

impl Default for MemoryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentCollection for MemoryCollection {
    fn describe(&self) -> String {
        "memory".to_string()
    }

    fn ping(&self) -> RemoteResult<()> {
        self.open().map(|_| ())
    }

    fn find(&self, filter: &BookFilter, sort: Option<SortKey>) -> RemoteResult<Vec<RawBook>> {
        let state = self.open()?;
        let found: Vec<RawBook> = state
            .documents
            .iter()
            .filter(|doc| filter.matches(doc))
            .cloned()
            .collect();

        let Some(key) = sort else {
            return Ok(found);
        };
        // Compare on the normalized view so missing fields sort like defaults.
        let mut keyed: Vec<(Book, RawBook)> = found
            .into_iter()
            .map(|doc| (normalize(doc.clone()), doc))
            .collect();
        keyed.sort_by(|a, b| key.compare(&a.0, &b.0));
        Ok(keyed.into_iter().map(|(_, doc)| doc).collect())
    }

    fn find_one(&self, id: &str) -> RemoteResult<Option<RawBook>> {
        let state = self.open()?;
        Ok(state
            .documents
            .iter()
            .find(|doc| doc.id.as_deref() == Some(id))
            .cloned())
    }

    fn insert_one(&self, book: &Book) -> RemoteResult<()> {
        let mut state = self.open()?;
        if let Some(left) = state.inserts_left.as_mut() {
            if *left == 0 {
                return Err(RemoteError::Unavailable("insert rejected".to_string()));
            }
            *left -= 1;
        }
        state.documents.push(RawBook::from(book));
        Ok(())
    }

    fn delete_one(&self, id: &str) -> RemoteResult<u64> {
        let mut state = self.open()?;
        match state
            .documents
            .iter()
            .position(|doc| doc.id.as_deref() == Some(id))
        {
            Some(index) => {
                state.documents.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn delete_all(&self) -> RemoteResult<u64> {
        let mut state = self.open()?;
        let deleted = state.documents.len() as u64;
        state.documents.clear();
        Ok(deleted)
    }

    fn set_read(&self, id: &str, read: bool) -> RemoteResult<u64> {
        let mut state = self.open()?;
        match state
            .documents
            .iter_mut()
            .find(|doc| doc.id.as_deref() == Some(id))
        {
            Some(doc) => {
                doc.read = Some(read);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    fn count(&self, filter: &BookFilter) -> RemoteResult<u64> {
        let state = self.open()?;
        Ok(state.documents.iter().filter(|doc| filter.matches(doc)).count() as u64)
    }

    fn distinct_genres(&self) -> RemoteResult<Vec<String>> {
        let state = self.open()?;
        let mut genres: Vec<String> = state
            .documents
            .iter()
            .map(|doc| doc.genre_or_default().to_string())
            .collect();
        genres.sort();
        genres.dedup();
        Ok(genres)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelf_domain::SearchField;

    fn book(id: &str, title: &str, year: i32) -> Book {
        Book {
            id: id.to_string(),
            title: title.to_string(),
            author: "Author".to_string(),
            year,
            genre: "Fiction".to_string(),
            read: false,
            date_added: "2024-01-01".to_string(),
        }
    }

    #[test]
    fn test_insert_find_delete() {
        let store = MemoryCollection::new();
        store.insert_one(&book("a", "Zeta", 2001)).unwrap();
        store.insert_one(&book("b", "Alpha", 1999)).unwrap();

        let sorted = store.find(&BookFilter::all(), Some(SortKey::TitleAsc)).unwrap();
        assert_eq!(sorted[0].title.as_deref(), Some("Alpha"));

        assert_eq!(store.delete_one("a").unwrap(), 1);
        assert_eq!(store.delete_one("a").unwrap(), 0);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unreachable_fails_every_call() {
        let store = MemoryCollection::new();
        store.set_reachable(false);
        assert!(store.ping().is_err());
        assert!(store.count(&BookFilter::all()).is_err());
        assert!(store.insert_one(&book("a", "A", 1)).is_err());
    }

    #[test]
    fn test_fail_inserts_after() {
        let store = MemoryCollection::new();
        store.fail_inserts_after(1);
        assert!(store.insert_one(&book("a", "A", 1)).is_ok());
        assert!(store.insert_one(&book("b", "B", 2)).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_set_read_and_counts() {
        let store = MemoryCollection::with_documents(vec![
            RawBook::from(&book("a", "A", 1)),
            RawBook {
                title: Some("Legacy".to_string()),
                ..RawBook::default()
            },
        ]);
        assert_eq!(store.set_read("a", true).unwrap(), 1);
        assert_eq!(store.set_read("missing", true).unwrap(), 0);
        assert_eq!(store.count(&BookFilter::read(true)).unwrap(), 1);
        assert_eq!(store.count(&BookFilter::read(false)).unwrap(), 1);
        assert_eq!(store.distinct_genres().unwrap(), vec!["Fiction", "Other"]);
    }

    #[test]
    fn test_clones_share_documents() {
        let store = MemoryCollection::new();
        let handle = store.clone();
        store.insert_one(&book("a", "Dune", 1965)).unwrap();
        let found = handle.find(&BookFilter::search("dune", SearchField::Title), None).unwrap();
        assert_eq!(found.len(), 1);
    }
}
