//! Shared test fixtures

use shelf_core::{FileStore, MemoryCollection, Session};
use shelf_domain::{Book, BookDraft, RawBook};
use tempfile::TempDir;

/// A library file inside a fresh temp dir. Keep the dir alive for the test.
pub fn temp_library() -> (TempDir, FileStore) {
    let dir = TempDir::new().expect("temp dir");
    let store = FileStore::new(dir.path().join("library.json"));
    (dir, store)
}

pub fn sample_books() -> Vec<Book> {
    vec![
        book("b-1", "The Left Hand of Darkness", "Ursula K. Le Guin", 1969, "Sci-Fi", true),
        book("b-2", "Middlemarch", "George Eliot", 1871, "Fiction", false),
        book("b-3", "The Name of the Rose", "Umberto Eco", 1980, "Mystery", true),
        book("b-4", "Foundation", "Isaac Asimov", 1951, "Sci-Fi", false),
    ]
}

pub fn book(id: &str, title: &str, author: &str, year: i32, genre: &str, read: bool) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        year,
        genre: genre.to_string(),
        read,
        date_added: "2024-02-10".to_string(),
    }
}

/// Remote collection holding [`sample_books`].
#[allow(dead_code)]
pub fn seeded_remote() -> MemoryCollection {
    MemoryCollection::with_documents(sample_books().iter().map(RawBook::from).collect())
}

#[allow(dead_code)]
pub fn dune() -> BookDraft {
    BookDraft::new("Dune", "Frank Herbert", 1965, "Sci-Fi", false)
}

/// Session over the sample catalog, either remote-backed or file-only.
#[allow(dead_code)]
pub fn sample_session(remote: bool, file: FileStore) -> Session {
    if remote {
        Session::with_remote(seeded_remote(), file)
    } else {
        file.write(&sample_books()).expect("seed library file");
        Session::file_only(file)
    }
}
