//! Table rendering for terminal output

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use shelf_domain::{Book, Statistics};

fn table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn books(books: &[Book]) -> Table {
    let mut table = table();
    table.set_header(vec!["ID", "Title", "Author", "Year", "Genre", "Status", "Added"]);
    for book in books {
        table.add_row(vec![
            book.id.clone(),
            book.title.clone(),
            book.author.clone(),
            book.year.to_string(),
            book.genre.clone(),
            book.status_label().to_string(),
            book.date_added.clone(),
        ]);
    }
    table
}

pub fn statistics(stats: &Statistics) -> Table {
    let mut table = table();
    table.set_header(vec!["Total Books", "Read", "Unread", "% Read"]);
    table.add_row(vec![
        stats.total.to_string(),
        stats.read.to_string(),
        stats.unread.to_string(),
        format!("{:.1}%", stats.percentage_read),
    ]);
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_books_table_lists_each_book() {
        let book = Book {
            id: "b1".to_string(),
            title: "Dune".to_string(),
            author: "Frank Herbert".to_string(),
            year: 1965,
            genre: "Sci-Fi".to_string(),
            read: false,
            date_added: "2024-01-01".to_string(),
        };
        let rendered = books(&[book]).to_string();
        assert!(rendered.contains("Dune"));
        assert!(rendered.contains("Unread"));
        assert!(rendered.contains("1965"));
    }

    #[test]
    fn test_statistics_percentage() {
        let rendered = statistics(&Statistics::from_counts(3, 1)).to_string();
        assert!(rendered.contains("33.3%"));
    }
}
