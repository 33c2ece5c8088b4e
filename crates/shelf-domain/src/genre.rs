//! Genre vocabulary

/// Sentinel that heads the distinct-genre list and disables genre filtering.
pub const ALL_GENRES: &str = "All";

/// Genre assumed for documents stored without one.
pub const DEFAULT_GENRE: &str = "Other";

/// Suggested genres offered when adding a book. Genre stays free text.
pub const GENRES: &[&str] = &[
    "Fiction",
    "Non-Fiction",
    "Mystery",
    "Sci-Fi",
    "Fantasy",
    "Biography",
    "History",
    "Self-Help",
    "Romance",
    "Horror",
    "Thriller",
    "Poetry",
    "Science",
    "Technology",
    "Philosophy",
    DEFAULT_GENRE,
];

/// Build the distinct-genre list: sorted, deduplicated, prefixed with "All".
pub fn genre_listing<I, S>(genres: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut distinct: Vec<String> = genres.into_iter().map(Into::into).collect();
    distinct.sort();
    distinct.dedup();

    let mut listing = Vec::with_capacity(distinct.len() + 1);
    listing.push(ALL_GENRES.to_string());
    listing.extend(distinct);
    listing
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_genre_listing_sorted_and_prefixed() {
        let listing = genre_listing(["Sci-Fi", "Fantasy", "Sci-Fi", "Biography"]);
        assert_eq!(listing, vec!["All", "Biography", "Fantasy", "Sci-Fi"]);
    }

    #[test]
    fn test_genre_listing_empty() {
        let listing = genre_listing(Vec::<String>::new());
        assert_eq!(listing, vec![ALL_GENRES]);
    }

    #[test]
    fn test_default_genre_is_suggested() {
        assert!(GENRES.contains(&DEFAULT_GENRE));
    }
}
