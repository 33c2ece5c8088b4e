//! shelf - personal book catalog
//!
//! Command-line front end over `shelf-core`. Every command opens a session,
//! runs one catalog operation and prints any notices to stderr.

mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use shelf_core::{Notice, NoticeLevel, Session, ShelfConfig};
use shelf_domain::{BookDraft, SearchField, SortKey, StatusFilter, ALL_GENRES, DEFAULT_GENRE, GENRES};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shelf", version, about = "Personal book catalog")]
struct Cli {
    /// Config file (defaults to <config dir>/shelf/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Library file, overriding the configured one
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Browse the catalog, optionally narrowed and sorted.
    List {
        #[arg(long, default_value_t = StatusFilter::All)]
        status: StatusFilter,
        #[arg(long, default_value = ALL_GENRES)]
        genre: String,
        /// title, author, year or added
        #[arg(long, default_value_t = SortKey::TitleAsc)]
        sort: SortKey,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Add a book.
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        author: String,
        #[arg(long)]
        year: String,
        #[arg(long, default_value = DEFAULT_GENRE)]
        genre: String,
        /// Mark as already read
        #[arg(long)]
        read: bool,
    },
    /// Case-insensitive search on one field.
    Search {
        term: String,
        /// title, author, year or genre
        #[arg(long, default_value_t = SearchField::Title)]
        by: SearchField,
        #[arg(long)]
        json: bool,
    },
    /// Reading statistics.
    Stats {
        #[arg(long)]
        json: bool,
    },
    /// Genres present in the catalog.
    Genres {
        /// Show the suggested genre list instead
        #[arg(long)]
        suggested: bool,
    },
    /// Flip a book between read and unread.
    Toggle { id: String },
    /// Delete a book.
    Remove { id: String },
}

fn main() -> ExitCode {
    match try_main(Cli::parse()) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> shelf_core::Result<ExitCode> {
    let mut config = ShelfConfig::load(cli.config.as_deref())?;
    if let Some(file) = cli.file {
        config.library_file = file;
    }

    init_logging(&config.log_level);

    if let Command::Genres { suggested: true } = cli.command {
        for genre in GENRES {
            println!("{genre}");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let mut session = Session::open(&config);
    tracing::debug!(mode = %session.mode(), file = %session.file_path().display(), "session opened");

    let result = run(&mut session, cli.command);
    print_notices(session.take_notices());

    Ok(if result? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Returns whether the command succeeded.
fn run(session: &mut Session, command: Command) -> shelf_core::Result<bool> {
    match command {
        Command::List {
            status,
            genre,
            sort,
            json,
        } => {
            let books = session.filter_sort(status, &genre, sort);
            if json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else if books.is_empty() {
                println!("No books match the current filters.");
            } else {
                println!("{}", render::books(&books));
            }
            Ok(true)
        }
        Command::Add {
            title,
            author,
            year,
            genre,
            read,
        } => Ok(session.add(BookDraft::new(title, author, year, genre, read))),
        Command::Search { term, by, json } => {
            let books = session.search(&term, by);
            if json {
                println!("{}", serde_json::to_string_pretty(&books)?);
            } else if books.is_empty() {
                println!("No books found matching '{term}' in {by}.");
            } else {
                println!("{}", render::books(&books));
            }
            Ok(true)
        }
        Command::Stats { json } => {
            let stats = session.statistics();
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("{}", render::statistics(&stats));
            }
            Ok(true)
        }
        Command::Genres { .. } => {
            for genre in session.distinct_genres() {
                println!("{genre}");
            }
            Ok(true)
        }
        Command::Toggle { id } => Ok(session.toggle_read(&id)),
        Command::Remove { id } => Ok(session.remove(&id)),
    }
}

fn init_logging(level: &str) {
    // Notices are printed directly; keep them out of the log stream.
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{level},shelf_notice=off")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
            NoticeLevel::Warning => eprintln!("warning: {}", notice.message),
            NoticeLevel::Info => eprintln!("{}", notice.message),
        }
    }
}
