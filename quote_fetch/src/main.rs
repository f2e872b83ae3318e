//! Quote Fetch: retrieves price quotes through Finance::Quote and stores them
//! in a JSON book file.
//!
//! Usage example (CLI):
//! ```bash
//! quote_fetch check
//! quote_fetch fetch --book ./book.json
//! quote_fetch fetch --book ./book.json --commodity NASDAQ:ACME --output ./priced.json
//! ```
//!
//! The book file holds the commodities (with their quote flag and source) and
//! the prices gathered so far; see `quote_core::price::Book`.
#![warn(missing_docs)]
mod args;

use crate::args::{Args, Command, FetchArgs};
use clap::Parser;
use log::{info, warn};
use quote_core::{Book, Commodity, QuoteConfig, QuoteError, Quotes, Result};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

fn main() -> Result<(), QuoteError> {
    init_logger();
    let args = Args::parse();
    let config = args.quote_config();

    match args.command {
        Command::Check => check(config),
        Command::Fetch(fetch_args) => fetch(config, fetch_args),
    }
}

fn check(config: QuoteConfig) -> Result<(), QuoteError> {
    let quotes = Quotes::new(config)?;
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "Finance::Quote version {}", quotes.version())?;
    writeln!(stdout, "Quote sources:")?;
    for source in quotes.sources() {
        writeln!(stdout, "  {}", source)?;
    }
    Ok(())
}

fn fetch(config: QuoteConfig, args: FetchArgs) -> Result<(), QuoteError> {
    let book_path = normalize_path(&args.book);
    if !is_file_exist(&book_path) {
        return Err(QuoteError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("book file {} not found", book_path.display()),
        )));
    }
    let mut book: Book = serde_json::from_reader(BufReader::new(File::open(&book_path)?))?;
    info!(
        "Loaded {} commodities and {} prices from {}",
        book.commodities.len(),
        book.prices.len(),
        book_path.display()
    );

    let quotes = Quotes::new(config)?;
    info!("Quoting in {}", quotes.default_currency());
    let summary = if args.commodities.is_empty() {
        quotes.fetch_book(&mut book)?
    } else {
        let commodities = args
            .commodities
            .iter()
            .map(|id| {
                book.commodities.get(id).cloned().ok_or_else(|| {
                    QuoteError::InvalidCommodity(format!("{} is not in the book", id))
                })
            })
            .collect::<Result<Vec<Commodity>>>()?;
        quotes.fetch(&book.commodities, &commodities, &mut book.prices)?
    };

    for (commodity, reason) in &summary.skipped {
        warn!("No price for {}: {}", commodity, reason);
    }
    info!(
        "{} commodities requested, {} prices added",
        summary.requested, summary.added
    );

    let output = args
        .output
        .as_deref()
        .map(normalize_path)
        .unwrap_or(book_path);
    save_book(&book, &output)?;
    info!("Book written to {}", output.display());
    Ok(())
}

/// Writes `book` to a temporary file beside `path`, then renames it over `path`.
fn save_book(book: &Book, path: &Path) -> Result<(), QuoteError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(file.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, book)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
    }
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

fn init_logger() {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();
}

/// Normalize a CLI-provided path string by trimming whitespace and matching quotes.
///
/// This allows passing Windows paths in quotes without breaking parsing.
fn normalize_path(raw: &str) -> PathBuf {
    let trimmed = raw.trim();
    let no_quotes = trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(trimmed);
    PathBuf::from(no_quotes)
}

/// Returns `true` if the provided path exists and is a regular file.
fn is_file_exist(path: &Path) -> bool {
    path.exists() && path.is_file()
}
