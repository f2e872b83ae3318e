//! Error types shared by the quote core and its front ends.
//!
//! `QuoteError` covers the batch-level failures of a quote fetch (the quote
//! source cannot be used, the query failed, the answer is not readable) plus
//! the plumbing errors around them. Problems with a single commodity are not
//! errors; see [`crate::response::SkipReason`].
use std::io;

use thiserror::Error;

/// Unified error type of the quote core.
#[derive(Error, Debug)]
pub enum QuoteError {
    /// The external quote program is missing, failed its version check, or
    /// reported an unusable version. Raised once, while initializing.
    #[error("Finance::Quote unavailable: {0}")]
    SourceUnavailable(String),

    /// The quote query exited with a non-zero status or wrote diagnostics.
    #[error("Finance::Quote fetch failed: {0}")]
    FetchFailed(String),

    /// The quote program answered with something that is not a JSON document.
    #[error("Failed to parse result returned by Finance::Quote: {0}")]
    ParseFailed(String),

    /// A commodity reference could not be understood (e.g. `NS:MNEMONIC`).
    #[error("Invalid commodity: {0}")]
    InvalidCommodity(String),

    /// The price store refused a record.
    #[error("Price store error: {0}")]
    Store(String),

    /// I/O error originating from the standard library (files, pipes).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure while encoding/decoding JSON via serde_json.
    #[error("JSON serialization/deserialization error: {0}")]
    SerdeJson(#[from] serde_json::Error),
}
