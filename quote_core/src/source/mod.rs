//! Boundary to the external quote program.
//!
//! - `QuoteSource`: the capability of running the quote program: a version
//!   query and a quote query, both answering with a [`RawResponse`].
//! - `process`: [`FinanceQuoteSource`], the production adapter spawning the
//!   Finance::Quote wrapper.
//! - `gateway`: [`QuoteGateway`], validating the version query and holding
//!   the supported source list.
pub mod gateway;
pub mod process;

pub use gateway::QuoteGateway;
pub use process::FinanceQuoteSource;

use crate::error::QuoteError;
use crate::result::Result;

/// Exit status reported when the program could not be run at all.
pub const FAILED_STATUS: i32 = -1;

/// Everything one run of the quote program produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    /// Process exit status; `FAILED_STATUS` if it could not be run.
    pub status: i32,
    /// Lines written to standard output.
    pub output: Vec<String>,
    /// Lines written to standard error.
    pub diagnostics: Vec<String>,
}

impl RawResponse {
    /// A successful run with the given output lines.
    pub fn ok<I, L>(output: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<String>,
    {
        RawResponse {
            status: 0,
            output: output.into_iter().map(Into::into).collect(),
            diagnostics: Vec::new(),
        }
    }

    /// A run that never happened, `reason` being the only diagnostic.
    pub fn failed(reason: impl Into<String>) -> Self {
        RawResponse {
            status: FAILED_STATUS,
            output: Vec::new(),
            diagnostics: vec![reason.into()],
        }
    }

    /// Zero exit status and a silent standard error.
    pub fn is_success(&self) -> bool {
        self.status == 0 && self.diagnostics.is_empty()
    }

    /// Diagnostics joined one per line.
    pub fn diagnostic_text(&self) -> String {
        self.diagnostics
            .iter()
            .filter(|line| !line.is_empty())
            .fold(String::new(), |mut acc, line| {
                acc.push_str(line);
                acc.push('\n');
                acc
            })
    }

    /// The output lines of a successful query, `FetchFailed` otherwise.
    pub fn into_output(self) -> Result<Vec<String>> {
        if self.is_success() {
            Ok(self.output)
        } else {
            let mut text = self.diagnostic_text();
            if text.is_empty() {
                text = format!("exit status {}", self.status);
            }
            Err(QuoteError::FetchFailed(text))
        }
    }
}

/// Runs the external quote program.
///
/// Implementations never fail: whatever goes wrong is reported through the
/// status and diagnostics of the returned [`RawResponse`].
pub trait QuoteSource {
    /// Runs the version/capability query (`-v`) with empty input.
    fn version_query(&self) -> RawResponse;

    /// Runs a quote query (`-f`) with `request` on standard input.
    fn query(&self, request: &str) -> RawResponse;
}

impl<S: QuoteSource + ?Sized> QuoteSource for Box<S> {
    fn version_query(&self) -> RawResponse {
        (**self).version_query()
    }

    fn query(&self, request: &str) -> RawResponse {
        (**self).query(request)
    }
}
