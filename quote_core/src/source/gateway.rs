//! Readiness and version handling around a [`QuoteSource`].
use log::{debug, info};
use regex::Regex;

use crate::error::QuoteError;
use crate::result::Result;
use crate::source::{QuoteSource, RawResponse};

/// Shape of the version line printed by the wrapper, e.g. `1.50`.
const VERSION_PATTERN: &str = r"^[0-9]\.[0-9][0-9]$";

/// A quote source together with what its version query reported.
#[derive(Debug)]
pub struct QuoteGateway<S> {
    source: S,
    ready: bool,
    version: String,
    sources: Vec<String>,
}

impl<S: QuoteSource> QuoteGateway<S> {
    /// Wraps `source`; not usable until [`Self::initialize`] succeeds.
    pub fn new(source: S) -> Self {
        QuoteGateway {
            source,
            ready: false,
            version: String::new(),
            sources: Vec::new(),
        }
    }

    /// Runs the version query and records version and supported sources.
    ///
    /// Fails with `SourceUnavailable` on a non-zero exit, on any diagnostic
    /// output, or when the first line is not a `d.dd` version.
    pub fn initialize(&mut self) -> Result<()> {
        let RawResponse {
            status,
            output,
            diagnostics,
        } = self.source.version_query();

        if status != 0 {
            let mut err = String::from("Failed to initialize Finance::Quote: ");
            for line in diagnostics.iter().filter(|l| !l.is_empty()) {
                err.push_str(line);
                err.push('\n');
            }
            return Err(QuoteError::SourceUnavailable(err));
        }
        if !diagnostics.is_empty() {
            let mut err = String::from("Finance::Quote check returned error ");
            for line in &diagnostics {
                err.push_str(line);
                err.push('\n');
            }
            return Err(QuoteError::SourceUnavailable(err));
        }

        let version_fmt =
            Regex::new(VERSION_PATTERN).map_err(|e| QuoteError::SourceUnavailable(e.to_string()))?;
        let mut lines = output.into_iter();
        let version = lines.next().unwrap_or_default();
        if !version_fmt.is_match(&version) {
            return Err(QuoteError::SourceUnavailable(format!(
                "Invalid Finance::Quote Version '{}'",
                version
            )));
        }

        self.sources = lines.collect();
        self.version = version;
        self.ready = true;
        info!(
            "Finance::Quote {} found, {} sources available",
            self.version,
            self.sources.len()
        );
        debug!("Finance::Quote sources: {:?}", self.sources);
        Ok(())
    }

    /// Whether [`Self::initialize`] succeeded.
    pub fn usable(&self) -> bool {
        self.ready
    }

    /// Version reported by the wrapper; empty before initialization.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Supported source identifiers, in the order reported.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Sends `request` to the quote program. An uninitialized gateway answers
    /// with a failed response without running anything.
    pub fn query(&self, request: &str) -> RawResponse {
        if !self.ready {
            return RawResponse::failed("Finance::Quote is not initialized");
        }
        self.source.query(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[derive(Debug)]
    struct VersionOnly {
        response: RawResponse,
        queries: Cell<usize>,
    }

    impl VersionOnly {
        fn new(response: RawResponse) -> Self {
            VersionOnly {
                response,
                queries: Cell::new(0),
            }
        }
    }

    impl QuoteSource for VersionOnly {
        fn version_query(&self) -> RawResponse {
            self.response.clone()
        }

        fn query(&self, _request: &str) -> RawResponse {
            self.queries.set(self.queries.get() + 1);
            RawResponse::ok(["{}"])
        }
    }

    fn init(response: RawResponse) -> Result<QuoteGateway<VersionOnly>> {
        let mut gateway = QuoteGateway::new(VersionOnly::new(response));
        gateway.initialize().map(|_| gateway)
    }

    #[test]
    fn test_version_and_sources_recorded() {
        let gateway = init(RawResponse::ok(["1.50", "yahoo_json", "currency"])).unwrap();
        assert!(gateway.usable());
        assert_eq!(gateway.version(), "1.50");
        assert_eq!(gateway.sources(), ["yahoo_json", "currency"]);
    }

    #[test]
    fn test_empty_output_is_unavailable() {
        let err = init(RawResponse::ok(Vec::<String>::new())).unwrap_err();
        assert!(matches!(err, QuoteError::SourceUnavailable(_)));
    }

    #[test]
    fn test_malformed_version_is_unavailable() {
        for bad in ["1.5", "10.50", "v1.50", "1.50 beta", ""] {
            let err = init(RawResponse::ok([bad, "yahoo_json"])).unwrap_err();
            assert!(matches!(err, QuoteError::SourceUnavailable(_)), "{bad}");
        }
    }

    #[test]
    fn test_nonzero_exit_is_unavailable() {
        let response = RawResponse {
            status: 2,
            output: vec![String::from("1.50")],
            diagnostics: vec![String::from("Can't locate Finance/Quote.pm")],
        };
        let err = init(response).unwrap_err();
        assert!(err.to_string().contains("Can't locate Finance/Quote.pm"));
    }

    #[test]
    fn test_diagnostics_are_unavailable() {
        let mut response = RawResponse::ok(["1.50"]);
        response.diagnostics.push(String::from("deprecation warning"));
        let err = init(response).unwrap_err();
        assert!(matches!(err, QuoteError::SourceUnavailable(_)));
    }

    #[test]
    fn test_uninitialized_gateway_does_not_query() {
        let gateway = QuoteGateway::new(VersionOnly::new(RawResponse::ok(["1.50"])));
        assert!(!gateway.usable());
        let response = gateway.query("{}");
        assert!(!response.is_success());
        assert_eq!(gateway.source.queries.get(), 0);
    }
}
