//! Picks the commodities of a table that should get price quotes.
use log::{debug, warn};
use regex::RegexBuilder;

use crate::commodity::{Commodity, CommodityTable};

/// Commodities of `table` with quoting enabled and a source from
/// `supported_sources`, in table order.
///
/// With a non-empty `namespace_filter` only namespaces matching it
/// (case-insensitively, anywhere in the name) are scanned. A filter that does
/// not compile selects nothing.
pub fn select_quotable(
    table: &CommodityTable,
    supported_sources: &[String],
    namespace_filter: Option<&str>,
) -> Vec<Commodity> {
    let is_quotable = |c: &&Commodity| -> bool {
        c.quote_flag
            && c.quote_source
                .as_deref()
                .is_some_and(|src| supported_sources.iter().any(|s| s == src))
    };

    match namespace_filter.filter(|expr| !expr.is_empty()) {
        Some(expression) => {
            let pattern = match RegexBuilder::new(expression).case_insensitive(true).build() {
                Ok(pattern) => pattern,
                Err(e) => {
                    warn!("Cannot compile namespace expression '{}': {}", expression, e);
                    return Vec::new();
                }
            };
            table
                .namespaces()
                .filter(|name| pattern.is_match(name))
                .filter_map(|name| table.find_namespace(name))
                .inspect(|ns| debug!("Running list of {} commodities", ns.name))
                .flat_map(|ns| ns.commodities.iter())
                .filter(is_quotable)
                .cloned()
                .collect()
        }
        None => table.commodities().filter(is_quotable).cloned().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> Vec<String> {
        vec![String::from("yahoo_json"), String::from("currency")]
    }

    fn table() -> CommodityTable {
        [
            Commodity::new("NASDAQ", "ACME").with_quote_source("yahoo_json"),
            Commodity::new("NASDAQ", "IDLE"),
            Commodity::new("NYSE", "IBM").with_quote_source("yahoo_json"),
            Commodity::new("NYSE", "OLD").with_quote_source("tsp"),
            Commodity::currency("EUR").with_quote_source("currency"),
            Commodity::currency("GBP"),
            Commodity::new("FUND", "VTSAX").with_quote_source("vanguard"),
        ]
        .into_iter()
        .collect()
    }

    fn mnemonics(commodities: &[Commodity]) -> Vec<&str> {
        commodities.iter().map(|c| c.mnemonic()).collect()
    }

    #[test]
    fn test_without_filter_scans_everything() {
        let selected = select_quotable(&table(), &supported(), None);
        assert_eq!(mnemonics(&selected), vec!["ACME", "IBM", "EUR"]);
    }

    #[test]
    fn test_empty_filter_means_no_filter() {
        let selected = select_quotable(&table(), &supported(), Some(""));
        assert_eq!(selected.len(), 3);
    }

    #[test]
    fn test_filter_is_case_insensitive_search() {
        let selected = select_quotable(&table(), &supported(), Some("ny"));
        assert_eq!(mnemonics(&selected), vec!["IBM"]);

        let selected = select_quotable(&table(), &supported(), Some("^(nasdaq|currency)$"));
        assert_eq!(mnemonics(&selected), vec!["ACME", "EUR"]);
    }

    #[test]
    fn test_bad_filter_selects_nothing() {
        let selected = select_quotable(&table(), &supported(), Some("NAS(DAQ"));
        assert!(selected.is_empty());
    }

    #[test]
    fn test_unsupported_sources_are_left_out() {
        let selected = select_quotable(&table(), &[], None);
        assert!(selected.is_empty());
    }
}
