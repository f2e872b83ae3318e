//! Quote request sent to the Finance::Quote wrapper.
//!
//! The wrapper reads one JSON object on standard input: the book's default
//! currency under `defaultcurrency`, then one object per quote source whose
//! keys are the mnemonics to quote:
//!
//! ```json
//! {"defaultcurrency": "USD", "yahoo_json": {"ACME": ""}, "currency": {"EUR": ""}}
//! ```
//!
//! Each entry is addressed by the dotted key `source.mnemonic`; only the
//! first dot splits, so `BRK.B` stays a single mnemonic.
use log::warn;
use serde_json::{Map, Value};

use crate::commodity::{CURRENCY_SOURCE, Commodity, CommodityId};
use crate::result::Result;

/// Name of the top-level default currency field.
pub const DEFAULT_CURRENCY_KEY: &str = "defaultcurrency";

/// One requested quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestEntry {
    /// Quote source internal name, `currency` for currencies.
    pub source: String,
    /// Mnemonic to quote.
    pub mnemonic: String,
}

impl RequestEntry {
    /// `source.mnemonic`.
    pub fn key(&self) -> String {
        format!("{}.{}", self.source, self.mnemonic)
    }
}

/// A batch of quotes to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteRequest {
    /// Mnemonic of the book's default currency.
    pub default_currency: String,
    entries: Vec<RequestEntry>,
}

impl QuoteRequest {
    /// Empty request for a book in `default_currency`.
    pub fn new(default_currency: &str) -> Self {
        QuoteRequest {
            default_currency: String::from(default_currency),
            entries: Vec::new(),
        }
    }

    /// Adds an entry unless the same key is already present.
    pub fn insert(&mut self, source: &str, mnemonic: &str) {
        let exists = self
            .entries
            .iter()
            .any(|e| e.source == source && e.mnemonic == mnemonic);
        if !exists {
            self.entries.push(RequestEntry {
                source: String::from(source),
                mnemonic: String::from(mnemonic),
            });
        }
    }

    /// Dotted keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.entries.iter().map(RequestEntry::key).collect()
    }

    /// Number of requested quotes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is requested.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The request as a JSON value.
    pub fn to_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            String::from(DEFAULT_CURRENCY_KEY),
            Value::String(self.default_currency.clone()),
        );
        for entry in &self.entries {
            let group = root
                .entry(entry.source.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::Object(symbols) = group {
                symbols.insert(entry.mnemonic.clone(), Value::String(String::new()));
            }
        }
        Value::Object(root)
    }

    /// The request as the JSON text written to the wrapper.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.to_value())?;
        json.push('\n');
        Ok(json)
    }
}

/// Builds the request for `commodities`.
///
/// The default currency, placeholder currencies (`XXX`) and commodities with
/// an empty mnemonic are never requested.
pub fn encode(commodities: &[Commodity], default_currency: &CommodityId) -> QuoteRequest {
    let mut request = QuoteRequest::new(&default_currency.mnemonic);
    for commodity in commodities {
        if commodity.is_unquotable(default_currency) {
            continue;
        }
        let source = if commodity.is_currency() {
            CURRENCY_SOURCE
        } else {
            match commodity.quote_source.as_deref() {
                Some(source) => source,
                None => {
                    warn!("Skipped {} - no quote source assigned", commodity.id);
                    continue;
                }
            }
        };
        request.insert(source, commodity.mnemonic());
    }
    request
}
