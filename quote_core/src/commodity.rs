//! Commodities (securities, funds, currencies) and the table that holds them.
//!
//! The quote core only reads commodities: it needs their identity, whether
//! quoting is enabled and which quote source is assigned. `CommodityTable` is
//! a small in-memory registry keeping namespaces and commodities in insertion
//! order, which is the order quotes are requested and reported in.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QuoteError;

/// Namespace of ISO 4217 currencies.
pub const CURRENCY_NAMESPACE: &str = "CURRENCY";
/// Legacy name of the currency namespace, accepted on lookup.
pub const ISO_NAMESPACE: &str = "ISO4217";
/// Quote source used for every currency.
pub const CURRENCY_SOURCE: &str = "currency";
/// Placeholder mnemonic for "no currency"; never quoted.
pub const PLACEHOLDER_MNEMONIC: &str = "XXX";

fn canonical_namespace(namespace: &str) -> &str {
    if namespace.eq_ignore_ascii_case(ISO_NAMESPACE) {
        CURRENCY_NAMESPACE
    } else {
        namespace
    }
}

/// Identity of a commodity: namespace plus mnemonic.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CommodityId {
    /// Namespace, e.g. `NASDAQ` or `CURRENCY`.
    pub namespace: String,
    /// Mnemonic (ticker symbol or ISO code).
    pub mnemonic: String,
}

impl CommodityId {
    /// Creates an id, folding the `ISO4217` alias into `CURRENCY`.
    pub fn new(namespace: &str, mnemonic: &str) -> Self {
        CommodityId {
            namespace: String::from(canonical_namespace(namespace)),
            mnemonic: String::from(mnemonic),
        }
    }

    /// Id of the ISO currency with the given code.
    pub fn currency(code: &str) -> Self {
        Self::new(CURRENCY_NAMESPACE, code)
    }

    /// Whether this id lives in the currency namespace.
    pub fn is_currency(&self) -> bool {
        self.namespace == CURRENCY_NAMESPACE
    }
}

impl fmt::Display for CommodityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.mnemonic)
    }
}

impl FromStr for CommodityId {
    type Err = QuoteError;

    /// Parses `NAMESPACE:MNEMONIC`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().split_once(':') {
            Some((ns, mnemonic)) if !ns.is_empty() && !mnemonic.is_empty() => {
                Ok(CommodityId::new(ns, mnemonic))
            }
            _ => Err(QuoteError::InvalidCommodity(format!(
                "expected NAMESPACE:MNEMONIC, got '{}'",
                s
            ))),
        }
    }
}

/// A tradable commodity as seen by the quote core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commodity {
    /// Namespace and mnemonic.
    #[serde(flatten)]
    pub id: CommodityId,
    /// Human readable name.
    #[serde(default)]
    pub fullname: String,
    /// Whether quotes should be retrieved for this commodity.
    #[serde(default)]
    pub quote_flag: bool,
    /// Internal name of the assigned quote source, e.g. `yahoo_json`.
    #[serde(default)]
    pub quote_source: Option<String>,
}

impl Commodity {
    /// A commodity with quoting disabled and no source.
    pub fn new(namespace: &str, mnemonic: &str) -> Self {
        Commodity {
            id: CommodityId::new(namespace, mnemonic),
            fullname: String::new(),
            quote_flag: false,
            quote_source: None,
        }
    }

    /// An ISO currency, quoted through the `currency` source when enabled.
    pub fn currency(code: &str) -> Self {
        Commodity {
            quote_source: Some(String::from(CURRENCY_SOURCE)),
            ..Self::new(CURRENCY_NAMESPACE, code)
        }
    }

    /// Enables quoting through `source`.
    pub fn with_quote_source(mut self, source: &str) -> Self {
        self.quote_flag = true;
        self.quote_source = Some(String::from(source));
        self
    }

    /// Namespace name.
    pub fn namespace(&self) -> &str {
        &self.id.namespace
    }

    /// Mnemonic.
    pub fn mnemonic(&self) -> &str {
        &self.id.mnemonic
    }

    /// Whether this is an ISO currency.
    pub fn is_currency(&self) -> bool {
        self.id.is_currency()
    }

    /// True for an empty or `XXX` mnemonic.
    pub fn is_placeholder(&self) -> bool {
        self.id.mnemonic.is_empty() || self.id.mnemonic == PLACEHOLDER_MNEMONIC
    }

    /// Commodities that are never requested nor priced: the default currency
    /// itself and placeholders.
    pub fn is_unquotable(&self, default_currency: &CommodityId) -> bool {
        self.id == *default_currency || self.is_placeholder()
    }
}

/// All commodities of one namespace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommodityNamespace {
    /// Namespace name.
    pub name: String,
    /// Commodities in insertion order.
    pub commodities: Vec<Commodity>,
}

/// In-memory commodity registry.
///
/// Serialized as a flat list of commodities; namespaces are rebuilt on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<Commodity>", into = "Vec<Commodity>")]
pub struct CommodityTable {
    namespaces: Vec<CommodityNamespace>,
}

impl CommodityTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `commodity`, replacing an existing one with the same id.
    pub fn insert(&mut self, mut commodity: Commodity) {
        let name = canonical_namespace(commodity.namespace()).to_string();
        commodity.id.namespace = name.clone();
        let ns = match self.namespaces.iter().position(|ns| ns.name == name) {
            Some(idx) => &mut self.namespaces[idx],
            None => {
                self.namespaces.push(CommodityNamespace {
                    name,
                    commodities: Vec::new(),
                });
                let last = self.namespaces.len() - 1;
                &mut self.namespaces[last]
            }
        };
        match ns.commodities.iter_mut().find(|c| c.id == commodity.id) {
            Some(existing) => *existing = commodity,
            None => ns.commodities.push(commodity),
        }
    }

    /// Namespace names in insertion order.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.namespaces.iter().map(|ns| ns.name.as_str())
    }

    /// The namespace called `name` (the `ISO4217` alias included).
    pub fn find_namespace(&self, name: &str) -> Option<&CommodityNamespace> {
        let name = canonical_namespace(name);
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    /// Every commodity, namespace by namespace.
    pub fn commodities(&self) -> impl Iterator<Item = &Commodity> {
        self.namespaces.iter().flat_map(|ns| ns.commodities.iter())
    }

    /// Looks up a commodity by namespace and mnemonic.
    pub fn lookup(&self, namespace: &str, mnemonic: &str) -> Option<&Commodity> {
        self.find_namespace(namespace)?
            .commodities
            .iter()
            .find(|c| c.mnemonic() == mnemonic)
    }

    /// Looks up a commodity by id.
    pub fn get(&self, id: &CommodityId) -> Option<&Commodity> {
        self.lookup(&id.namespace, &id.mnemonic)
    }

    /// Looks up an ISO currency by its (exact case) code.
    pub fn lookup_currency(&self, code: &str) -> Option<&Commodity> {
        self.lookup(CURRENCY_NAMESPACE, code)
    }

    /// Number of commodities.
    pub fn len(&self) -> usize {
        self.namespaces.iter().map(|ns| ns.commodities.len()).sum()
    }

    /// True when the table holds no commodity.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Vec<Commodity>> for CommodityTable {
    fn from(commodities: Vec<Commodity>) -> Self {
        let mut table = CommodityTable::new();
        for commodity in commodities {
            table.insert(commodity);
        }
        table
    }
}

impl From<CommodityTable> for Vec<Commodity> {
    fn from(table: CommodityTable) -> Self {
        table
            .namespaces
            .into_iter()
            .flat_map(|ns| ns.commodities)
            .collect()
    }
}

impl FromIterator<Commodity> for CommodityTable {
    fn from_iter<I: IntoIterator<Item = Commodity>>(iter: I) -> Self {
        CommodityTable::from(iter.into_iter().collect::<Vec<_>>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> CommodityTable {
        [
            Commodity::currency("USD"),
            Commodity::new("NASDAQ", "ACME").with_quote_source("yahoo_json"),
            Commodity::currency("EUR"),
            Commodity::new("FUND", "VTSAX"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_namespaces_keep_insertion_order() {
        let table = sample_table();
        let names: Vec<&str> = table.namespaces().collect();
        assert_eq!(names, vec!["CURRENCY", "NASDAQ", "FUND"]);

        let mnemonics: Vec<&str> = table.commodities().map(|c| c.mnemonic()).collect();
        assert_eq!(mnemonics, vec!["USD", "EUR", "ACME", "VTSAX"]);
    }

    #[test]
    fn test_iso_alias_resolves_to_currency_namespace() {
        let table = sample_table();
        assert!(table.lookup(ISO_NAMESPACE, "EUR").is_some());
        assert!(table.lookup_currency("EUR").is_some());
        assert!(table.lookup_currency("eur").is_none());
        assert_eq!(CommodityId::new("ISO4217", "GBP"), CommodityId::currency("GBP"));
    }

    #[test]
    fn test_insert_replaces_same_id() {
        let mut table = sample_table();
        table.insert(Commodity::new("FUND", "VTSAX").with_quote_source("vanguard"));
        assert_eq!(table.len(), 4);
        let fund = table.lookup("FUND", "VTSAX").unwrap();
        assert!(fund.quote_flag);
        assert_eq!(fund.quote_source.as_deref(), Some("vanguard"));
    }

    #[test]
    fn test_unquotable_commodities() {
        let usd = CommodityId::currency("USD");
        assert!(Commodity::currency("USD").is_unquotable(&usd));
        assert!(Commodity::currency("XXX").is_unquotable(&usd));
        assert!(Commodity::new("NASDAQ", "").is_unquotable(&usd));
        assert!(!Commodity::currency("EUR").is_unquotable(&usd));
        assert!(!Commodity::new("NASDAQ", "USD").is_unquotable(&usd));
    }

    #[test]
    fn test_parse_commodity_id() {
        let id: CommodityId = "NASDAQ:ACME".parse().unwrap();
        assert_eq!(id, CommodityId::new("NASDAQ", "ACME"));
        assert_eq!(id.to_string(), "NASDAQ:ACME");
        assert!("ACME".parse::<CommodityId>().is_err());
        assert!(":ACME".parse::<CommodityId>().is_err());
    }

    #[test]
    fn test_table_json_is_a_flat_list() {
        let table = sample_table();
        let json = serde_json::to_string(&table).unwrap();
        assert!(json.starts_with('['));
        let back: CommodityTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"[{"namespace": "NYSE", "mnemonic": "IBM"}]"#;
        let table: CommodityTable = serde_json::from_str(json).unwrap();
        let ibm = table.lookup("NYSE", "IBM").unwrap();
        assert!(!ibm.quote_flag);
        assert!(ibm.quote_source.is_none());
    }
}
