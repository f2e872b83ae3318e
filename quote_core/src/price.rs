//! Price records and the store they are committed to.
//!
//! A `PriceRecord` is the canonical outcome of a successful quote: which
//! commodity, priced in which currency, at what time, for how much, and what
//! kind of price it was. Records are handed to a [`PriceStore`] in one piece.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

use crate::commodity::{CommodityId, CommodityTable};
use crate::rational::{self, Price};
use crate::result::Result;

/// Source tag of every price created by the quote core.
pub const PRICE_SOURCE: &str = "Finance::Quote";

/// Kind of price reported by the quote source.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PriceType {
    /// Last trade price.
    Last,
    /// Net asset value (funds).
    Nav,
    /// A plain `price` field of unspecified kind.
    Unknown,
    /// No price field at all.
    Missing,
}

/// A price of one commodity expressed in a currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRecord {
    /// Priced commodity.
    pub commodity: CommodityId,
    /// Currency the value is expressed in.
    pub currency: CommodityId,
    /// Quote time.
    pub time: DateTime<Utc>,
    /// Exact value of one unit of `commodity` in `currency`.
    #[serde(with = "rational::as_text")]
    pub value: Price,
    /// Kind of price.
    #[serde(rename = "type")]
    pub price_type: PriceType,
    /// Where the price came from.
    pub source: String,
}

/// Something prices can be added to.
pub trait PriceStore {
    /// Adds a fully populated record.
    fn add_price(&mut self, price: PriceRecord) -> Result<()>;
}

/// In-memory price database. Keeps every record it is given, duplicates included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PriceDb {
    prices: Vec<PriceRecord>,
}

impl PriceDb {
    /// Empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// All records, oldest insertion first.
    pub fn prices(&self) -> &[PriceRecord] {
        &self.prices
    }

    /// Records of one commodity.
    pub fn prices_for<'a>(
        &'a self,
        commodity: &'a CommodityId,
    ) -> impl Iterator<Item = &'a PriceRecord> + 'a {
        self.prices.iter().filter(move |p| &p.commodity == commodity)
    }

    /// Most recent record of `commodity` in `currency`.
    pub fn latest_price(
        &self,
        commodity: &CommodityId,
        currency: &CommodityId,
    ) -> Option<&PriceRecord> {
        self.prices
            .iter()
            .filter(|p| &p.commodity == commodity && &p.currency == currency)
            .max_by_key(|p| p.time)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.prices.len()
    }

    /// True when no record was added yet.
    pub fn is_empty(&self) -> bool {
        self.prices.is_empty()
    }
}

impl PriceStore for PriceDb {
    fn add_price(&mut self, price: PriceRecord) -> Result<()> {
        self.prices.push(price);
        Ok(())
    }
}

/// Commodities together with their prices, as stored in a book file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    /// Commodity registry.
    pub commodities: CommodityTable,
    /// Price database.
    #[serde(default)]
    pub prices: PriceDb,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::commodity::Commodity;
    use crate::rational::parse_exact;
    use std::str::FromStr;

    fn record(day: u32, value: &str) -> PriceRecord {
        PriceRecord {
            commodity: CommodityId::new("NASDAQ", "ACME"),
            currency: CommodityId::currency("USD"),
            time: Utc.with_ymd_and_hms(2023, 3, day, 12, 0, 0).unwrap(),
            value: parse_exact(value).unwrap(),
            price_type: PriceType::Last,
            source: String::from(PRICE_SOURCE),
        }
    }

    #[test]
    fn test_price_type_tags() {
        assert_eq!(PriceType::Last.to_string(), "last");
        assert_eq!(PriceType::Nav.as_ref(), "nav");
        assert_eq!(PriceType::from_str("unknown").unwrap(), PriceType::Unknown);
        assert_eq!(serde_json::to_string(&PriceType::Missing).unwrap(), "\"missing\"");
    }

    #[test]
    fn test_latest_price_picks_newest() {
        let mut db = PriceDb::new();
        db.add_price(record(4, "12.34")).unwrap();
        db.add_price(record(6, "13.00")).unwrap();
        db.add_price(record(5, "12.50")).unwrap();

        let latest = db
            .latest_price(&CommodityId::new("NASDAQ", "ACME"), &CommodityId::currency("USD"))
            .unwrap();
        assert_eq!(latest.value, parse_exact("13").unwrap());
        assert!(
            db.latest_price(&CommodityId::new("NASDAQ", "ACME"), &CommodityId::currency("EUR"))
                .is_none()
        );
        assert_eq!(db.prices_for(&CommodityId::new("NASDAQ", "ACME")).count(), 3);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut db = PriceDb::new();
        db.add_price(record(4, "12.34")).unwrap();
        db.add_price(record(4, "12.34")).unwrap();
        assert_eq!(db.len(), 2);
    }

    #[test]
    fn test_book_keeps_exact_values() {
        let mut book = Book::default();
        book.commodities.insert(Commodity::currency("USD"));
        book.prices.add_price(record(4, "1/3")).unwrap();

        let json = serde_json::to_string(&book).unwrap();
        assert!(json.contains("\"value\":\"1/3\""), "{json}");
        let loaded: Book = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded, book);
    }

    #[test]
    fn test_book_loads_without_prices() {
        let json = r#"{"commodities": [{"namespace": "CURRENCY", "mnemonic": "USD"}]}"#;
        let book: Book = serde_json::from_str(json).unwrap();
        assert_eq!(book.commodities.len(), 1);
        assert!(book.prices.is_empty());
    }
}
