//! Turns the wrapper's JSON answer into price candidates.
//!
//! The answer is one object keyed by mnemonic. Every field of a leaf is
//! optional:
//!
//! ```json
//! {"ACME": {"success": true, "last": "12.34", "currency": "USD", "date": "03/04/2023"},
//!  "EUR":  {"success": false, "errormsg": "no data"}}
//! ```
//!
//! A leaf that cannot be turned into a price is skipped with a logged
//! [`SkipReason`]; only a document that is not JSON at all fails the batch.
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use log::{debug, info, warn};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::commodity::{Commodity, CommodityId, CommodityTable};
use crate::error::QuoteError;
use crate::price::PriceType;
use crate::rational::{self, Price};
use crate::result::Result;

/// Price fields in the order they are tried, with the type each one yields.
pub const PRICE_FIELDS: [(&str, PriceType); 3] = [
    ("last", PriceType::Last),
    ("nav", PriceType::Nav),
    ("price", PriceType::Unknown),
];

/// Date layout used by Finance::Quote.
const DATE_FORMAT: &str = "%m/%d/%Y";

/// Why no price was produced for a commodity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    /// No leaf for the mnemonic.
    #[error("Finance::Quote didn't return any data")]
    NoData,
    /// The leaf reports `success: false`; carries `errormsg` or `unknown`.
    #[error("Finance::Quote returned fetch failure. Reason {0}")]
    FetchFailure(String),
    /// None of the price fields is present.
    #[error("Finance::Quote didn't return a valid price")]
    NoPrice,
    /// The price text is not a number (or cannot be inverted).
    #[error("failed to parse returned price '{0}'")]
    BadPrice(String),
    /// No `currency` field.
    #[error("Finance::Quote didn't return a currency")]
    NoCurrency,
    /// The currency is not a known ISO currency.
    #[error("failed to parse returned currency '{0}'")]
    UnknownCurrency(String),
}

/// Fields of one leaf of the answer, defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuoteFields {
    /// `success`, false when absent.
    pub success: bool,
    /// Type of the price field that was found.
    pub price_type: PriceType,
    /// Text of the price field that was found.
    pub price: Option<String>,
    /// `inverted`, false when absent.
    pub inverted: bool,
    /// `date`, MM/DD/YYYY.
    pub date: Option<String>,
    /// `time`.
    pub time: Option<String>,
    /// `currency`, any case.
    pub currency: Option<String>,
    /// `errormsg`.
    pub errormsg: Option<String>,
}

impl QuoteFields {
    /// Reads a leaf. Anything but an object reads as an empty leaf.
    pub fn from_leaf(leaf: &Value) -> Self {
        let empty = Map::new();
        let leaf = leaf.as_object().unwrap_or(&empty);
        let (price_type, price) = resolve_price(leaf);
        QuoteFields {
            success: flag(leaf, "success").unwrap_or(false),
            price_type,
            price,
            inverted: flag(leaf, "inverted").unwrap_or(false),
            date: text(leaf, "date"),
            time: text(leaf, "time"),
            currency: text(leaf, "currency"),
            errormsg: text(leaf, "errormsg"),
        }
    }
}

/// First field of [`PRICE_FIELDS`] present in `leaf`; `Missing` when none is.
pub fn resolve_price(leaf: &Map<String, Value>) -> (PriceType, Option<String>) {
    PRICE_FIELDS
        .iter()
        .find_map(|(field, price_type)| text(leaf, field).map(|price| (*price_type, Some(price))))
        .unwrap_or((PriceType::Missing, None))
}

fn flag(leaf: &Map<String, Value>, key: &str) -> Option<bool> {
    match leaf.get(key)? {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(true),
            "false" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn text(leaf: &Map<String, Value>, key: &str) -> Option<String> {
    match leaf.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Local wall-clock time of a quote.
///
/// A date without time means midnight of that day; no date means today, at
/// `time` or at noon. `None` when the date or the time cannot be parsed.
pub fn quote_local_time(
    date: Option<&str>,
    time: Option<&str>,
    today: NaiveDate,
) -> Option<NaiveDateTime> {
    let (day, default_time) = match date {
        Some(date) => (
            NaiveDate::parse_from_str(date.trim(), DATE_FORMAT).ok()?,
            NaiveTime::from_hms_opt(0, 0, 0)?,
        ),
        None => (today, NaiveTime::from_hms_opt(12, 0, 0)?),
    };
    let time = match time {
        Some(time) => parse_time(time)?,
        None => default_time,
    };
    Some(day.and_time(time))
}

fn parse_time(time: &str) -> Option<NaiveTime> {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .ok()
}

/// A validated quote, ready to become a price record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceCandidate {
    /// Quoted commodity.
    pub commodity: CommodityId,
    /// Currency of `value`.
    pub currency: CommodityId,
    /// Quote time.
    pub time: DateTime<Utc>,
    /// Exact price, already inverted when the source said so.
    pub value: Price,
    /// Kind of price.
    pub price_type: PriceType,
}

/// Result for one requested commodity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteOutcome {
    /// A usable quote.
    Price(PriceCandidate),
    /// No price for `commodity`.
    Skipped {
        /// The commodity that got no price.
        commodity: CommodityId,
        /// Why.
        reason: SkipReason,
    },
}

impl QuoteOutcome {
    /// The candidate, if this is one.
    pub fn candidate(&self) -> Option<&PriceCandidate> {
        match self {
            QuoteOutcome::Price(candidate) => Some(candidate),
            QuoteOutcome::Skipped { .. } => None,
        }
    }
}

/// Parses answers against a commodity table.
#[derive(Debug, Clone)]
pub struct ResponseParser<'a> {
    table: &'a CommodityTable,
    default_currency: &'a CommodityId,
    now: DateTime<Local>,
}

impl<'a> ResponseParser<'a> {
    /// Parser resolving currencies in `table`, using the current time as
    /// fallback quote time.
    pub fn new(table: &'a CommodityTable, default_currency: &'a CommodityId) -> Self {
        Self::with_now(table, default_currency, Local::now())
    }

    /// Parser with an explicit "now".
    pub fn with_now(
        table: &'a CommodityTable,
        default_currency: &'a CommodityId,
        now: DateTime<Local>,
    ) -> Self {
        ResponseParser {
            table,
            default_currency,
            now,
        }
    }

    /// Parses the wrapper output and evaluates every commodity against it.
    ///
    /// The default currency and placeholders produce no outcome at all.
    pub fn parse(&self, lines: &[String], commodities: &[Commodity]) -> Result<Vec<QuoteOutcome>> {
        let document = parse_document(lines)?;
        Ok(commodities
            .iter()
            .filter(|c| !c.is_unquotable(self.default_currency))
            .map(|c| self.parse_one(&document, c))
            .inspect(log_outcome)
            .collect())
    }

    /// Evaluates one commodity against an already parsed document.
    pub fn parse_one(&self, document: &Map<String, Value>, commodity: &Commodity) -> QuoteOutcome {
        match self.candidate(document, commodity) {
            Ok(candidate) => QuoteOutcome::Price(candidate),
            Err(reason) => QuoteOutcome::Skipped {
                commodity: commodity.id.clone(),
                reason,
            },
        }
    }

    fn candidate(
        &self,
        document: &Map<String, Value>,
        commodity: &Commodity,
    ) -> std::result::Result<PriceCandidate, SkipReason> {
        let leaf = document.get(commodity.mnemonic()).ok_or(SkipReason::NoData)?;
        let fields = QuoteFields::from_leaf(leaf);
        debug!(
            "Commodity: {} success={} type={} price={:?} inverted={} date={:?} time={:?} currency={:?}",
            commodity.id,
            fields.success,
            fields.price_type,
            fields.price,
            fields.inverted,
            fields.date,
            fields.time,
            fields.currency
        );

        if !fields.success {
            let reason = fields.errormsg.clone().unwrap_or_else(|| String::from("unknown"));
            return Err(SkipReason::FetchFailure(reason));
        }

        let price_text = fields.price.as_deref().ok_or(SkipReason::NoPrice)?;
        let mut value = rational::parse_exact(price_text)
            .ok_or_else(|| SkipReason::BadPrice(price_text.to_string()))?;
        if fields.inverted {
            value = rational::invert(&value)
                .ok_or_else(|| SkipReason::BadPrice(price_text.to_string()))?;
        }

        let currency_text = fields.currency.as_deref().ok_or(SkipReason::NoCurrency)?;
        let currency = self
            .table
            .lookup_currency(&currency_text.trim().to_uppercase())
            .ok_or_else(|| SkipReason::UnknownCurrency(currency_text.to_string()))?;

        Ok(PriceCandidate {
            commodity: commodity.id.clone(),
            currency: currency.id.clone(),
            time: self.quote_time(&fields, &commodity.id),
            value,
            price_type: fields.price_type,
        })
    }

    fn quote_time(&self, fields: &QuoteFields, id: &CommodityId) -> DateTime<Utc> {
        if fields.date.is_none() {
            info!("No date was returned for {} - will use today", id);
        }
        quote_local_time(
            fields.date.as_deref(),
            fields.time.as_deref(),
            self.now.date_naive(),
        )
        .and_then(|naive| Local.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
        .unwrap_or_else(|| {
            info!(
                "Failed to parse quote date and time {:?} {:?} for {} - will use now",
                fields.date, fields.time, id
            );
            self.now.with_timezone(&Utc)
        })
    }
}

/// Parses the joined output lines as a JSON object.
pub fn parse_document(lines: &[String]) -> Result<Map<String, Value>> {
    let text = lines.join("\n");
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Object(document)) => Ok(document),
        Ok(other) => Err(QuoteError::ParseFailed(format!(
            "expected a JSON object, got {}",
            other
        ))),
        Err(e) => Err(QuoteError::ParseFailed(e.to_string())),
    }
}

fn log_outcome(outcome: &QuoteOutcome) {
    match outcome {
        QuoteOutcome::Price(candidate) => debug!(
            "Quote for {}: {} {} ({})",
            candidate.commodity, candidate.value, candidate.currency.mnemonic, candidate.price_type
        ),
        QuoteOutcome::Skipped {
            commodity,
            reason: SkipReason::NoData,
        } => info!("Skipped {} - {}", commodity, SkipReason::NoData),
        QuoteOutcome::Skipped { commodity, reason } => warn!("Skipped {} - {}", commodity, reason),
    }
}
