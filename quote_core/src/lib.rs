//!
//! Price quote retrieval through Finance::Quote.
//!
//! This crate aggregates:
//! - `error`: unified error type `QuoteError`.
//! - `result`: handy `Result<T, QuoteError>` alias.
//! - `config`: settings injected at construction (`QuoteConfig`).
//! - `commodity`: commodities and the in-memory `CommodityTable`.
//! - `price`: price records, the `PriceStore` trait, `PriceDb` and `Book`.
//! - `rational`: exact price values.
//! - `source`: the external quote program boundary and its gateway.
//! - `selector`: which commodities of a table get quotes.
//! - `request`: the JSON request sent to the wrapper.
//! - `response`: parsing the wrapper's answer into price candidates.
//! - `committer`: turning candidates into stored prices.
//! - `service`: the `Quotes` façade.
#![warn(missing_docs)]
pub mod commodity;
pub mod committer;
pub mod config;
pub mod error;
pub mod price;
pub mod rational;
pub mod request;
pub mod response;
pub mod result;
pub mod selector;
pub mod service;
pub mod source;

pub use commodity::{Commodity, CommodityId, CommodityTable};
pub use config::QuoteConfig;
pub use error::QuoteError;
pub use price::{Book, PriceDb, PriceRecord, PriceStore, PriceType};
pub use rational::Price;
pub use result::Result;
pub use service::{FetchSummary, Quotes};
pub use source::{QuoteSource, RawResponse};
