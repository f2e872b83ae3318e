//! `Quotes`: the entry point tying selection, request, query, parsing and
//! commit together.
//!
//! A fetch is synchronous: one wrapper process is spawned per call and the
//! call returns once its prices are in the store. A `Quotes` value holds no
//! lock; concurrent callers need separate instances or their own
//! serialization.
use log::{debug, info};

use crate::commodity::{Commodity, CommodityId, CommodityTable};
use crate::committer;
use crate::config::QuoteConfig;
use crate::price::{Book, PriceStore};
use crate::request;
use crate::response::{QuoteOutcome, ResponseParser, SkipReason};
use crate::result::Result;
use crate::selector;
use crate::source::{FinanceQuoteSource, QuoteGateway, QuoteSource};

/// Reported by [`Quotes::version`] when no version is known.
pub const VERSION_NOT_FOUND: &str = "Not Found";

/// What one fetch did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    /// Number of commodities handed to the fetch.
    pub requested: usize,
    /// Number of prices added to the store.
    pub added: usize,
    /// Commodities that got no price, with the reason.
    pub skipped: Vec<(CommodityId, SkipReason)>,
}

/// Price quote service on top of a [`QuoteSource`].
#[derive(Debug)]
pub struct Quotes<S> {
    gateway: QuoteGateway<S>,
    default_currency: CommodityId,
    namespace_filter: Option<String>,
}

impl Quotes<FinanceQuoteSource> {
    /// Locates and checks the Finance::Quote wrapper described by `config`.
    pub fn new(config: QuoteConfig) -> Result<Self> {
        let source = FinanceQuoteSource::new(&config)?;
        Self::with_source(source, config)
    }
}

impl<S: QuoteSource> Quotes<S> {
    /// Builds the service around `source`, running its version check once.
    pub fn with_source(source: S, config: QuoteConfig) -> Result<Self> {
        let mut gateway = QuoteGateway::new(source);
        gateway.initialize()?;
        Ok(Quotes {
            gateway,
            default_currency: CommodityId::currency(&config.default_currency),
            namespace_filter: config.namespace_filter,
        })
    }

    /// Fetches quotes for every quotable commodity of `book` into its price
    /// database.
    pub fn fetch_book(&self, book: &mut Book) -> Result<FetchSummary> {
        let commodities = selector::select_quotable(
            &book.commodities,
            self.gateway.sources(),
            self.namespace_filter.as_deref(),
        );
        info!("{} quotable commodities", commodities.len());
        self.fetch(&book.commodities, &commodities, &mut book.prices)
    }

    /// Fetches quotes for `commodities` into `store`, resolving currencies in
    /// `table`.
    ///
    /// Fails as a whole only if the query fails or its answer is not JSON;
    /// nothing is stored then. Commodities without a usable quote are listed
    /// in the summary.
    pub fn fetch<P>(
        &self,
        table: &CommodityTable,
        commodities: &[Commodity],
        store: &mut P,
    ) -> Result<FetchSummary>
    where
        P: PriceStore + ?Sized,
    {
        if commodities.is_empty() {
            return Ok(FetchSummary::default());
        }

        let request = request::encode(commodities, &self.default_currency);
        let payload = request.to_json()?;
        debug!("Finance::Quote request: {}", payload.trim_end());

        let output = self.gateway.query(&payload).into_output()?;
        let parser = ResponseParser::new(table, &self.default_currency);
        let outcomes = parser.parse(&output, commodities)?;
        let added = committer::commit(&outcomes, store)?;

        let skipped = outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                QuoteOutcome::Skipped { commodity, reason } => Some((commodity, reason)),
                QuoteOutcome::Price(_) => None,
            })
            .collect::<Vec<_>>();
        info!(
            "Finance::Quote fetch: {} requested, {} prices added, {} skipped",
            commodities.len(),
            added,
            skipped.len()
        );
        Ok(FetchSummary {
            requested: commodities.len(),
            added,
            skipped,
        })
    }

    /// Fetches the quote of a single commodity.
    pub fn fetch_one<P>(
        &self,
        table: &CommodityTable,
        commodity: &Commodity,
        store: &mut P,
    ) -> Result<FetchSummary>
    where
        P: PriceStore + ?Sized,
    {
        self.fetch(table, std::slice::from_ref(commodity), store)
    }

    /// Finance::Quote version, or [`VERSION_NOT_FOUND`].
    pub fn version(&self) -> &str {
        match self.gateway.version() {
            "" => VERSION_NOT_FOUND,
            version => version,
        }
    }

    /// Quote sources supported by the installed Finance::Quote.
    pub fn sources(&self) -> &[String] {
        self.gateway.sources()
    }

    /// Owned copy of [`Self::sources`].
    pub fn sources_as_list(&self) -> Vec<String> {
        self.gateway.sources().to_vec()
    }

    /// Currency the book is kept in.
    pub fn default_currency(&self) -> &CommodityId {
        &self.default_currency
    }
}
