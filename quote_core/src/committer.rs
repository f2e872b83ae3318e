//! Writes price candidates into a price store.
use log::debug;

use crate::price::{PRICE_SOURCE, PriceRecord, PriceStore};
use crate::response::{PriceCandidate, QuoteOutcome};
use crate::result::Result;

impl From<&PriceCandidate> for PriceRecord {
    fn from(candidate: &PriceCandidate) -> Self {
        PriceRecord {
            commodity: candidate.commodity.clone(),
            currency: candidate.currency.clone(),
            time: candidate.time,
            value: candidate.value.clone(),
            price_type: candidate.price_type,
            source: String::from(PRICE_SOURCE),
        }
    }
}

/// Adds one record per candidate in `outcomes` to `store`; skipped outcomes
/// are ignored. Returns the number of records added.
///
/// Every record is complete before it reaches the store. Nothing is
/// de-duplicated: committing the same outcomes twice adds them twice.
pub fn commit<'a, I, S>(outcomes: I, store: &mut S) -> Result<usize>
where
    I: IntoIterator<Item = &'a QuoteOutcome>,
    S: PriceStore + ?Sized,
{
    let mut added = 0;
    for candidate in outcomes.into_iter().filter_map(QuoteOutcome::candidate) {
        let record = PriceRecord::from(candidate);
        debug!(
            "Adding price {} = {} {}",
            record.commodity, record.value, record.currency.mnemonic
        );
        store.add_price(record)?;
        added += 1;
    }
    Ok(added)
}
