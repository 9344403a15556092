//! Aggregation driver
//!
//! Runs the store scraper across every registered store and imposes the final
//! ordering. Stores share no mutable state, so they run as independent units
//! under a bounded-concurrency stream; completion order is irrelevant because
//! the output order is always re-derived by [`rank_results`].

use std::cmp::Ordering;

use futures::StreamExt;
use futures::stream;

use crate::error::ScrapeError;
use crate::stores::{StoreDefinition, StoreResult};

/// Scrape every store and return one ranked result per store.
///
/// A failed store degrades to a null-price entry inside `scrape` and is never
/// dropped; `scrape` returns `Err` only for a fatal browser-runtime fault,
/// which fails the whole aggregation since every remaining store would hit
/// the same dead process. Taking the scrape step as a parameter keeps the
/// driver testable without a browser.
pub async fn scrape_all<'a, F, Fut>(
    stores: &'a [StoreDefinition],
    concurrency: usize,
    scrape: F,
) -> Result<Vec<StoreResult>, ScrapeError>
where
    F: Fn(&'a StoreDefinition) -> Fut,
    Fut: std::future::Future<Output = Result<StoreResult, ScrapeError>>,
{
    let mut results = stream::iter(stores)
        .map(scrape)
        .buffer_unordered(concurrency.max(1))
        .collect::<Vec<_>>()
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

    rank_results(&mut results);
    Ok(results)
}

/// Order results for the caller: priced entries ascending by price, priced
/// before unpriced, unpriced tie-broken lexicographically by store name so
/// the no-data case stays deterministic.
pub fn rank_results(results: &mut [StoreResult]) {
    results.sort_by(|a, b| match (a.price, b.price) {
        (Some(pa), Some(pb)) => pa.partial_cmp(&pb).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.store.cmp(&b.store),
    });
}
