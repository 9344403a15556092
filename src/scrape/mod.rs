//! Per-store scraping pipeline
//!
//! One invocation drives one retailer end-to-end: open a fresh page in its
//! own browser context, load the search results, coerce cheapest-first
//! ordering, open the first result, and extract a listing from it. Store-level
//! faults are contained here and degrade to the search URL with a null price;
//! a browser-runtime fault is the one exception and propagates to the caller,
//! since every other store shares the same dead process.

mod page_guard;
mod sort;

pub use page_guard::PageGuard;
pub use sort::attempt_cheapest_first;

use std::time::Duration;

use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::cdp::browser_protocol::browser::BrowserContextId;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::Page;
use tokio::time::timeout;
use tracing::{debug, warn};
use url::Url;

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use crate::extract::{self, Listing};
use crate::stores::{StoreDefinition, StoreResult, encode_query};

/// Title used when no result page was opened; the link then points at the
/// search listing itself so the caller always has somewhere to go.
pub const SEARCH_FALLBACK_TITLE: &str = "Przejdź do wyszukiwania w sklepie";

/// Scrape one store for the given raw query.
///
/// Navigation errors, timeouts, missing results and extraction problems all
/// degrade to a null-price result carrying the search URL. Only a fatal
/// browser-runtime fault surfaces as `Err` — that one aborts the whole
/// request, not just this store.
pub async fn scrape_store(
    browser: &Browser,
    def: &StoreDefinition,
    query: &str,
    config: &ScrapeConfig,
) -> Result<StoreResult, ScrapeError> {
    let encoded = encode_query(query);
    let search_url = (def.search_url)(&encoded);

    let mut result = StoreResult {
        store: def.name.to_string(),
        domain: def.domain.to_string(),
        title: SEARCH_FALLBACK_TITLE.to_string(),
        price: None,
        link: search_url.clone(),
    };

    match run_pipeline(browser, def, &search_url, config).await {
        Ok(Some((listing, link))) => {
            debug!(store = def.name, price = ?listing.price, "store scrape completed");
            result.title = listing.title;
            result.price = listing.price;
            result.link = link;
        }
        Ok(None) => {
            debug!(store = def.name, "no result link on search listing");
        }
        Err(e) if e.is_fatal() => {
            warn!(store = def.name, error = %e, "browser runtime fault, aborting request");
            return Err(e);
        }
        Err(e) => {
            warn!(store = def.name, error = %e, "store scrape aborted");
        }
    }

    Ok(result)
}

/// The fallible part of the pipeline. `Ok(None)` means the listing had no
/// recognizable result link — a valid "found nothing" outcome, distinct from
/// a fault.
///
/// Each invocation runs in its own browser context, so one store's cookies
/// and cache never leak into another's, concurrent or not. The context is
/// disposed on every exit path; disposal also tears down any page still alive
/// inside it.
async fn run_pipeline(
    browser: &Browser,
    def: &StoreDefinition,
    search_url: &str,
    config: &ScrapeConfig,
) -> Result<Option<(Listing, String)>, ScrapeError> {
    let context_id = browser
        .execute(CreateBrowserContextParams::default())
        .await
        .map_err(|e| ScrapeError::Runtime(format!("failed to create browser context: {e}")))?
        .result
        .browser_context_id;

    let outcome = scrape_in_context(browser, def, search_url, config, context_id.clone()).await;

    if let Err(e) = browser
        .execute(DisposeBrowserContextParams::new(context_id))
        .await
    {
        debug!(store = def.name, error = %e, "failed to dispose browser context");
    }

    outcome
}

async fn scrape_in_context(
    browser: &Browser,
    def: &StoreDefinition,
    search_url: &str,
    config: &ScrapeConfig,
    context_id: BrowserContextId,
) -> Result<Option<(Listing, String)>, ScrapeError> {
    let target = CreateTargetParams::builder()
        .url("about:blank")
        .browser_context_id(context_id)
        .build()
        .map_err(|e| ScrapeError::Runtime(format!("failed to build page target: {e}")))?;

    let page = PageGuard::new(
        browser
            .new_page(target)
            .await
            .map_err(|e| ScrapeError::Runtime(format!("failed to open page: {e}")))?,
        def.name,
    );

    apply_identity(&page, config).await;

    with_nav_timeout(
        page.goto(search_url),
        config.navigation_timeout(),
        "search navigation",
    )
    .await?;

    if let Err(e) = attempt_cheapest_first(&page, def.sort, config.sort_action_timeout()).await {
        // Best-effort by contract; an unsorted listing still yields a match.
        debug!(store = def.name, error = %e, "cheapest-first sort not applied");
    }

    // Client-rendered listings re-paint after sorting; give them a moment
    // before reading the first result link.
    tokio::time::sleep(config.settle_delay()).await;

    let Some(href) = first_result_href(&page, def.result_selectors).await else {
        return Ok(None);
    };

    let link = absolutize(&href, def.domain);

    with_nav_timeout(
        page.goto(link.as_str()),
        config.navigation_timeout(),
        "product navigation",
    )
    .await?;

    let html = page
        .content()
        .await
        .map_err(|e| ScrapeError::Extraction(format!("failed to snapshot product page: {e}")))?;

    Ok(Some((extract::extract_listing(&html), link)))
}

/// Present a realistic desktop identity: user agent plus Accept-Language.
/// Retailer anti-automation heuristics and locale-dependent rendering both
/// depend on this. Failure is logged and ignored — the scrape may still work.
async fn apply_identity(page: &Page, config: &ScrapeConfig) {
    let params = SetUserAgentOverrideParams {
        user_agent: config.user_agent.clone(),
        accept_language: Some(config.accept_language.clone()),
        platform: Some("Win32".to_string()),
        user_agent_metadata: None,
    };
    if let Err(e) = page.execute(params).await {
        warn!("Failed to apply user agent override: {e}");
    }
}

/// First matching result link, honoring the selector priority order.
async fn first_result_href(page: &Page, selectors: &[&str]) -> Option<String> {
    for selector in selectors {
        if let Ok(element) = page.find_element(*selector).await
            && let Ok(Some(href)) = element.attribute("href").await
            && !href.is_empty()
        {
            return Some(href);
        }
    }
    None
}

/// Join a result href against the store's canonical host. Absolute links
/// pass through unchanged.
fn absolutize(href: &str, domain: &str) -> String {
    match Url::parse(&format!("https://{domain}/")) {
        Ok(base) => match base.join(href) {
            Ok(url) => url.to_string(),
            Err(_) => format!("https://{domain}{href}"),
        },
        Err(_) => format!("https://{domain}{href}"),
    }
}

/// Wrap a navigation future with the configured hard ceiling, folding both
/// failure modes into [`ScrapeError::Navigation`].
async fn with_nav_timeout<F, T, E>(
    operation: F,
    limit: Duration,
    what: &str,
) -> Result<T, ScrapeError>
where
    F: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    match timeout(limit, operation).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ScrapeError::Navigation(format!("{what}: {e}"))),
        Err(_) => Err(ScrapeError::Navigation(format!(
            "{what} timed out after {limit:?}"
        ))),
    }
}
