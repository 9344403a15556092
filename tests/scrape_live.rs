//! Live scraping smoke test
//!
//! Drives a real browser against the real retailers, so it only runs when
//! explicitly requested: `cargo test --test scrape_live -- --ignored`.

use std::sync::Arc;

use pricehound::{BrowserManager, ScrapeConfig, registry, scrape_all, scrape_store};

#[tokio::test]
#[ignore] // Requires a Chrome/Chromium installation and network access
async fn live_query_returns_one_result_per_store() {
    let config = Arc::new(ScrapeConfig::default());
    let manager = BrowserManager::new(
        config.user_agent.clone(),
        config.accept_language.clone(),
    );

    let handle = manager.get_or_launch().await.expect("browser launch");
    let guard = handle.lock().await;
    let wrapper = guard.as_ref().expect("browser present");
    let browser = wrapper.browser();

    let results = scrape_all(registry(), config.max_concurrent_stores, |def| {
        scrape_store(browser, def, "laptop", &config)
    })
    .await
    .expect("healthy browser for the whole run");

    assert_eq!(results.len(), registry().len());
    for result in &results {
        assert!(
            result.link.starts_with("http"),
            "{}: link is always usable, got {}",
            result.store,
            result.link
        );
    }

    drop(guard);
    manager.shutdown().await.expect("browser shutdown");
}
