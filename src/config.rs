//! Runtime configuration
//!
//! Timings here are empirically tuned against the supported retailers, so
//! they live in configuration with environment overrides rather than as
//! hard-coded constants.

use std::net::SocketAddr;
use std::time::Duration;

/// Desktop Chrome user agent presented to the retailers. Listing layouts and
/// anti-automation heuristics both key off this.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124 Safari/537.36";

#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Address the HTTP API binds to.
    pub bind_addr: SocketAddr,
    /// Hard ceiling for a single `page.goto`, search and product page alike.
    pub navigation_timeout_secs: u64,
    /// Ceiling per sort UI interaction (open dropdown, pick option).
    pub sort_action_timeout_ms: u64,
    /// Settle time after the sort attempt for client-rendered listings to
    /// re-render before the first result link is read.
    pub settle_delay_ms: u64,
    /// How many stores are scraped at once. Each unit owns its page; the
    /// browser process is the only shared handle.
    pub max_concurrent_stores: usize,
    /// User agent override applied to every page.
    pub user_agent: String,
    /// Accept-Language override; retailer rendering is locale-dependent.
    pub accept_language: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            bind_addr: ([0, 0, 0, 0], 8080).into(),
            navigation_timeout_secs: 15,
            sort_action_timeout_ms: 2_000,
            settle_delay_ms: 600,
            max_concurrent_stores: 3,
            user_agent: DESKTOP_USER_AGENT.to_string(),
            accept_language: "pl-PL,pl;q=0.9".to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Defaults overlaid with any `PRICEHOUND_*` environment variables.
    /// Unparseable values fall back to the default for that field.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(addr) = env_parse("PRICEHOUND_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(secs) = env_parse("PRICEHOUND_NAV_TIMEOUT_SECS") {
            config.navigation_timeout_secs = secs;
        }
        if let Some(ms) = env_parse("PRICEHOUND_SORT_TIMEOUT_MS") {
            config.sort_action_timeout_ms = ms;
        }
        if let Some(ms) = env_parse("PRICEHOUND_SETTLE_DELAY_MS") {
            config.settle_delay_ms = ms;
        }
        if let Some(n) = env_parse("PRICEHOUND_STORE_CONCURRENCY") {
            config.max_concurrent_stores = n;
        }
        if let Ok(ua) = std::env::var("PRICEHOUND_USER_AGENT") {
            config.user_agent = ua;
        }
        if let Ok(lang) = std::env::var("PRICEHOUND_ACCEPT_LANGUAGE") {
            config.accept_language = lang;
        }
        config
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn sort_action_timeout(&self) -> Duration {
        Duration::from_millis(self.sort_action_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_language_has_env_override() {
        // set_var is unsafe in edition 2024; this test owns the variable and
        // no other test reads it.
        unsafe { std::env::set_var("PRICEHOUND_ACCEPT_LANGUAGE", "de-DE,de;q=0.8") };
        let config = ScrapeConfig::from_env();
        unsafe { std::env::remove_var("PRICEHOUND_ACCEPT_LANGUAGE") };

        assert_eq!(config.accept_language, "de-DE,de;q=0.8");
        assert_eq!(
            ScrapeConfig::default().accept_language,
            "pl-PL,pl;q=0.9",
            "override must not alter the default"
        );
    }

    #[test]
    fn defaults_match_tuned_timings() {
        let config = ScrapeConfig::default();
        assert_eq!(config.navigation_timeout(), Duration::from_secs(15));
        assert_eq!(config.sort_action_timeout(), Duration::from_millis(2_000));
        assert_eq!(config.settle_delay(), Duration::from_millis(600));
        assert!(config.max_concurrent_stores >= 1);
    }
}
