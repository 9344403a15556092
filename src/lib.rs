pub mod aggregate;
pub mod api;
pub mod browser;
pub mod config;
pub mod error;
pub mod extract;
pub mod price;
pub mod scrape;
pub mod stores;

pub use aggregate::{rank_results, scrape_all};
pub use api::{AppState, build_app};
pub use browser::{BrowserManager, BrowserWrapper, find_browser_executable};
pub use config::ScrapeConfig;
pub use error::ScrapeError;
pub use extract::{Listing, extract_listing};
pub use price::parse_price;
pub use scrape::scrape_store;
pub use stores::{SortAction, StoreDefinition, StoreResult, registry};
