//! Store definition registry
//!
//! Each supported retailer is described by a static [`StoreDefinition`]: how
//! to build its search URL, how to coerce cheapest-first ordering on the
//! results listing, and which selectors identify the first product link. The
//! set is closed and known at build time; nothing here is configurable at
//! runtime.

use serde::{Deserialize, Serialize};

/// Best-effort UI action that reorders a results listing by ascending price.
///
/// Sort controls on these sites fall into two shapes: a dropdown that must be
/// opened and then an option clicked by its visible text, or a native
/// `<select>` element with a known value. Either way the action may silently
/// fail — listings are frequently redesigned — and the scrape continues
/// unsorted.
#[derive(Debug, Clone, Copy)]
pub enum SortAction {
    /// Click `trigger`, then click the first element whose visible text
    /// matches `option_pattern` (a case-insensitive JS regex source).
    ClickThrough {
        trigger: &'static str,
        option_pattern: &'static str,
    },
    /// Set a native `<select>` identified by `selector` to `value`.
    Select {
        selector: &'static str,
        value: &'static str,
    },
}

/// Static descriptor of how to search and extract for one retailer.
#[derive(Clone, Copy)]
pub struct StoreDefinition {
    /// Display name, also the tie-break key when no store found a price.
    pub name: &'static str,
    /// Canonical host, used to absolutize relative result links.
    pub domain: &'static str,
    /// Builds the search results URL from an already percent-encoded query.
    pub search_url: fn(&str) -> String,
    /// Cheapest-first coercion for this store's listing.
    pub sort: SortAction,
    /// Selectors for the first product link, tried in priority order.
    pub result_selectors: &'static [&'static str],
}

/// The per-store record returned to the caller, always present regardless of
/// whether the scrape succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResult {
    pub store: String,
    pub domain: String,
    pub title: String,
    pub price: Option<f64>,
    pub link: String,
}

/// All supported retailers. Order here is irrelevant; the response order is
/// always re-derived by the aggregation rank sort.
pub fn registry() -> &'static [StoreDefinition] {
    static STORES: [StoreDefinition; 6] = [
        StoreDefinition {
            name: "Ceneo",
            domain: "ceneo.pl",
            search_url: |q| format!("https://www.ceneo.pl/;szukaj={q}"),
            sort: SortAction::ClickThrough {
                trigger: "button.js_sort_filter, .sorting .btn",
                option_pattern: "Cena.*najniższej",
            },
            result_selectors: &[".cat-prod-row a.js_clickHash"],
        },
        StoreDefinition {
            name: "Allegro",
            domain: "allegro.pl",
            // order=qd already requests ascending price; the click sequence
            // below is the fallback when the listing ignores the parameter.
            search_url: |q| format!("https://allegro.pl/listing?string={q}&order=qd"),
            sort: SortAction::ClickThrough {
                trigger: "[data-role=\"sort-order\"]",
                option_pattern: "najniższa cena",
            },
            result_selectors: &["article a[href*=\"/oferta/\"]", "a._9c44d_3tX7G"],
        },
        StoreDefinition {
            name: "Media Expert",
            domain: "mediaexpert.pl",
            search_url: |q| {
                format!("https://www.mediaexpert.pl/search?query%5Bquerystring%5D={q}")
            },
            sort: SortAction::ClickThrough {
                trigger: "button[data-testid=\"SortSelect__button\"]",
                option_pattern: "cena rosnąco|najniższa",
            },
            result_selectors: &["a.product-box", "a[href*=\"/p/\"]"],
        },
        StoreDefinition {
            name: "RTV Euro AGD",
            domain: "euro.com.pl",
            search_url: |q| format!("https://www.euro.com.pl/search.bhtml?keyword={q}"),
            sort: SortAction::Select {
                selector: "#sorter",
                value: "priceAsc",
            },
            result_selectors: &["a.js-save-keyword", "a.link.js-add-to-compare"],
        },
        StoreDefinition {
            name: "MediaMarkt",
            domain: "mediamarkt.pl",
            search_url: |q| {
                format!("https://mediamarkt.pl/pl/search?query%5Bquerystring%5D={q}")
            },
            sort: SortAction::ClickThrough {
                trigger: "button[aria-haspopup=\"listbox\"], .Sort_select__trigger",
                option_pattern: "cena rosnąco",
            },
            result_selectors: &["a.ty-product-link", "a[href*=\"/p/\"]"],
        },
        StoreDefinition {
            name: "x-kom",
            domain: "x-kom.pl",
            search_url: |q| format!("https://www.x-kom.pl/szukaj?q={q}"),
            sort: SortAction::ClickThrough {
                trigger: "[data-testid=\"sortButton\"]",
                option_pattern: "cena rosnąco",
            },
            result_selectors: &["a.sc-1h16fat-0", "a[href*=\"/p/\"]"],
        },
    ];
    &STORES
}

/// Prepare raw user input for URL building: trim, strip wrapping quotes,
/// percent-encode.
pub fn encode_query(raw: &str) -> String {
    let trimmed = raw.trim();
    let unquoted = trimmed.strip_prefix('"').unwrap_or(trimmed);
    let unquoted = unquoted.strip_suffix('"').unwrap_or(unquoted);
    urlencoding::encode(unquoted).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    #[test]
    fn registry_has_six_stores() {
        assert_eq!(registry().len(), 6);
    }

    #[test]
    fn search_urls_are_well_formed_and_scoped_to_store_domain() {
        let q = encode_query("laptop gamingowy 15\"");
        for def in registry() {
            let built = (def.search_url)(&q);
            let url = Url::parse(&built).expect("search url parses");
            assert_eq!(url.scheme(), "https", "{}", def.name);
            let host = url.host_str().expect("host");
            assert!(
                host == def.domain || host.ends_with(&format!(".{}", def.domain)),
                "{}: host {host} does not match domain {}",
                def.name,
                def.domain
            );
            assert!(
                built.contains("laptop%20gamingowy"),
                "{}: encoded query missing from {built}",
                def.name
            );
        }
    }

    #[test]
    fn encode_query_strips_wrapping_quotes_and_trims() {
        assert_eq!(encode_query("  \"rtx 4070\"  "), "rtx%204070");
        assert_eq!(encode_query("zwykła fraza"), "zwyk%C5%82a%20fraza");
    }

    #[test]
    fn encode_query_keeps_interior_quotes() {
        assert_eq!(encode_query("monitor 27\" 144hz"), "monitor%2027%22%20144hz");
    }
}
