//! Product-page extraction
//!
//! Turns a snapshot of a loaded product page into a best-effort
//! `(title, price)` pair. Extraction is pure — the store scraper captures the
//! rendered HTML via CDP and hands it over, which keeps this logic testable
//! without a browser.
//!
//! Structured data is trusted over visible markup: JSON-LD survives
//! responsive redesigns that mangle the visible price layout.

use std::sync::OnceLock;

use scraper::{Html, Selector};
use serde_json::Value;

use crate::price::{parse_price, price_from_json};

/// Placeholder title when a product page exposes no usable heading.
pub const DEFAULT_TITLE: &str = "Produkt";

/// Visible price-bearing selectors common across the supported retailers,
/// in priority order of reliability.
const PRICE_SELECTOR: &str =
    "[itemprop=\"price\"], .price, .product-price, .a-price-whole, [data-price], .price__value";

const JSON_LD_SELECTOR: &str = "script[type=\"application/ld+json\"]";

/// Best-effort extraction result for one product page.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub title: String,
    pub price: Option<f64>,
}

fn selector(src: &'static str, slot: &'static OnceLock<Selector>) -> &'static Selector {
    slot.get_or_init(|| Selector::parse(src).expect("valid static selector"))
}

fn h1_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector("h1", &SEL)
}

fn json_ld_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector(JSON_LD_SELECTOR, &SEL)
}

fn price_selector() -> &'static Selector {
    static SEL: OnceLock<Selector> = OnceLock::new();
    selector(PRICE_SELECTOR, &SEL)
}

/// Extract a listing from product-page HTML.
///
/// Never fails: every sub-step swallows its own problems and falls through,
/// terminating at worst with the placeholder title and no price.
pub fn extract_listing(html: &str) -> Listing {
    let doc = Html::parse_document(html);

    let page_title = doc
        .select(h1_selector())
        .next()
        .map(|h| collapse_text(&h.text().collect::<String>()))
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    if let Some((name, price)) = structured_data_price(&doc) {
        return Listing {
            title: name.unwrap_or(page_title),
            price: Some(price),
        };
    }

    let price = doc.select(price_selector()).next().and_then(|el| {
        let text = collapse_text(&el.text().collect::<String>());
        parse_price(&text).or_else(|| {
            // itemprop/data-price carriers are often attribute-only elements
            // with no text node at all.
            el.attr("content")
                .or_else(|| el.attr("data-price"))
                .and_then(parse_price)
        })
    });

    Listing {
        title: page_title,
        price,
    }
}

/// First JSON-LD node across all script blocks that yields a usable price.
///
/// Returns the node's own `name` (if any) alongside the price so Product
/// nodes can override the page heading.
fn structured_data_price(doc: &Html) -> Option<(Option<String>, f64)> {
    for script in doc.select(json_ld_selector()) {
        let raw = script.text().collect::<String>();
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            continue;
        };

        let nodes: Vec<&Value> = match &value {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };

        for node in nodes {
            if type_matches(node.get("@type"), "product") {
                if let Some(price) = node.get("offers").and_then(offer_price) {
                    let name = node
                        .get("name")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    return Some((name, price));
                }
            }
            if type_matches(node.get("@type"), "offer")
                && let Some(price) = node_price(node)
            {
                return Some((None, price));
            }
        }
    }
    None
}

/// Price out of an `offers` value: direct field, nested price specification,
/// or — when offers is a list — the first element exposing either.
fn offer_price(offers: &Value) -> Option<f64> {
    match offers {
        Value::Array(items) => items.iter().find_map(node_price),
        node => node_price(node),
    }
}

fn node_price(node: &Value) -> Option<f64> {
    node.get("price")
        .and_then(price_from_json)
        .or_else(|| {
            node.get("priceSpecification")
                .and_then(|spec| spec.get("price"))
                .and_then(price_from_json)
        })
}

/// Does a JSON-LD `@type` declaration (string or array of strings) contain
/// the given token, case-insensitively?
fn type_matches(declared: Option<&Value>, token: &str) -> bool {
    match declared {
        Some(Value::String(s)) => s.to_lowercase().contains(token),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.to_lowercase().contains(token)),
        _ => false,
    }
}

fn collapse_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_data_wins_over_visible_markup() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">
            {"@type": "Product", "name": "Konsola XYZ", "offers": {"price": "499.99"}}
            </script>
            </head><body>
            <h1>Strona produktu</h1>
            <span class="price">1 299,00 zł</span>
            </body></html>
        "#;
        let listing = extract_listing(html);
        assert_eq!(listing.title, "Konsola XYZ");
        assert_eq!(listing.price, Some(499.99));
    }

    #[test]
    fn visible_price_fallback_parses_locale_format() {
        let html = r#"
            <html><body>
            <h1>  Laptop ABC 15  </h1>
            <div class="price">1999,00 zł</div>
            </body></html>
        "#;
        let listing = extract_listing(html);
        assert_eq!(listing.title, "Laptop ABC 15");
        assert_eq!(listing.price, Some(1999.0));
    }

    #[test]
    fn offer_node_without_product_wrapper() {
        let html = r#"
            <script type="application/ld+json">
            [{"@type": "WebPage"},
             {"@type": "Offer", "priceSpecification": {"price": 249.5}}]
            </script>
            <h1>Słuchawki</h1>
        "#;
        let listing = extract_listing(html);
        assert_eq!(listing.title, "Słuchawki");
        assert_eq!(listing.price, Some(249.5));
    }

    #[test]
    fn offers_list_uses_first_priced_element() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": ["Thing", "Product"], "name": "Mysz",
             "offers": [{"availability": "OutOfStock"}, {"price": "89,99"}]}
            </script>
        "#;
        let listing = extract_listing(html);
        assert_eq!(listing.title, "Mysz");
        assert_eq!(listing.price, Some(89.99));
    }

    #[test]
    fn unparseable_json_ld_is_skipped() {
        let html = r#"
            <script type="application/ld+json">{not json at all</script>
            <script type="application/ld+json">
            {"@type": "Product", "offers": {"price": 10}}
            </script>
        "#;
        assert_eq!(extract_listing(html).price, Some(10.0));
    }

    #[test]
    fn zero_structured_price_falls_through_to_markup() {
        let html = r#"
            <script type="application/ld+json">
            {"@type": "Product", "offers": {"price": 0}}
            </script>
            <span class="product-price">59,90</span>
        "#;
        assert_eq!(extract_listing(html).price, Some(59.9));
    }

    #[test]
    fn attribute_only_price_carrier() {
        let html = r#"<h1>Dysk</h1><meta itemprop="price" content="329.00">"#;
        let listing = extract_listing(html);
        assert_eq!(listing.price, Some(329.0));
    }

    #[test]
    fn no_price_anywhere_is_a_valid_outcome() {
        let html = "<html><body><p>strona błędu</p></body></html>";
        let listing = extract_listing(html);
        assert_eq!(listing.title, DEFAULT_TITLE);
        assert_eq!(listing.price, None);
    }
}
