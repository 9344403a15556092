//! Cheapest-first sort coercion
//!
//! Listings default to "relevance" ordering; these interactions push them to
//! ascending price so the first result link is the cheapest match. Sort
//! controls are the most redesign-prone part of every retailer's frontend,
//! so each step runs under a short timeout and total failure is expected and
//! suppressed by the caller.

use std::time::Duration;

use chromiumoxide::page::Page;
use tokio::time::timeout;
use tracing::trace;

use crate::error::ScrapeError;
use crate::stores::SortAction;

/// Attempt to reorder the current results listing by ascending price.
///
/// Best-effort by contract: the returned error exists so the suppression
/// site in the pipeline stays explicit, never to abort the scrape.
pub async fn attempt_cheapest_first(
    page: &Page,
    action: SortAction,
    step_timeout: Duration,
) -> Result<(), ScrapeError> {
    match action {
        SortAction::ClickThrough {
            trigger,
            option_pattern,
        } => {
            click_selector(page, trigger, step_timeout).await?;
            click_by_text(page, option_pattern, step_timeout).await
        }
        SortAction::Select { selector, value } => {
            select_option(page, selector, value, step_timeout).await
        }
    }
}

/// Click the first element matching a CSS selector.
async fn click_selector(
    page: &Page,
    selector: &str,
    step_timeout: Duration,
) -> Result<(), ScrapeError> {
    let op = async {
        let element = page
            .find_element(selector)
            .await
            .map_err(|e| ScrapeError::SortAttempt(format!("'{selector}' not found: {e}")))?;
        element
            .click()
            .await
            .map_err(|e| ScrapeError::SortAttempt(format!("click '{selector}' failed: {e}")))?;
        Ok(())
    };
    flatten_timeout(op, step_timeout, selector).await
}

/// Click the first clickable element whose visible text matches a pattern.
///
/// There is no CSS equivalent of a text match, so this scans candidate
/// controls in the page context and clicks the first hit.
async fn click_by_text(
    page: &Page,
    pattern: &str,
    step_timeout: Duration,
) -> Result<(), ScrapeError> {
    let pattern_js =
        serde_json::to_string(pattern).map_err(|e| ScrapeError::SortAttempt(e.to_string()))?;
    let script = format!(
        r#"(() => {{
            const re = new RegExp({pattern_js}, 'i');
            const candidates = document.querySelectorAll(
                'button, a, li, label, span, [role="option"], [role="menuitem"]'
            );
            for (const el of candidates) {{
                if (re.test((el.textContent || '').trim())) {{ el.click(); return true; }}
            }}
            return false;
        }})()"#
    );

    let op = async {
        let clicked: bool = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScrapeError::SortAttempt(format!("text click eval failed: {e}")))?
            .into_value()
            .map_err(|e| ScrapeError::SortAttempt(format!("text click result: {e}")))?;
        if clicked {
            Ok(())
        } else {
            Err(ScrapeError::SortAttempt(format!(
                "no control matching /{pattern}/i"
            )))
        }
    };
    flatten_timeout(op, step_timeout, pattern).await
}

/// Set a native `<select>` to the given value and fire its change event.
async fn select_option(
    page: &Page,
    selector: &str,
    value: &str,
    step_timeout: Duration,
) -> Result<(), ScrapeError> {
    let selector_js =
        serde_json::to_string(selector).map_err(|e| ScrapeError::SortAttempt(e.to_string()))?;
    let value_js =
        serde_json::to_string(value).map_err(|e| ScrapeError::SortAttempt(e.to_string()))?;
    let script = format!(
        r#"(() => {{
            const el = document.querySelector({selector_js});
            if (!el) return false;
            el.value = {value_js};
            el.dispatchEvent(new Event('change', {{ bubbles: true }}));
            return true;
        }})()"#
    );

    let op = async {
        let changed: bool = page
            .evaluate(script.as_str())
            .await
            .map_err(|e| ScrapeError::SortAttempt(format!("select eval failed: {e}")))?
            .into_value()
            .map_err(|e| ScrapeError::SortAttempt(format!("select result: {e}")))?;
        if changed {
            Ok(())
        } else {
            trace!("select '{selector}' not present");
            Err(ScrapeError::SortAttempt(format!("'{selector}' not found")))
        }
    };
    flatten_timeout(op, step_timeout, selector).await
}

async fn flatten_timeout<F>(
    op: F,
    step_timeout: Duration,
    what: &str,
) -> Result<(), ScrapeError>
where
    F: std::future::Future<Output = Result<(), ScrapeError>>,
{
    match timeout(step_timeout, op).await {
        Ok(result) => result,
        Err(_) => Err(ScrapeError::SortAttempt(format!(
            "'{what}' timed out after {step_timeout:?}"
        ))),
    }
}
