//! Scoped page lifecycle
//!
//! Every store scrape owns exactly one page; the guard guarantees it is
//! closed on every exit path, success or failure, instead of relying on
//! manual close calls scattered across branches.

use chromiumoxide::page::Page;
use tracing::trace;

/// RAII wrapper that closes its page when dropped.
///
/// `Page::close` is async and Drop is not, so cleanup is spawned onto the
/// runtime. `Page` is a cheap handle clone; the CDP target is torn down by
/// whichever clone runs `close` first.
pub struct PageGuard {
    page: Page,
    label: String,
}

impl PageGuard {
    pub fn new(page: Page, label: impl Into<String>) -> Self {
        Self {
            page,
            label: label.into(),
        }
    }
}

impl std::ops::Deref for PageGuard {
    type Target = Page;

    fn deref(&self) -> &Page {
        &self.page
    }
}

impl Drop for PageGuard {
    fn drop(&mut self) {
        let page = self.page.clone();
        let label = std::mem::take(&mut self.label);
        tokio::spawn(async move {
            if let Err(e) = page.close().await {
                trace!("Failed to close page for {label}: {e}");
            }
        });
    }
}
