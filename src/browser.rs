//! Browser lifecycle management
//!
//! Launches and manages the shared headless Chromium instance that all store
//! scrapes run against. The browser is the only shared resource in the
//! system: every scrape unit opens its own page, so the process itself must
//! tolerate concurrent page creation.

use std::path::PathBuf;
use std::process::Command;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Wrapper for Browser and its event handler task.
///
/// The handler MUST be aborted when the browser goes away, otherwise the
/// task spins on a dead websocket indefinitely. The per-instance profile
/// directory is removed only after the process has exited and released its
/// file handles.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub(crate) fn browser_mut(&mut self) -> &mut Browser {
        &mut self.browser
    }

    /// Remove the temp profile directory. Blocking on purpose: this may run
    /// from a Drop context where async is unavailable.
    fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Removing browser profile directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to remove profile directory {}: {e}. Manual cleanup may be required.",
                    path.display()
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        if self.user_data_dir.is_some() {
            warn!("BrowserWrapper dropped without explicit shutdown - removing profile in Drop");
            self.cleanup_temp_dir();
        }
    }
}

/// Find a Chrome/Chromium executable on the system.
///
/// `CHROMIUM_PATH` overrides everything; otherwise common install locations
/// are probed per platform, falling back to `which` on Unix.
pub fn find_browser_executable() -> Result<PathBuf> {
    if let Ok(path) = std::env::var("CHROMIUM_PATH") {
        let path = PathBuf::from(path);
        if path.exists() {
            info!("Using browser from CHROMIUM_PATH: {}", path.display());
            return Ok(path);
        }
        warn!(
            "CHROMIUM_PATH points to non-existent file: {}",
            path.display()
        );
    }

    let paths: &[&str] = if cfg!(target_os = "macos") {
        &[
            "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/Applications/Chromium.app/Contents/MacOS/Chromium",
            "~/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
            "/opt/homebrew/bin/chromium",
        ]
    } else if cfg!(target_os = "windows") {
        &[
            r"C:\Program Files\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files (x86)\Google\Chrome\Application\chrome.exe",
            r"C:\Program Files\Chromium\Application\chrome.exe",
        ]
    } else {
        &[
            "/usr/bin/google-chrome",
            "/usr/bin/google-chrome-stable",
            "/usr/bin/chromium",
            "/usr/bin/chromium-browser",
            "/snap/bin/chromium",
            "/opt/google/chrome/chrome",
        ]
    };

    for path_str in paths {
        let path = if let Some(rest) = path_str.strip_prefix("~/") {
            match dirs::home_dir() {
                Some(home) => home.join(rest),
                None => continue,
            }
        } else {
            PathBuf::from(path_str)
        };
        if path.exists() {
            info!("Found browser at: {}", path.display());
            return Ok(path);
        }
    }

    if !cfg!(target_os = "windows") {
        for cmd in &["chromium", "chromium-browser", "google-chrome", "chrome"] {
            if let Ok(output) = Command::new("which").arg(cmd).output()
                && output.status.success()
            {
                let path_str = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if !path_str.is_empty() {
                    let path = PathBuf::from(path_str);
                    info!("Found browser via 'which': {}", path.display());
                    return Ok(path);
                }
            }
        }
    }

    Err(anyhow::anyhow!(
        "Chrome/Chromium executable not found; set CHROMIUM_PATH"
    ))
}

/// Launch a headless browser configured for retailer scraping.
///
/// The returned handler task MUST be aborted when done; `BrowserWrapper`
/// owns that through its Drop impl.
async fn launch_browser(user_agent: &str, accept_language: &str) -> Result<BrowserWrapper> {
    let chrome_path = find_browser_executable()?;

    let user_data_dir = std::env::temp_dir().join(format!("pricehound_chrome_{}", std::process::id()));
    std::fs::create_dir_all(&user_data_dir).context("Failed to create user data directory")?;

    let browser_config = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(30))
        .window_size(1920, 1080)
        .user_data_dir(user_data_dir.clone())
        .chrome_executable(chrome_path)
        .headless_mode(HeadlessMode::default())
        .arg(format!("--user-agent={user_agent}"))
        .arg(format!("--lang={}", accept_language.split(',').next().unwrap_or("pl-PL")))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-notifications")
        .arg("--disable-extensions")
        .arg("--disable-popup-blocking")
        .arg("--disable-background-networking")
        .arg("--disable-hang-monitor")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--hide-scrollbars")
        .arg("--mute-audio")
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build browser config: {e}"))?;

    info!("Launching headless browser");
    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .context("Failed to launch browser")?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                tracing::error!("Browser handler error: {:?}", e);
            }
        }
        debug!("Browser event handler task completed");
    });

    Ok(BrowserWrapper::new(browser, handler_task, user_data_dir))
}

/// Manager for the shared browser instance.
///
/// # Lifecycle
/// - Browser NOT launched on manager creation (lazy initialization)
/// - First `get_or_launch()` launches the process (~2-3s)
/// - Subsequent calls health-check and reuse it (<1ms)
/// - A failed health check closes the crashed process and relaunches
/// - `shutdown()` explicitly closes the browser on server exit
#[derive(Clone)]
pub struct BrowserManager {
    browser: Arc<Mutex<Option<BrowserWrapper>>>,
    user_agent: String,
    accept_language: String,
}

impl BrowserManager {
    #[must_use]
    pub fn new(user_agent: impl Into<String>, accept_language: impl Into<String>) -> Self {
        Self {
            browser: Arc::new(Mutex::new(None)),
            user_agent: user_agent.into(),
            accept_language: accept_language.into(),
        }
    }

    /// Get or launch the shared browser, recovering from crashes.
    ///
    /// The caller locks the returned handle for the duration of its use; the
    /// slot is always `Some` after a successful call.
    pub async fn get_or_launch(&self) -> Result<Arc<Mutex<Option<BrowserWrapper>>>> {
        let mut guard = self.browser.lock().await;

        if let Some(wrapper) = guard.as_ref() {
            match wrapper.browser().version().await {
                Ok(_) => {
                    debug!("Browser health check passed, reusing existing instance");
                    drop(guard);
                    return Ok(self.browser.clone());
                }
                Err(e) => {
                    warn!("Browser health check failed: {e}. Relaunching.");
                    if let Some(mut crashed) = guard.take() {
                        let _ = crashed.browser_mut().close().await;
                        let _ = crashed.browser_mut().wait().await;
                        crashed.cleanup_temp_dir();
                    }
                }
            }
        }

        let wrapper = launch_browser(&self.user_agent, &self.accept_language).await?;
        *guard = Some(wrapper);
        drop(guard);

        Ok(self.browser.clone())
    }

    /// Close the browser process if running. Safe to call repeatedly.
    pub async fn shutdown(&self) -> Result<()> {
        let mut guard = self.browser.lock().await;

        if let Some(mut wrapper) = guard.take() {
            info!("Shutting down scraping browser");
            if let Err(e) = wrapper.browser_mut().close().await {
                warn!("Failed to close browser cleanly: {e}");
            }
            if let Err(e) = wrapper.browser_mut().wait().await {
                warn!("Failed to wait for browser exit: {e}");
            }
            wrapper.cleanup_temp_dir();
            drop(wrapper);
        }

        Ok(())
    }
}
