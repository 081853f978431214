use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::app::{GondolaError, Result};
use crate::crawler::{CrawlConfig, ListingEntry, PageDriver};

/// Dismiss-anything fallback when the popup close button cannot be clicked.
const ESCAPE_SCRIPT: &str =
    "document.dispatchEvent(new KeyboardEvent('keydown', {key: 'Escape', bubbles: true}))";

/// Headless-Chrome implementation of [`PageDriver`] backed by chromiumoxide.
///
/// Owns the browser process and the single page for the duration of one
/// crawl. Callers must invoke [`shutdown`](ChromeDriver::shutdown) on every
/// exit path; the crawl orchestration in `run_once` does.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    config: CrawlConfig,
}

impl ChromeDriver {
    pub async fn launch(config: &CrawlConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder()
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-software-rasterizer");

        if !config.headless {
            builder = builder.with_head();
        }

        let browser_config = builder
            .build()
            .map_err(|e| GondolaError::Engine(format!("Failed to build browser config: {}", e)))?;

        let (mut browser, mut handler) = Browser::launch(browser_config).await.map_err(|e| {
            GondolaError::Engine(format!(
                "Failed to launch browser: {}. Is Chrome or Chromium installed and in PATH?",
                e
            ))
        })?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser event error: {}", e);
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| GondolaError::Engine(format!("Failed to create page: {}", e)))?;

        if let Some(ref ua) = config.user_agent {
            page.set_user_agent(ua)
                .await
                .map_err(|e| GondolaError::Engine(format!("Failed to set user agent: {}", e)))?;
        }

        Ok(Self {
            browser,
            page,
            handler,
            config: config.clone(),
        })
    }

    /// Release the page and browser process. Never fails; runs on every crawl
    /// exit path regardless of how the crawl terminated.
    pub async fn shutdown(mut self) {
        let _ = self.page.close().await;
        let _ = self.browser.close().await;
        let _ = self.browser.wait().await;
        self.handler.abort();
    }

    /// Wait for the popup to appear, then click its close button. The caller
    /// bounds this with a timeout, which covers the no-popup case.
    async fn try_dismiss(&self) -> Result<()> {
        loop {
            if self.page.find_element(&self.config.popup_selector).await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(250)).await;
        }

        let button = self
            .page
            .find_element(&self.config.popup_close_selector)
            .await
            .map_err(|e| GondolaError::Engine(format!("Close button not found: {}", e)))?;
        button
            .click()
            .await
            .map_err(|e| GondolaError::Engine(format!("Close click failed: {}", e)))?;
        tokio::time::sleep(Duration::from_secs(1)).await;
        Ok(())
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    type Entry = ChromeEntry;

    async fn navigate(&self, url: &str) -> Result<()> {
        let nav = async {
            self.page
                .goto(url)
                .await
                .map_err(|e| GondolaError::Navigation(format!("Failed to load {}: {}", url, e)))?;
            self.page.wait_for_navigation().await.map_err(|e| {
                GondolaError::Navigation(format!("Load of {} did not complete: {}", url, e))
            })?;
            Ok(())
        };

        tokio::time::timeout(self.config.navigation_timeout(), nav)
            .await
            .map_err(|_| GondolaError::Navigation(format!("Timed out loading {}", url)))?
    }

    async fn dismiss_interstitial(&self) {
        // Absorb every failure kind: a popup that will not close must not
        // fail the crawl.
        match tokio::time::timeout(self.config.popup_wait(), self.try_dismiss()).await {
            Ok(Ok(())) => debug!("dismissed interstitial"),
            Ok(Err(e)) => {
                debug!("interstitial dismissal failed ({}), sending Escape", e);
                let _ = self.page.evaluate(ESCAPE_SCRIPT).await;
                tokio::time::sleep(Duration::from_secs(1)).await;
            }
            Err(_) => debug!("no interstitial appeared"),
        }
    }

    async fn scroll_to_bottom(&self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight)")
            .await
            .map_err(|e| GondolaError::Engine(format!("Scroll failed: {}", e)))?;
        Ok(())
    }

    async fn wait_for_network_settled(&self, timeout: Duration) {
        // Lazy-loaded pages may never go fully idle, so the timeout is the
        // expected steady state rather than a failure. The probe polls the
        // page's resource-timing count until it stops changing.
        let timeout_ms = timeout.as_millis().min(u128::from(u64::MAX)) as u64;
        let probe = format!(
            r#"(async () => {{
                const timeoutMs = {timeout_ms};
                const idleMs = 1000;
                const interval = 250;

                const start = Date.now();
                let lastCount = performance.getEntriesByType('resource').length;
                let stableMs = 0;

                while (Date.now() - start < timeoutMs) {{
                    await new Promise(r => setTimeout(r, interval));
                    const curCount = performance.getEntriesByType('resource').length;
                    if (document.readyState === 'complete' && curCount === lastCount) {{
                        stableMs += interval;
                        if (stableMs >= idleMs) {{
                            return true;
                        }}
                    }} else {{
                        stableMs = 0;
                    }}
                    lastCount = curCount;
                }}
                return false;
            }})()"#
        );

        // Bound the evaluate call itself in case the target tab wedges.
        let guard = timeout + Duration::from_secs(2);
        match tokio::time::timeout(guard, self.page.evaluate(probe)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => debug!("network settle probe failed: {}", e),
            Err(_) => debug!("network settle probe timed out"),
        }
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ChromeEntry>> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .map_err(|e| GondolaError::Engine(format!("Query '{}' failed: {}", selector, e)))?;
        Ok(elements.into_iter().map(ChromeEntry::new).collect())
    }

    async fn current_height(&self) -> Result<i64> {
        self.page
            .evaluate("document.body.scrollHeight")
            .await
            .map_err(|e| GondolaError::Engine(format!("Height read failed: {}", e)))?
            .into_value::<i64>()
            .map_err(|e| GondolaError::Engine(format!("Height was not an integer: {:?}", e)))
    }
}

/// One listing entry held as a live DOM element.
pub struct ChromeEntry {
    element: Element,
}

impl ChromeEntry {
    fn new(element: Element) -> Self {
        Self { element }
    }
}

#[async_trait]
impl ListingEntry for ChromeEntry {
    async fn text(&self, selector: &str) -> Result<Option<String>> {
        // A missing descendant is an absent field, not an engine failure.
        let Ok(child) = self.element.find_element(selector).await else {
            return Ok(None);
        };
        child
            .inner_text()
            .await
            .map_err(|e| GondolaError::Engine(format!("Text read failed: {}", e)))
    }

    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let Ok(child) = self.element.find_element(selector).await else {
            return Ok(None);
        };
        child
            .attribute(name)
            .await
            .map_err(|e| GondolaError::Engine(format!("Attribute read failed: {}", e)))
    }
}
