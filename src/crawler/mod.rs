//! Incremental crawl of an infinite-scroll product listing.
//!
//! The listing page loads entries lazily as the viewport reaches the bottom,
//! so the crawl is a scroll-driven loop rather than pagination:
//!
//! ```text
//! PageDriver → Crawler (scroll loop) → extract_entry → Accumulator → store
//! ```
//!
//! [`Crawler`] owns the termination heuristics (output cap, consecutive
//! no-growth stalls, cancellation) and is generic over [`PageDriver`], so the
//! loop is unit-testable against a scripted page. [`ChromeDriver`] is the one
//! real implementation, driving a headless Chrome page via chromiumoxide.

mod accumulator;
mod chrome;
mod config;
mod extract;
mod scroll;

pub use accumulator::Accumulator;
pub use chrome::ChromeDriver;
pub use config::CrawlConfig;
pub use extract::{extract_entry, normalize_image_url, parse_price};
pub use scroll::{CrawlOutcome, Crawler, StopReason};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::info;

use crate::app::Result;
use crate::store::ProductStore;

/// Handle on one listing entry in the product grid.
///
/// Field reads resolve a descendant selector inside the entry; a missing
/// descendant is `None`, never an error. Errors mean the engine failed on the
/// handle itself (detached node, lost connection).
#[async_trait]
pub trait ListingEntry: Send + Sync {
    /// Text content of the first descendant matching `selector`.
    async fn text(&self, selector: &str) -> Result<Option<String>>;

    /// Attribute value of the first descendant matching `selector`.
    async fn attribute(&self, selector: &str, name: &str) -> Result<Option<String>>;
}

/// Serialized access to the single browser page driving a crawl.
///
/// All operations mutate the one shared page; no two calls may be in flight
/// concurrently, which the crawl loop guarantees by being sequential.
#[async_trait]
pub trait PageDriver: Send + Sync {
    type Entry: ListingEntry;

    /// Load the listing page. Fails on timeout or network failure, which is
    /// fatal to the run.
    async fn navigate(&self, url: &str) -> Result<()>;

    /// Best-effort popup dismissal. Absorbs every failure kind, including
    /// timeouts; the crawl proceeds regardless of interstitial state.
    async fn dismiss_interstitial(&self);

    /// Trigger lazy loading. Does not itself wait for completion.
    async fn scroll_to_bottom(&self) -> Result<()>;

    /// Wait until network activity settles or `timeout` elapses. A timeout is
    /// the expected steady state once all lazy content has loaded, so this
    /// never fails.
    async fn wait_for_network_settled(&self, timeout: Duration);

    /// All currently visible entries matching `selector`, possibly empty.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Entry>>;

    /// Current page height, the secondary growth signal.
    async fn current_height(&self) -> Result<i64>;
}

/// Result of [`run_once`]: what was collected and why the crawl stopped.
#[derive(Debug)]
pub struct CrawlSummary {
    pub collected: usize,
    pub stored: usize,
    pub reason: StopReason,
}

/// Run one full crawl and replace the store's contents with the result.
///
/// The browser is acquired at the start and released on every exit path
/// before any error propagates. At most one crawl may use a browser page at a
/// time; callers serialize invocations (see `AppContext::crawl_guard`).
pub async fn run_once<S: ProductStore + ?Sized>(
    config: &CrawlConfig,
    store: &S,
    cancel: Option<Arc<AtomicBool>>,
) -> Result<CrawlSummary> {
    // Fail before launching a browser if the configured URL is malformed.
    url::Url::parse(&config.listing_url)?;

    let driver = ChromeDriver::launch(config).await?;
    let crawler = Crawler::new(config.clone());

    let outcome = match cancel {
        Some(flag) => crawler.run_with_cancel(&driver, flag).await,
        None => crawler.run(&driver).await,
    };

    // Unconditional release, success or not.
    driver.shutdown().await;
    let outcome = outcome?;

    let stored = store.replace_all(&outcome.records)?;
    info!(
        collected = outcome.records.len(),
        stored,
        reason = %outcome.reason,
        "crawl complete"
    );

    Ok(CrawlSummary {
        collected: outcome.records.len(),
        stored,
        reason: outcome.reason,
    })
}
