use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::app::Result;
use crate::crawler::{extract_entry, Accumulator, CrawlConfig, PageDriver};
use crate::domain::ProductRecord;

/// Why a crawl reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The output cap was hit.
    CapReached,
    /// Height and visible-entry count stopped changing for the configured
    /// number of consecutive scrolls.
    Exhausted,
    /// An operator raised the cancellation flag.
    Cancelled,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::CapReached => "cap reached",
            StopReason::Exhausted => "listing exhausted",
            StopReason::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

#[derive(Debug)]
pub struct CrawlOutcome {
    /// Deduplicated records in first-seen order, at most the configured cap.
    pub records: Vec<ProductRecord>,
    pub reason: StopReason,
}

/// Loop state for one run. Created at crawl start, discarded at crawl end;
/// never persisted or shared.
struct CrawlState {
    last_height: i64,
    last_visible: usize,
    stalled_scrolls: u32,
}

/// Drives the scroll-and-extract loop over one page.
pub struct Crawler {
    config: CrawlConfig,
}

impl Crawler {
    pub fn new(config: CrawlConfig) -> Self {
        Self { config }
    }

    pub async fn run<D: PageDriver>(&self, driver: &D) -> Result<CrawlOutcome> {
        self.run_with_cancel(driver, Arc::new(AtomicBool::new(false)))
            .await
    }

    /// Run the crawl, checking `cancel` at the top of every iteration so an
    /// operator can abort a runaway crawl. A cancelled run returns whatever
    /// was accumulated so far.
    pub async fn run_with_cancel<D: PageDriver>(
        &self,
        driver: &D,
        cancel: Arc<AtomicBool>,
    ) -> Result<CrawlOutcome> {
        let cfg = &self.config;

        driver.navigate(&cfg.listing_url).await?;
        driver.dismiss_interstitial().await;

        let mut acc = Accumulator::new(cfg.max_products);
        let mut state = CrawlState {
            last_height: driver.current_height().await?,
            last_visible: driver.query_all(&cfg.entry_selector).await?.len(),
            stalled_scrolls: 0,
        };

        info!(url = %cfg.listing_url, cap = cfg.max_products, "starting crawl");

        let reason = loop {
            if cancel.load(Ordering::Relaxed) {
                info!(collected = acc.len(), "crawl cancelled");
                break StopReason::Cancelled;
            }
            if acc.is_full() {
                info!(collected = acc.len(), "product cap reached");
                break StopReason::CapReached;
            }

            driver.scroll_to_bottom().await?;
            driver.wait_for_network_settled(cfg.settle_timeout()).await;
            // Settlement does not mean the DOM has finished rendering the
            // newly fetched entries.
            tokio::time::sleep(cfg.scroll_pause()).await;

            let new_height = driver.current_height().await?;
            let entries = driver.query_all(&cfg.entry_selector).await?;
            let new_visible = entries.len();

            debug!(
                visible = new_visible,
                height = new_height,
                collected = acc.len(),
                "scrolled"
            );

            // Height alone fluctuates on image-heavy layouts; both signals
            // must be unchanged to count as a stall.
            if new_height == state.last_height && new_visible == state.last_visible {
                state.stalled_scrolls += 1;
                if state.stalled_scrolls >= cfg.max_stalled_scrolls {
                    info!(
                        collected = acc.len(),
                        stalls = state.stalled_scrolls,
                        "no new entries detected, stopping"
                    );
                    break StopReason::Exhausted;
                }
            } else {
                state.stalled_scrolls = 0;
            }

            for entry in &entries {
                if acc.is_full() {
                    break;
                }
                match extract_entry(entry, cfg, &acc).await {
                    Ok(Some(record)) => {
                        acc.offer(record);
                    }
                    Ok(None) => {}
                    Err(e) => {
                        // A detached or malformed element drops that one
                        // entry; siblings still extract.
                        warn!("skipping entry: {}", e);
                    }
                }
            }

            state.last_height = new_height;
            state.last_visible = new_visible;
        };

        Ok(CrawlOutcome {
            records: acc.into_records(),
            reason,
        })
    }
}
