use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for one listing crawl.
///
/// Defaults target the apniroots all-products collection; every selector and
/// bound can be overridden from the config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// The infinite-scroll listing page to crawl.
    pub listing_url: String,

    /// Selector matching one listing entry in the product grid.
    pub entry_selector: String,

    /// Title link inside an entry; its trimmed text is the dedup key.
    pub name_selector: String,

    /// Sale price element; preferred over the regular price when both exist.
    pub sale_price_selector: String,

    /// Regular price element.
    pub regular_price_selector: String,

    /// Short description element.
    pub description_selector: String,

    /// Status text element for the In Stock / Sold Out match.
    pub availability_selector: String,

    /// Image element carrying the master-resolution URL attribute.
    pub image_selector: String,

    /// Attribute on the image element holding the templated URL.
    pub image_attr: String,

    /// Interstitial popup container.
    pub popup_selector: String,

    /// Close button inside the popup.
    pub popup_close_selector: String,

    /// Hard cap on records collected in one run (default: 400).
    pub max_products: usize,

    /// Consecutive no-growth scrolls before the listing counts as
    /// exhausted (default: 5).
    pub max_stalled_scrolls: u32,

    /// Bound on the network-settlement wait after each scroll, in
    /// milliseconds (default: 10000). Hitting it is not an error.
    pub settle_timeout_ms: u64,

    /// Fixed pause after settlement so the DOM catches up, in milliseconds
    /// (default: 1000).
    pub scroll_pause_ms: u64,

    /// Initial page load timeout in seconds (default: 60).
    pub navigation_timeout_secs: u64,

    /// How long to wait for the interstitial popup before giving up, in
    /// milliseconds (default: 7000).
    pub popup_wait_ms: u64,

    /// Whether to run the browser in headless mode (default: true).
    pub headless: bool,

    /// User agent string to use.
    pub user_agent: Option<String>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://apniroots.com/collections/all".to_string(),
            entry_selector: "product-item.product-collection".to_string(),
            name_selector: "h4 a".to_string(),
            sale_price_selector: "span.price--sale[data-js-product-price]".to_string(),
            regular_price_selector: "span.price[data-js-product-price]".to_string(),
            description_selector: "p.product-collection__description".to_string(),
            availability_selector: "p[data-js-product-availability] span:nth-child(2)".to_string(),
            image_selector: "img.rimage__img".to_string(),
            image_attr: "data-master".to_string(),
            popup_selector: "div[data-testid=\"POPUP\"]".to_string(),
            popup_close_selector: "button[aria-label=\"Close dialog\"]".to_string(),
            max_products: 400,
            max_stalled_scrolls: 5,
            settle_timeout_ms: 10_000,
            scroll_pause_ms: 1_000,
            navigation_timeout_secs: 60,
            popup_wait_ms: 7_000,
            headless: true,
            user_agent: Some(
                "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36"
                    .to_string(),
            ),
        }
    }
}

impl CrawlConfig {
    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn scroll_pause(&self) -> Duration {
        Duration::from_millis(self.scroll_pause_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn popup_wait(&self) -> Duration {
        Duration::from_millis(self.popup_wait_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = CrawlConfig::default();
        assert_eq!(config.max_products, 400);
        assert_eq!(config.max_stalled_scrolls, 5);
        assert_eq!(config.settle_timeout_ms, 10_000);
        assert_eq!(config.scroll_pause_ms, 1_000);
        assert!(config.headless);
        assert!(!config.entry_selector.is_empty());
    }

    #[test]
    fn test_duration_accessors() {
        let config = CrawlConfig::default();
        assert_eq!(config.settle_timeout(), Duration::from_secs(10));
        assert_eq!(config.scroll_pause(), Duration::from_millis(1000));
        assert_eq!(config.navigation_timeout(), Duration::from_secs(60));
        assert_eq!(config.popup_wait(), Duration::from_millis(7000));
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: CrawlConfig = toml::from_str("max_products = 25").unwrap();
        assert_eq!(config.max_products, 25);
        assert_eq!(config.max_stalled_scrolls, 5);
        assert_eq!(config.listing_url, CrawlConfig::default().listing_url);
    }
}
