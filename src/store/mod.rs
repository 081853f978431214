pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::app::Result;
use crate::domain::{Availability, ProductRecord, StoredProduct};

/// Filters for listing stored products. Every filter is optional and they
/// combine with AND.
#[derive(Debug, Clone)]
pub struct ProductQuery {
    /// Case-insensitive substring match on the product name.
    pub name: Option<String>,
    /// Exact category match.
    pub category: Option<String>,
    /// Exact availability match.
    pub availability: Option<Availability>,
    /// Inclusive lower price bound.
    pub min_price: Option<f64>,
    /// Inclusive upper price bound.
    pub max_price: Option<f64>,
    pub skip: usize,
    pub limit: usize,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            name: None,
            category: None,
            availability: None,
            min_price: None,
            max_price: None,
            skip: 0,
            limit: 10,
        }
    }
}

/// Downstream sink and query surface for crawled records.
///
/// The crawl model is one full re-scrape per run, so the only write is a
/// full replace; partial merges are unsupported by design.
pub trait ProductStore: Send + Sync {
    /// Atomically clear the store and bulk-insert `records`. Returns the
    /// number of records written.
    fn replace_all(&self, records: &[ProductRecord]) -> Result<usize>;

    fn query(&self, query: &ProductQuery) -> Result<Vec<StoredProduct>>;

    fn get(&self, id: i64) -> Result<Option<StoredProduct>>;

    fn count(&self) -> Result<i64>;
}
