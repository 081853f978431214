use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category assigned to every record scraped from the all-products listing.
///
/// Per-item categorization is not available on the listing page, so this is a
/// placeholder until product detail pages are crawled.
pub const DEFAULT_CATEGORY: &str = "All Products";

/// Stock status derived from the listing entry's status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Availability {
    #[serde(rename = "In Stock")]
    InStock,
    #[serde(rename = "Sold Out")]
    SoldOut,
    Unknown,
}

impl Availability {
    /// Substring match against raw status text. Match order is significant:
    /// "In Stock" wins over "Sold Out" if the source ever emits both in one
    /// status line, which well-formed markup does not.
    pub fn from_status_text(text: &str) -> Self {
        if text.contains("In Stock") {
            Availability::InStock
        } else if text.contains("Sold Out") {
            Availability::SoldOut
        } else {
            Availability::Unknown
        }
    }

    /// Exact-match parse of the stored/serialized form.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "In Stock" => Some(Availability::InStock),
            "Sold Out" => Some(Availability::SoldOut),
            "Unknown" => Some(Availability::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::InStock => "In Stock",
            Availability::SoldOut => "Sold Out",
            Availability::Unknown => "Unknown",
        }
    }
}

/// One normalized product scraped from the listing.
///
/// `name` is the natural dedup key within a run: non-empty, trimmed, and
/// unique across one crawl's output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    /// Parsed from currency-formatted text; absent when missing or unparsable.
    pub price: Option<f64>,
    pub description: Option<String>,
    /// Never populated by the listing page; reserved for future sources.
    pub rating: Option<f64>,
    pub category: String,
    pub availability: Availability,
    /// Absolute URL with the width token resolved to a fixed resolution.
    pub image_url: Option<String>,
}

impl ProductRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: None,
            description: None,
            rating: None,
            category: DEFAULT_CATEGORY.to_string(),
            availability: Availability::Unknown,
            image_url: None,
        }
    }
}

/// A persisted record together with the row id the store assigned to it.
#[derive(Debug, Clone, Serialize)]
pub struct StoredProduct {
    pub id: i64,
    #[serde(flatten)]
    pub record: ProductRecord,
    pub scraped_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_in_stock() {
        assert_eq!(
            Availability::from_status_text("  In Stock  "),
            Availability::InStock
        );
    }

    #[test]
    fn test_availability_sold_out() {
        assert_eq!(
            Availability::from_status_text("Sorry, Sold Out"),
            Availability::SoldOut
        );
    }

    #[test]
    fn test_availability_unknown_for_other_text() {
        assert_eq!(
            Availability::from_status_text("Backordered"),
            Availability::Unknown
        );
        assert_eq!(Availability::from_status_text(""), Availability::Unknown);
    }

    #[test]
    fn test_availability_in_stock_wins_on_compound_text() {
        // Order-significant: the two substrings are assumed mutually
        // exclusive in well-formed source text, but the first match wins.
        assert_eq!(
            Availability::from_status_text("In Stock (was Sold Out)"),
            Availability::InStock
        );
    }

    #[test]
    fn test_availability_parse_round_trip() {
        for av in [
            Availability::InStock,
            Availability::SoldOut,
            Availability::Unknown,
        ] {
            assert_eq!(Availability::parse(av.as_str()), Some(av));
        }
        assert_eq!(Availability::parse("in stock"), None);
    }

    #[test]
    fn test_record_serializes_availability_as_status_text() {
        let mut record = ProductRecord::new("Basmati Rice 5kg");
        record.availability = Availability::InStock;
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["availability"], "In Stock");
        assert_eq!(json["category"], DEFAULT_CATEGORY);
        assert!(json["rating"].is_null());
    }
}
