use crate::app::Result;
use crate::crawler::{Accumulator, CrawlConfig, ListingEntry};
use crate::domain::{Availability, ProductRecord, DEFAULT_CATEGORY};

/// Width placeholder token in templated image URLs.
const WIDTH_TOKEN: &str = "{width}x";

/// Resolution substituted for the width token.
const IMAGE_WIDTH: &str = "1024x";

/// Extract one listing entry into a normalized record.
///
/// Returns `Ok(None)` when the entry has no resolvable name or the name was
/// already collected this run; the dedup check runs before any further field
/// work. A missing field element never fails extraction; each optional field
/// degrades to `None` independently. Only an engine-level failure on the
/// element handle propagates, and the caller treats that as "skip this entry".
pub async fn extract_entry<E: ListingEntry>(
    entry: &E,
    config: &CrawlConfig,
    acc: &Accumulator,
) -> Result<Option<ProductRecord>> {
    let name = match entry.text(&config.name_selector).await? {
        Some(raw) => {
            let trimmed = raw.trim().to_string();
            if trimmed.is_empty() {
                return Ok(None);
            }
            trimmed
        }
        None => return Ok(None),
    };

    if acc.contains(&name) {
        return Ok(None);
    }

    let raw_price = match entry.text(&config.sale_price_selector).await? {
        Some(text) => Some(text),
        None => entry.text(&config.regular_price_selector).await?,
    };
    let price = raw_price.as_deref().and_then(parse_price);

    let description = entry
        .text(&config.description_selector)
        .await?
        .map(|text| text.trim().to_string());

    let availability = match entry.text(&config.availability_selector).await? {
        Some(text) => Availability::from_status_text(&text),
        None => Availability::Unknown,
    };

    let image_url = entry
        .attribute(&config.image_selector, &config.image_attr)
        .await?
        .map(|url| normalize_image_url(&url));

    Ok(Some(ProductRecord {
        name,
        price,
        description,
        rating: None,
        category: DEFAULT_CATEGORY.to_string(),
        availability,
        image_url,
    }))
}

/// Parse currency-formatted text into a price.
///
/// Strips every character that is not a digit or decimal point before
/// parsing, so `"$1,234.56"` becomes `1234.56`. Anything that still fails to
/// parse is absent, never an error.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().ok()
}

/// Upgrade a templated, possibly protocol-relative image URL to an absolute
/// one. Already-absolute URLs pass through unchanged, width token included.
pub fn normalize_image_url(raw: &str) -> String {
    if raw.starts_with("http") {
        raw.to_string()
    } else {
        format!("https:{}", raw.replace(WIDTH_TOKEN, IMAGE_WIDTH))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_currency_format() {
        assert_eq!(parse_price("$1,234.56"), Some(1234.56));
        assert_eq!(parse_price("Rs. 450"), Some(450.0));
        assert_eq!(parse_price("  $12.99 USD "), Some(12.99));
    }

    #[test]
    fn test_parse_price_idempotent() {
        let once = parse_price("$1,234.56").unwrap();
        assert_eq!(parse_price(&once.to_string()), Some(once));
    }

    #[test]
    fn test_parse_price_unparsable_is_absent() {
        assert_eq!(parse_price(""), None);
        assert_eq!(parse_price("Call for price"), None);
        assert_eq!(parse_price("."), None);
        assert_eq!(parse_price("1.2.3"), None);
    }

    #[test]
    fn test_parse_price_never_negative() {
        // The minus sign is stripped with every other non-digit character.
        assert_eq!(parse_price("-5.00"), Some(5.0));
    }

    #[test]
    fn test_image_url_protocol_relative_with_token() {
        assert_eq!(
            normalize_image_url("//cdn.example/img_{width}x.jpg"),
            "https://cdn.example/img_1024x.jpg"
        );
    }

    #[test]
    fn test_image_url_absolute_passes_through() {
        assert_eq!(
            normalize_image_url("https://cdn.example/img_200x.jpg"),
            "https://cdn.example/img_200x.jpg"
        );
        // Even an absolute URL that still carries the token is untouched.
        assert_eq!(
            normalize_image_url("https://cdn.example/img_{width}x.jpg"),
            "https://cdn.example/img_{width}x.jpg"
        );
    }
}
