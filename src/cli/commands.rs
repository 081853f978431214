use crate::app::{AppContext, Result};
use crate::crawler;
use crate::store::{ProductQuery, ProductStore};

pub async fn crawl(
    ctx: &AppContext,
    url: Option<String>,
    max_products: Option<usize>,
) -> Result<()> {
    let mut config = ctx.config.crawl.clone();
    if let Some(url) = url {
        config.listing_url = url;
    }
    if let Some(cap) = max_products {
        config.max_products = cap;
    }

    println!("Crawling {}...", config.listing_url);

    let _guard = ctx.crawl_guard.lock().await;
    let summary = crawler::run_once(&config, ctx.store.as_ref(), None).await?;

    println!(
        "Stored {} products ({})",
        summary.stored, summary.reason
    );
    Ok(())
}

pub fn list_products(ctx: &AppContext, limit: usize) -> Result<()> {
    let query = ProductQuery {
        limit,
        ..ProductQuery::default()
    };
    let products = ctx.store.query(&query)?;

    if products.is_empty() {
        println!("No products stored. Run `gondola crawl` first.");
        return Ok(());
    }

    let total = ctx.store.count()?;
    for product in &products {
        let price = product
            .record
            .price
            .map(|p| format!("${:.2}", p))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>5}  {:>10}  {:<10}  {}",
            product.id,
            price,
            product.record.availability.as_str(),
            product.record.name
        );
    }
    println!("Showing {} of {} products", products.len(), total);

    Ok(())
}
