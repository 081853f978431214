//! # Gondola
//!
//! A crawler for infinite-scroll e-commerce collection pages, with a SQLite
//! catalog and a JSON query API.
//!
//! ## Architecture
//!
//! Gondola follows a modular pipeline architecture:
//!
//! ```text
//! Crawler → Extractor → Store → API
//! ```
//!
//! - [`crawler`]: headless-Chrome scroll loop, termination heuristics and
//!   per-entry field extraction
//! - [`store`]: SQLite persistence with replace-on-crawl semantics
//! - [`server`]: axum JSON API over the store
//!
//! ## Quick Start
//!
//! ```bash
//! # Crawl the configured listing and replace the catalog
//! gondola crawl
//!
//! # Serve the query API
//! gondola serve
//!
//! # Print stored products
//! gondola list
//! ```

/// Application context and error handling.
///
/// [`AppContext`](app::AppContext) wires together the store, the loaded
/// configuration and the crawl guard shared by the CLI and the server.
pub mod app;

/// Command-line interface using clap.
///
/// - `crawl` - Run one crawl and replace the stored catalog
/// - `serve` - Start the JSON API server
/// - `list` - Print stored products
pub mod cli;

/// Configuration management.
///
/// Loads from `~/.config/gondola/config.toml`; every key is optional and
/// falls back to the built-in defaults.
pub mod config;

/// The crawl pipeline.
///
/// - [`Crawler`](crawler::Crawler): scroll loop and termination heuristics
/// - [`ChromeDriver`](crawler::ChromeDriver): chromiumoxide page driver
/// - [`Accumulator`](crawler::Accumulator): in-run dedup and product cap
pub mod crawler;

/// Core domain models.
///
/// - [`ProductRecord`](domain::ProductRecord): one extracted product
/// - [`StoredProduct`](domain::StoredProduct): a persisted row with id and
///   scrape timestamp
pub mod domain;

/// JSON API server built with axum.
pub mod server;

/// SQLite persistence layer.
///
/// - [`ProductStore`](store::ProductStore): trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
