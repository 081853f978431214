pub mod commands;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "gondola")]
#[command(about = "Infinite-scroll product crawler and query API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one crawl and replace the stored catalog
    Crawl {
        /// Override the listing URL from the config file
        #[arg(long)]
        url: Option<String>,

        /// Override the product cap from the config file
        #[arg(long)]
        max_products: Option<usize>,
    },
    /// Start the JSON API server
    Serve {
        /// Bind address (default from config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (default from config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// List stored products
    List {
        /// Maximum number of products to print
        #[arg(short, long, default_value_t = 50)]
        limit: usize,
    },
}
