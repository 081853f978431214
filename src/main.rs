use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gondola::app::AppContext;
use gondola::cli::{commands, Cli, Commands};
use gondola::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = Config::load()?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Crawl { url, max_products } => {
            commands::crawl(&ctx, url, max_products).await?;
        }
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| ctx.config.server.host.clone());
            let port = port.unwrap_or(ctx.config.server.port);
            gondola::server::serve(&ctx, &host, port).await?;
        }
        Commands::List { limit } => {
            commands::list_products(&ctx, limit)?;
        }
    }

    Ok(())
}
