use std::net::SocketAddr;

use anyhow::Context;
use product_scraper::{http, ScraperConfig, ScraperService};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 3000;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ログ設定
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,product_scraper=debug")),
        )
        .init();

    let port = match std::env::var("PORT") {
        Ok(raw) => raw
            .trim()
            .parse::<u16>()
            .with_context(|| format!("PORT must be a port number, got {:?}", raw))?,
        Err(_) => DEFAULT_PORT,
    };

    let config = ScraperConfig::from_env();
    info!(
        "Scraper config: headless={}, timeout={:?}, chrome={:?}",
        config.headless, config.timeout, config.chrome_executable
    );

    let service = ScraperService::new().with_config(config);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    http::serve(addr, service)
        .await
        .context("HTTP server failed")?;

    Ok(())
}
