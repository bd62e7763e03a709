//! HTTP front-end binary for docsend-dl.

use anyhow::{Context, Result};
use clap::Parser;
use docsend_dl::RetrievalConfig;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "docsend-dl-server",
    version,
    about = "HTTP front end for retrieving gated documents as PDFs"
)]
struct Cli {
    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    listen: String,

    /// Base URL of the gated viewer
    #[arg(long, default_value = "https://docsend.com")]
    base_url: String,

    /// Concurrent page requests per document
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Seconds a probed session (with its live cookies) stays cached
    #[arg(long, default_value_t = 300)]
    session_ttl_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = RetrievalConfig::builder()
        .base_url(&cli.base_url)
        .concurrency(cli.concurrency)
        .build()
        .context("invalid configuration")?;

    let app = docsend_dl::serve::router(config, Duration::from_secs(cli.session_ttl_secs));
    let listener = tokio::net::TcpListener::bind(&cli.listen)
        .await
        .with_context(|| format!("binding {}", cli.listen))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
