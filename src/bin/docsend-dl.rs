//! CLI binary for docsend-dl.
//!
//! A thin shim over the library crate: parses document specs, runs all
//! retrievals concurrently, and writes the resulting PDFs to disk. A failed
//! document never aborts its siblings; the exit status reflects whether any
//! failed.

use anyhow::{bail, Context, Result};
use clap::Parser;
use docsend_dl::{document_id_from_url, retrieve, RetrievalConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}

// ── Document spec parsing ────────────────────────────────────────────────

/// One document to retrieve: `ID-OR-URL[,EMAIL[,PASSCODE]]`.
#[derive(Debug, Clone)]
struct DocSpec {
    target: String,
    email: Option<String>,
    passcode: Option<String>,
}

impl FromStr for DocSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ',').map(str::trim);
        let target = parts.next().unwrap_or_default().to_string();
        let email = parts.next().filter(|p| !p.is_empty()).map(String::from);
        let passcode = parts.next().filter(|p| !p.is_empty()).map(String::from);
        Ok(Self {
            target,
            email,
            passcode,
        })
    }
}

// ── CLI ──────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "docsend-dl",
    version,
    about = "Download gated documents as PDFs",
    long_about = "Download one or more gated documents concurrently.\n\n\
        Each DOC is an id or viewer URL, optionally followed by a\n\
        comma-separated email and passcode:\n\n\
        docsend-dl abc123 'def456,me@example.com' 'ghi789,me@example.com,s3cret'"
)]
struct Cli {
    /// Documents to retrieve: ID-OR-URL[,EMAIL[,PASSCODE]]
    #[arg(required = true)]
    docs: Vec<DocSpec>,

    /// Default email applied to documents without their own
    #[arg(short = 'e', long, env = "DOCSEND_EMAIL")]
    email: Option<String>,

    /// Output directory for the PDF files
    #[arg(short, long, default_value = ".")]
    output: PathBuf,

    /// Base URL of the gated viewer
    #[arg(long, default_value = "https://docsend.com")]
    base_url: String,

    /// Concurrent page requests per document
    #[arg(long, default_value_t = 10)]
    concurrency: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = RetrievalConfig::builder()
        .base_url(&cli.base_url)
        .concurrency(cli.concurrency)
        .build()
        .context("invalid configuration")?;

    // Resolve ids up front so a malformed URL fails before any network work.
    let mut jobs: Vec<(String, Option<String>, Option<String>)> = Vec::new();
    for spec in &cli.docs {
        let id = if spec.target.starts_with("http://") || spec.target.starts_with("https://")
        {
            document_id_from_url(&spec.target)
                .with_context(|| format!("'{}' is not a viewer URL", spec.target))?
        } else {
            spec.target.clone()
        };
        let email = spec.email.clone().or_else(|| cli.email.clone());
        jobs.push((id, email, spec.passcode.clone()));
    }

    tokio::fs::create_dir_all(&cli.output)
        .await
        .with_context(|| format!("creating output directory {}", cli.output.display()))?;

    let bar = ProgressBar::new(jobs.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{bar:40.green/238}] {pos}/{len} documents",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );

    let results = futures::future::join_all(jobs.iter().map(|(id, email, passcode)| {
        let config = &config;
        let bar = bar.clone();
        async move {
            let outcome = retrieve(id, email.as_deref(), passcode.as_deref(), config).await;
            bar.inc(1);
            (id.clone(), outcome)
        }
    }))
    .await;
    bar.finish_and_clear();

    let total = results.len();
    let mut failed = 0usize;
    for (id, outcome) in results {
        match outcome {
            Ok(artifact) => {
                let path = cli.output.join(&artifact.file_name);
                tokio::fs::write(&path, &artifact.bytes)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
                println!("{} {} \u{2192} {}", green("\u{2713}"), id, path.display());
            }
            Err(e) => {
                failed += 1;
                eprintln!("{} {}: {}", red("\u{2717}"), id, e);
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {total} retrievals failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doc_spec_id_only() {
        let spec = DocSpec::from_str("abc123").unwrap();
        assert_eq!(spec.target, "abc123");
        assert_eq!(spec.email, None);
        assert_eq!(spec.passcode, None);
    }

    #[test]
    fn doc_spec_with_email_and_passcode() {
        let spec = DocSpec::from_str("abc123,me@example.com,s3cret").unwrap();
        assert_eq!(spec.email.as_deref(), Some("me@example.com"));
        assert_eq!(spec.passcode.as_deref(), Some("s3cret"));
    }

    #[test]
    fn doc_spec_empty_fields_become_none() {
        let spec = DocSpec::from_str("abc123,,s3cret").unwrap();
        assert_eq!(spec.email, None);
        assert_eq!(spec.passcode.as_deref(), Some("s3cret"));
    }
}
