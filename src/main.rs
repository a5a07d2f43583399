//! CLI entry point for coursegrab.

use anyhow::{Context, Result};
use clap::Parser;
use coursegrab_core::{HttpClient, preview_harvest, run_harvest};
use tracing::{debug, info};

mod cli;

use cli::Args;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    init_tracing(args.default_log_level(), args.no_color);
    debug!(?args, "CLI arguments parsed");

    // All patterns compile before any request is made.
    let config = args.harvest_config()?;
    info!(pattern = %config.inclusion(), "Using target pattern");
    if !config.restrictions().is_empty() {
        info!(
            words = %config.restrictions().words().join(", "),
            "Restricting files containing"
        );
    }

    let timeouts = config.timeouts();
    let client = HttpClient::with_timeouts(timeouts.connect_secs, timeouts.read_secs);

    if args.dry_run {
        let previews = preview_harvest(&client, &config)
            .await
            .with_context(|| format!("failed to scan {}", config.page_url()))?;
        for preview in &previews {
            match &preview.restricted_by {
                Some(word) => println!("- [skip: {word}] {}", preview.url),
                None => println!("- [download] {} -> {}", preview.url, preview.filename),
            }
        }
        let restricted = previews.iter().filter(|p| p.is_restricted()).count();
        println!(
            "Dry run - no files downloaded ({} to download, {restricted} restricted)",
            previews.len() - restricted
        );
        return Ok(());
    }

    let stats = run_harvest(&client, &config)
        .await
        .with_context(|| format!("failed to scan {}", config.page_url()))?;

    debug!(?stats, "run finished");
    Ok(())
}

fn init_tracing(default_level: &str, no_color_flag: bool) {
    let no_color =
        no_color_flag || std::env::var_os("NO_COLOR").is_some_and(|value| !value.is_empty());
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_env_filter(filter)
        .try_init();
}
