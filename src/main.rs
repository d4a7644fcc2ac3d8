//! CLI entry point for the doi2pdf tool.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use doi2pdf_core::{CrawlConfig, Crawler, CrossrefNamer, Sink, parse_target};
use tracing::{debug, error, info};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Determine log level based on verbose/quiet flags
    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));

    // Logs go to stderr; stdout is reserved for the document payload.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let code = match run(args).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %e, "doi2pdf failed");
            1
        }
    };

    if code == 404 {
        error!("DOI not found (404)");
    } else if code > 0 {
        error!("failed to find any suitable document");
    }

    // The exit code mirrors the crawl result: 0 on success, a 3-digit HTTP
    // status on upstream errors, 1 for "not found"; negative local-fatal
    // codes collapse to a non-zero status.
    std::process::exit(code);
}

async fn run(args: Args) -> Result<i32> {
    let target = parse_target(&args.input)?;
    info!(url = %target.start_url, "starting crawl");

    let output = if args.auto_name {
        let doi = target
            .doi
            .clone()
            .ok_or_else(|| anyhow::anyhow!("--auto-name requires a DOI input"))?;
        let filename = CrossrefNamer::new()?.filename(&doi).await?;
        info!(filename = %filename, "derived output filename");
        Some(PathBuf::from(filename))
    } else {
        args.output.clone()
    };

    let sink = Sink::from_path(output, args.force);
    let config = CrawlConfig {
        max_depth: i32::from(args.max_depth),
        max_fetches: usize::from(args.max_fetches),
    };
    let crawler = Crawler::new(target.similarity_reference.clone(), sink, config)?;

    Ok(crawler.run(&target.start_url).await)
}
