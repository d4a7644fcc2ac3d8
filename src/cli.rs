//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

/// Find and download the PDF/PS behind a Digital Object Identifier.
///
/// doi2pdf resolves the DOI through dx.doi.org and recursively scans the
/// publisher landing page for the most plausible full-text link. The
/// retrieved document is written to FILE, or to stdout when FILE is
/// omitted.
#[derive(Parser, Debug)]
#[command(name = "doi2pdf")]
#[command(author, version, about)]
pub struct Args {
    /// DOI (e.g. 10.1016/j.orl.2012.11.009) or a pre-resolved http(s) URL
    pub input: String,

    /// Output file path; omit to write the document to stdout
    pub output: Option<PathBuf>,

    /// Overwrite the output file if it already exists
    #[arg(short, long)]
    pub force: bool,

    /// Derive the output filename from Crossref metadata (requires a DOI input)
    #[arg(long, conflicts_with = "output")]
    pub auto_name: bool,

    /// Link-following recursion depth (redirects are free)
    #[arg(long, default_value_t = 2, value_parser = clap::value_parser!(u8).range(0..=10))]
    pub max_depth: u8,

    /// Total fetches allowed per crawl (1-1000)
    #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u16).range(1..=1000))]
    pub max_fetches: u16,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}
