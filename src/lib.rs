//! doi2pdf Core Library
//!
//! Resolves a Digital Object Identifier (DOI) to a downloadable PDF or
//! PostScript file by crawling the publisher landing page it points to:
//! redirects and cookies are handled manually, candidate links are ranked
//! by a keyword/similarity/position heuristic, and the best branches are
//! followed recursively until the document's magic bytes turn up.
//!
//! # Architecture
//!
//! - [`parser`] - DOI/URL input normalization into a crawl target
//! - [`crawl`] - the recursive fetch/score/recurse engine
//! - [`output`] - file or stdout destination for the retrieved payload
//! - [`naming`] - optional Crossref-derived output filenames

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod crawl;
pub mod naming;
pub mod output;
pub mod parser;

// Re-export commonly used types
pub use crawl::{
    Cookie, CookieJar, CrawlConfig, CrawlState, Crawler, FetchError, FetchResult, Fetcher,
    LinkCandidate, codes,
};
pub use naming::{CrossrefNamer, NamingError};
pub use output::{OutputError, Sink};
pub use parser::{CrawlTarget, ParseError, parse_target};
