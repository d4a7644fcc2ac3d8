//! Input parsing: turning a DOI or pre-resolved URL into a crawl target.
//!
//! The crawl engine only needs two things from user input: where to start
//! fetching and which string to score candidate links against. This module
//! recognizes DOIs in their common spellings (bare, `doi:`-prefixed, and
//! `doi.org`/`dx.doi.org` URLs) and plain http(s) URLs.
//!
//! # Example
//!
//! ```
//! use doi2pdf_core::parser::parse_target;
//!
//! let target = parse_target("10.1016/j.orl.2012.11.009").unwrap();
//! assert_eq!(target.start_url, "http://dx.doi.org/10.1016/j.orl.2012.11.009");
//! ```

mod doi;
mod error;

pub use doi::{CrawlTarget, parse_target};
pub use error::ParseError;
