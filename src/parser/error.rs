//! Error types for crawl-target parsing.

use thiserror::Error;

/// Errors turning user input into a crawl target.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    /// The input was empty or whitespace.
    #[error("no DOI or URL given")]
    EmptyInput,

    /// The input is neither a DOI nor an http(s) URL.
    #[error(
        "'{input}' is not a DOI or an http(s) URL\n  Suggestion: pass a DOI like 10.1016/j.orl.2012.11.009 or a full https:// URL"
    )]
    Unrecognized {
        /// The rejected input.
        input: String,
    },
}
