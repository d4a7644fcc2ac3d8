//! DOI detection and normalization into a crawl target.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use url::Url;

use super::error::ParseError;

/// Regex pattern for bare DOIs: `10.XXXX/suffix`.
/// Handles nested registrants like `10.1000.10/example`.
#[allow(clippy::expect_used)]
static DOI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^10\.\d{4,9}(?:\.\d+)*/[^\s<>"']+$"#).expect("DOI regex is valid") // Static pattern, safe to panic
});

/// A parsed crawl target: where to start and what to score against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTarget {
    /// URL the crawl starts from.
    pub start_url: String,
    /// Reference string for link similarity scoring: the DOI itself, or
    /// the path component of a pre-resolved URL.
    pub similarity_reference: String,
    /// The DOI, when the input contained one (used for `--auto-name`).
    pub doi: Option<String>,
}

/// Parses user input — a DOI in any common spelling, or a pre-resolved
/// http(s) URL — into a [`CrawlTarget`].
///
/// A DOI is rewritten to the `http://dx.doi.org/<doi>` resolver URL;
/// `doi.org`/`dx.doi.org` URLs are treated as DOI inputs.
///
/// # Errors
///
/// Returns [`ParseError`] for empty or unrecognizable input.
pub fn parse_target(input: &str) -> Result<CrawlTarget, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    if let Some(doi) = strip_doi_prefixes(trimmed) {
        // DOIs pasted out of citations often drag a trailing period or
        // comma along.
        let doi = doi.trim_end_matches(['.', ',', ';']);
        if DOI_PATTERN.is_match(doi) {
            debug!(doi = %doi, "input recognized as DOI");
            return Ok(CrawlTarget {
                start_url: format!("http://dx.doi.org/{doi}"),
                similarity_reference: doi.to_string(),
                doi: Some(doi.to_string()),
            });
        }
    }

    if let Ok(url) = Url::parse(trimmed) {
        if matches!(url.scheme(), "http" | "https") {
            debug!(url = %trimmed, "input recognized as pre-resolved URL");
            return Ok(CrawlTarget {
                start_url: trimmed.to_string(),
                similarity_reference: url.path().to_string(),
                doi: None,
            });
        }
    }

    Err(ParseError::Unrecognized {
        input: trimmed.to_string(),
    })
}

/// Strips DOI spellings down to the bare `10.XXXX/...` form, or returns
/// `None` when the input cannot be a DOI at all.
fn strip_doi_prefixes(input: &str) -> Option<&str> {
    let lower = input.to_ascii_lowercase();
    for prefix in [
        "https://doi.org/",
        "http://doi.org/",
        "https://dx.doi.org/",
        "http://dx.doi.org/",
        "doi:",
    ] {
        if lower.starts_with(prefix) {
            return Some(input[prefix.len()..].trim_start());
        }
    }
    if input.starts_with("10.") {
        return Some(input);
    }
    None
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bare_doi() {
        let target = parse_target("10.1016/j.orl.2012.11.009").unwrap();
        assert_eq!(
            target.start_url,
            "http://dx.doi.org/10.1016/j.orl.2012.11.009"
        );
        assert_eq!(target.similarity_reference, "10.1016/j.orl.2012.11.009");
        assert_eq!(target.doi.as_deref(), Some("10.1016/j.orl.2012.11.009"));
    }

    #[test]
    fn test_parse_doi_prefix_spellings() {
        for input in [
            "doi:10.1000/xyz123",
            "DOI:10.1000/xyz123",
            "https://doi.org/10.1000/xyz123",
            "http://dx.doi.org/10.1000/xyz123",
        ] {
            let target = parse_target(input).unwrap();
            assert_eq!(
                target.doi.as_deref(),
                Some("10.1000/xyz123"),
                "input: {input}"
            );
            assert_eq!(target.start_url, "http://dx.doi.org/10.1000/xyz123");
        }
    }

    #[test]
    fn test_parse_doi_with_trailing_citation_punctuation() {
        let target = parse_target("10.1000/xyz123.").unwrap();
        assert_eq!(target.doi.as_deref(), Some("10.1000/xyz123"));
    }

    #[test]
    fn test_parse_nested_registrant_doi() {
        let target = parse_target("10.1000.10/example").unwrap();
        assert_eq!(target.doi.as_deref(), Some("10.1000.10/example"));
    }

    #[test]
    fn test_parse_pre_resolved_url() {
        let target = parse_target("https://publisher.example/article/view/42").unwrap();
        assert_eq!(target.start_url, "https://publisher.example/article/view/42");
        assert_eq!(target.similarity_reference, "/article/view/42");
        assert_eq!(target.doi, None);
    }

    #[test]
    fn test_parse_empty_input() {
        assert_eq!(parse_target("   "), Err(ParseError::EmptyInput));
    }

    #[test]
    fn test_parse_rejects_garbage_and_other_schemes() {
        assert!(matches!(
            parse_target("not a doi"),
            Err(ParseError::Unrecognized { .. })
        ));
        assert!(matches!(
            parse_target("ftp://example.com/file.pdf"),
            Err(ParseError::Unrecognized { .. })
        ));
        // Registrant without a suffix is not a DOI.
        assert!(matches!(
            parse_target("10.1234"),
            Err(ParseError::Unrecognized { .. })
        ));
    }
}
