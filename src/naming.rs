//! Automatic output filenames from Crossref metadata.
//!
//! Resolves a DOI through the Crossref REST API and builds a descriptive
//! filename of the form `Surname_Surname__Title.pdf` (with a `_BOOK`
//! suffix for book-typed works), so saved papers sort usefully on disk.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, instrument};

/// Default Crossref API base URL.
const DEFAULT_BASE_URL: &str = "https://api.crossref.org";

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors resolving a DOI to a filename.
#[derive(Debug, thiserror::Error)]
pub enum NamingError {
    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The Crossref request failed or the response body was unusable.
    #[error("Crossref lookup for {doi} failed: {source}")]
    Http {
        /// The DOI being looked up.
        doi: String,
        /// The underlying request/decode error.
        #[source]
        source: reqwest::Error,
    },

    /// Crossref answered with an error status (404 = unknown DOI).
    #[error("Crossref returned HTTP {status} for {doi}")]
    Status {
        /// The DOI being looked up.
        doi: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The metadata carries no title to name the file after.
    #[error("Crossref metadata for {doi} has no title")]
    MissingTitle {
        /// The DOI being looked up.
        doi: String,
    },
}

// ==================== Crossref API response types ====================

#[derive(Debug, Deserialize)]
struct WorksResponse {
    message: WorkMessage,
}

#[derive(Debug, Deserialize)]
struct WorkMessage {
    title: Option<Vec<String>>,
    author: Option<Vec<WorkAuthor>>,
    #[serde(rename = "type")]
    work_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WorkAuthor {
    family: Option<String>,
}

// ==================== CrossrefNamer ====================

/// Looks up work metadata on Crossref and derives an output filename.
#[derive(Debug, Clone)]
pub struct CrossrefNamer {
    client: Client,
    base_url: String,
}

impl CrossrefNamer {
    /// Creates a namer against the public Crossref API.
    ///
    /// # Errors
    ///
    /// Returns [`NamingError::Client`] when client construction fails.
    pub fn new() -> Result<Self, NamingError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Creates a namer with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`NamingError::Client`] when client construction fails.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, NamingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(NamingError::Client)?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Resolves `doi` to a `Surname_Surname__Title[_BOOK].pdf` filename.
    ///
    /// # Errors
    ///
    /// Returns [`NamingError`] on request failure, error status, or when
    /// the metadata has no title.
    #[instrument(skip(self))]
    pub async fn filename(&self, doi: &str) -> Result<String, NamingError> {
        let url = format!("{}/works/{doi}", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| NamingError::Http {
                doi: doi.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(NamingError::Status {
                doi: doi.to_string(),
                status: status.as_u16(),
            });
        }

        let works: WorksResponse =
            response.json().await.map_err(|source| NamingError::Http {
                doi: doi.to_string(),
                source,
            })?;

        let filename = build_filename(&works.message).ok_or_else(|| NamingError::MissingTitle {
            doi: doi.to_string(),
        })?;
        debug!(doi = %doi, filename = %filename, "derived output filename");
        Ok(filename)
    }
}

/// Builds the filename from work metadata, or `None` without a title.
fn build_filename(message: &WorkMessage) -> Option<String> {
    let title = message
        .title
        .as_ref()
        .and_then(|titles| titles.first())
        .map(|t| clean_title(t))
        .filter(|t| !t.is_empty())?;

    let surnames: Vec<String> = message
        .author
        .iter()
        .flatten()
        .filter_map(|author| author.family.as_deref())
        .map(capitalize_compact)
        .filter(|name| !name.is_empty())
        .collect();

    let suffix = match message.work_type.as_deref() {
        Some("book" | "monograph" | "edited-book") => "_BOOK",
        _ => "",
    };

    let filename = format!("{}__{title}{suffix}.pdf", surnames.join("_"));
    // Slashes and spaces anywhere in the assembled name become underscores.
    Some(filename.replace(['/', ' '], "_"))
}

/// Collapses whitespace runs and merges double dashes.
fn clean_title(title: &str) -> String {
    let collapsed = title.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.replace("--", "-")
}

/// Uppercases the first letter of each word and strips the spaces, so
/// `van der berg` becomes `VanDerBerg`.
fn capitalize_compact(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut prev_alphabetic = false;
    for c in name.trim().chars() {
        if c == ' ' {
            prev_alphabetic = false;
            continue;
        }
        if c.is_alphabetic() {
            if prev_alphabetic {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alphabetic = true;
        } else {
            out.push(c);
            prev_alphabetic = false;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(json: &str) -> WorkMessage {
        match serde_json::from_str(json) {
            Ok(m) => m,
            Err(e) => panic!("test JSON invalid: {e}"),
        }
    }

    #[test]
    fn test_build_filename_joins_surnames_and_title() {
        let msg = message(
            r#"{
                "title": ["Optimal  Routing   Letters"],
                "author": [
                    {"family": "smith", "given": "Ann"},
                    {"family": "van der berg"}
                ],
                "type": "journal-article"
            }"#,
        );
        assert_eq!(
            build_filename(&msg).as_deref(),
            Some("Smith_VanDerBerg__Optimal_Routing_Letters.pdf")
        );
    }

    #[test]
    fn test_build_filename_book_suffix() {
        let msg = message(
            r#"{"title": ["Convex Analysis"], "author": [{"family": "Rockafellar"}], "type": "book"}"#,
        );
        assert_eq!(
            build_filename(&msg).as_deref(),
            Some("Rockafellar__Convex_Analysis_BOOK.pdf")
        );
    }

    #[test]
    fn test_build_filename_collapses_double_dashes() {
        let msg = message(r#"{"title": ["Graphs -- or Trees"], "author": []}"#);
        assert_eq!(build_filename(&msg).as_deref(), Some("__Graphs_-_or_Trees.pdf"));
    }

    #[test]
    fn test_build_filename_replaces_slashes_and_spaces_with_underscores() {
        let msg = message(
            r#"{"title": ["Input/Output Models"], "author": [{"family": "de la Cruz"}]}"#,
        );
        assert_eq!(
            build_filename(&msg).as_deref(),
            Some("DeLaCruz__Input_Output_Models.pdf")
        );
    }

    #[test]
    fn test_build_filename_requires_title() {
        let msg = message(r#"{"author": [{"family": "Smith"}]}"#);
        assert_eq!(build_filename(&msg), None);
        let msg = message(r#"{"title": [], "author": []}"#);
        assert_eq!(build_filename(&msg), None);
    }

    #[test]
    fn test_capitalize_compact() {
        assert_eq!(capitalize_compact("smith"), "Smith");
        assert_eq!(capitalize_compact("van der berg"), "VanDerBerg");
        assert_eq!(capitalize_compact("o'brien"), "O'Brien");
        assert_eq!(capitalize_compact("  yang "), "Yang");
    }
}
