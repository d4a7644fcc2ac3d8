//! Recursive crawl engine: resolve a DOI landing page down to a PDF/PS.
//!
//! One [`Crawler`] instance performs one DOI resolution. Starting from the
//! resolver URL it fetches pages with manual cookie and redirect handling,
//! sniffs each body for document magic bytes, ranks extracted links by
//! relevance, and recurses depth-first into the best candidates until a
//! document is written, budgets run out, or every branch is exhausted.
//!
//! Branch results are small integers so outcomes aggregate upward with
//! plain comparisons: see [`codes`].

pub mod cookies;
pub mod fetch;
pub mod links;
pub mod state;
pub mod urls;

use std::sync::{Mutex, PoisonError};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::{debug, error, info};

use crate::output::Sink;
pub use cookies::{Cookie, CookieJar};
pub use fetch::{FetchError, FetchResult, Fetcher};
pub use links::LinkCandidate;
pub use state::CrawlState;

/// Branch result codes.
///
/// `0` means a document was written, `1` means "nothing found along this
/// branch" (non-fatal, siblings keep being tried), a 3-digit HTTP status
/// `>= 400` propagates an upstream resource error, and negative values are
/// local fatal conditions that halt the whole crawl like a success does.
pub mod codes {
    /// Document found and written.
    pub const FOUND: i32 = 0;
    /// No suitable document along this branch.
    pub const NOT_FOUND: i32 = 1;
    /// Writing the payload was refused or failed locally.
    pub const WRITE_FAILED: i32 = -1;
}

/// Budgets bounding one crawl.
#[derive(Debug, Clone, Copy)]
pub struct CrawlConfig {
    /// Link-following recursion depth (redirects are free).
    pub max_depth: i32,
    /// Total fetches allowed across the whole crawl.
    pub max_fetches: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: 2,
            max_fetches: 20,
        }
    }
}

/// Recursive crawl driver; one instance per DOI resolution.
#[derive(Debug)]
pub struct Crawler {
    fetcher: Fetcher,
    doi: String,
    sink: Sink,
    config: CrawlConfig,
    // Shared along the single active call chain; a Mutex so depth and
    // fetch budgets stay correct if sibling candidates are ever fanned out.
    state: Mutex<CrawlState>,
}

impl Crawler {
    /// Creates a crawler for one DOI (or URL-path) resolution.
    ///
    /// `doi` is the similarity reference used for candidate scoring.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] when the HTTP client cannot be built.
    pub fn new(doi: impl Into<String>, sink: Sink, config: CrawlConfig) -> Result<Self, FetchError> {
        Ok(Self {
            fetcher: Fetcher::new()?,
            doi: doi.into(),
            sink,
            config,
            state: Mutex::new(CrawlState::new()),
        })
    }

    /// Runs the crawl from a start URL and returns the final branch code.
    pub async fn run(&self, start_url: &str) -> i32 {
        self.scan(start_url.to_string(), self.config.max_depth, CookieJar::new())
            .await
    }

    /// One recursive step: fetch, classify, accumulate cookies, follow
    /// redirects at the same depth, then recurse into ranked links at
    /// `depth - 1`.
    fn scan(&self, url: String, depth: i32, mut jar: CookieJar) -> BoxFuture<'_, i32> {
        async move {
            if depth < 0 {
                info!(url = %url, "maximum recursion depth reached");
                return codes::NOT_FOUND;
            }

            let header_lines = self.fetcher.request_header_lines(&jar);
            let fingerprint = state::request_fingerprint(&url, &header_lines);
            {
                let mut crawl_state = self.lock_state();
                if crawl_state.fetch_count() >= self.config.max_fetches {
                    info!("maximum scan count reached");
                    return codes::NOT_FOUND;
                }
                if !crawl_state.record_fetch(fingerprint, &url) {
                    info!(url = %url, "request already issued, skipping");
                    return codes::NOT_FOUND;
                }
            }

            info!(url = %url, depth, "fetching");
            let response = match self.fetcher.fetch(&url, &jar).await {
                Ok(response) => response,
                Err(e) => {
                    error!(url = %url, error = %e, "fetch failed");
                    return codes::NOT_FOUND;
                }
            };

            if response.status >= 400 {
                info!(url = %url, status = response.status, "upstream error, abandoning branch");
                return i32::from(response.status);
            }

            if response.is_document() {
                info!(url = %url, bytes = response.body.len(), "PDF/PS found");
                return match self.sink.write(&response.body).await {
                    Ok(()) => codes::FOUND,
                    Err(e) => {
                        error!(error = %e, "storing document failed");
                        codes::WRITE_FAILED
                    }
                };
            }

            for header in response.set_cookie_values() {
                jar.merge_set_cookie(header);
            }

            let locations: Vec<&str> = response.location_values().collect();
            if !locations.is_empty() {
                let mut target = url.clone();
                for location in &locations {
                    target = urls::relocate(&target, urls::clean_url(location));
                    debug!(target = %target, "redirect location resolved");
                }
                if target != url {
                    // Redirects do not consume recursion budget. An error
                    // status behind the redirect degrades to "not found".
                    info!(from = %url, to = %target, "following redirect");
                    let result = self.scan(target, depth, jar.clone()).await;
                    return result.min(codes::NOT_FOUND);
                }
                // Location pointing back at the current URL: fall through
                // to link extraction on the (likely empty) body.
            }

            let visited = self.lock_state().visited_snapshot();
            let html = String::from_utf8_lossy(&response.body);
            let candidates = links::extract_candidates(&html, &url, &self.doi, &visited);
            debug!(url = %url, candidates = candidates.len(), "ranked link candidates");

            for candidate in candidates {
                debug!(
                    target = %candidate.url,
                    hit_measure = candidate.hit_measure,
                    keyword_hits = candidate.count,
                    "recursing into candidate"
                );
                let result = self.scan(candidate.url, depth - 1, jar.clone()).await;
                if result <= codes::FOUND {
                    // Success or a local fatal condition: stop trying
                    // siblings and let the code bubble all the way up.
                    return result;
                }
            }

            codes::NOT_FOUND
        }
        .boxed()
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CrawlState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
