//! Per-crawl deduplication state and fetch accounting.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

/// Mutable state for one crawl invocation.
///
/// The fingerprint set only ever grows: an identical URL + outgoing-request
/// combination is fetched at most once per crawl. Visited URLs are tracked
/// separately and only down-rank candidates, they never forbid a revisit
/// under a different cookie state.
#[derive(Debug, Default)]
pub struct CrawlState {
    fetched: HashSet<String>,
    visited: HashSet<String>,
    fetch_count: usize,
}

impl CrawlState {
    /// Creates empty state for a fresh crawl.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of fetches issued so far.
    #[must_use]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count
    }

    /// Records an outgoing request. Returns `false` when the fingerprint
    /// was already issued in this crawl (the request must be skipped).
    pub fn record_fetch(&mut self, fingerprint: String, url: &str) -> bool {
        if !self.fetched.insert(fingerprint) {
            return false;
        }
        self.visited.insert(url.to_string());
        self.fetch_count += 1;
        true
    }

    /// Snapshot of the visited-URL set for candidate scoring.
    #[must_use]
    pub fn visited_snapshot(&self) -> HashSet<String> {
        self.visited.clone()
    }
}

/// Deterministic fingerprint over a request's URL and full outgoing header
/// lines (including the rendered cookie header).
#[must_use]
pub fn request_fingerprint(url: &str, header_lines: &[String]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    for line in header_lines {
        hasher.update(b"\n");
        hasher.update(line.as_bytes());
    }
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        use std::fmt::Write;
        let _ = write!(out, "{byte:02x}");
    }
    out
}
