//! Single-request HTTP fetcher with manual redirect and cookie handling.
//!
//! The crawl controller needs to observe every redirect and `Set-Cookie`
//! itself, so the client is built with redirect following disabled and the
//! cookie header is rendered from the crawl's own jar. HTTP error statuses
//! are data to inspect, not failures; only transport-level problems (DNS,
//! connect, timeout) surface as [`FetchError`].

use std::time::Duration;

use reqwest::header::{COOKIE, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, ClientBuilder};
use tracing::{debug, instrument};

use super::cookies::CookieJar;

/// Fixed identifying header; some publishers refuse requests without a
/// browser-like User-Agent.
pub const CRAWL_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 5.1; rv:23.0) Gecko/20100101 Firefox/23.0";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const READ_TIMEOUT_SECS: u64 = 30;

/// Errors from the fetcher. HTTP error statuses are not errors here.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// HTTP client construction failed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// Transport-level failure: DNS, connection refused, timeout, invalid
    /// URL. Distinct from an HTTP error status, which is returned as data.
    #[error("transport failure fetching {url}: {source}")]
    Transport {
        /// The URL that failed.
        url: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },
}

/// One request/response cycle: status, response headers, raw body bytes.
#[derive(Debug)]
pub struct FetchResult {
    /// HTTP status code.
    pub status: u16,
    /// Response header name/value pairs, in wire order, repeats preserved.
    pub headers: Vec<(String, String)>,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl FetchResult {
    /// All `Set-Cookie` header values, in response order.
    pub fn set_cookie_values(&self) -> impl Iterator<Item = &str> {
        self.header_values("set-cookie")
    }

    /// All `Location` header values, in response order.
    pub fn location_values(&self) -> impl Iterator<Item = &str> {
        self.header_values("location")
    }

    /// Whether the body's first five bytes are the `%PDF-` or `%!PS-`
    /// magic, identifying a downloadable document.
    #[must_use]
    pub fn is_document(&self) -> bool {
        self.body.starts_with(b"%PDF-") || self.body.starts_with(b"%!PS-")
    }

    fn header_values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.headers
            .iter()
            .filter(move |(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Issues single GET requests without following redirects.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Builds the fetcher's HTTP client with the crawl networking policy:
    /// no automatic redirects, fixed User-Agent, bounded timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Client`] when client construction fails.
    pub fn new() -> Result<Self, FetchError> {
        let client = ClientBuilder::new()
            .redirect(Policy::none())
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// The full outgoing header lines for a request to `url` with the given
    /// jar, as used for request fingerprinting.
    #[must_use]
    pub fn request_header_lines(&self, jar: &CookieJar) -> Vec<String> {
        let mut lines = vec![format!("User-Agent: {CRAWL_USER_AGENT}")];
        if !jar.is_empty() {
            lines.push(format!("Cookie: {}", jar.header_value()));
        }
        lines
    }

    /// Performs one GET and captures status, headers and body.
    ///
    /// 4xx/5xx responses are returned as a normal [`FetchResult`].
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Transport`] on DNS/connect/timeout failures or
    /// an unusable URL.
    #[instrument(skip(self, jar), fields(cookies = jar.len()))]
    pub async fn fetch(&self, url: &str, jar: &CookieJar) -> Result<FetchResult, FetchError> {
        let mut request = self.client.get(url).header(USER_AGENT, CRAWL_USER_AGENT);
        if !jar.is_empty() {
            request = request.header(COOKIE, jar.header_value());
        }

        let response = request.send().await.map_err(|source| FetchError::Transport {
            url: url.to_string(),
            source,
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?
            .to_vec();

        debug!(status, body_len = body.len(), "response captured");
        Ok(FetchResult {
            status,
            headers,
            body,
        })
    }
}
