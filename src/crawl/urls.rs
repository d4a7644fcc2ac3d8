//! Relative-to-absolute URL resolution for crawled pages.
//!
//! Publisher landing pages link to PDFs with every flavor of relative href,
//! and redirect `Location` headers are frequently relative as well. The
//! resolver here is deliberately string-based: it joins scheme, authority
//! and path segments without collapsing `.`/`..` or duplicate slashes, so
//! byte offsets and similarity scores computed against the raw page stay
//! consistent with what the page actually contains.

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;
use url::Url;

/// Matches a candidate that already carries a scheme (`https:`, `ftp:`,
/// `mailto:`, ...) and therefore must not be re-resolved.
#[allow(clippy::expect_used)]
static SCHEME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z][A-Za-z0-9+.\-]*:").expect("scheme regex is valid") // Static pattern, safe to panic
});

/// Resolves a candidate href against the URL of the page it was found on.
///
/// Resolution rules, in order:
/// - `//host/...` gets an `http:` scheme prefix,
/// - anything with a scheme is returned unchanged,
/// - `#frag` and `?query` are appended directly to the base URL,
/// - otherwise the base path loses its last segment (or is emptied entirely
///   for root-relative candidates) and the pieces are joined as
///   `scheme://authority<path>/<candidate>`.
///
/// No `.`/`..` or duplicate-slash normalization is performed.
#[must_use]
pub fn resolve(base: &str, candidate: &str) -> String {
    if candidate.starts_with("//") {
        return format!("http:{candidate}");
    }
    if SCHEME_PATTERN.is_match(candidate) {
        return candidate.to_string();
    }
    if candidate.starts_with('#') || candidate.starts_with('?') {
        return format!("{base}{candidate}");
    }

    let Ok(parsed) = Url::parse(base) else {
        // Base is not an absolute URL; nothing sensible to join against.
        trace!(base = %base, "unparseable base URL, keeping candidate as-is");
        return candidate.to_string();
    };

    let scheme = parsed.scheme();
    let authority = match (parsed.host_str(), parsed.port()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        (None, _) => String::new(),
    };

    let mut path = if candidate.starts_with('/') {
        // Root-relative candidate discards the base path entirely.
        String::new()
    } else {
        strip_last_segment(parsed.path()).to_string()
    };
    if path.ends_with('/') {
        path.pop();
    }
    let rel = candidate.strip_prefix('/').unwrap_or(candidate);

    format!("{scheme}://{authority}{path}/{rel}")
}

/// Resolves a raw `Location` header or href value against the current URL.
///
/// Control characters (`\r`, `\n`, `\t`) are stripped first. A bare page
/// anchor (`#...`) leaves the current URL unchanged instead of resolving.
#[must_use]
pub fn relocate(current: &str, location: &str) -> String {
    let cleaned: String = location
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t'))
        .collect();

    if cleaned.starts_with('#') {
        return current.to_string();
    }

    resolve(current, &cleaned)
}

/// Trims a raw URL value and strips one symmetric pair of surrounding
/// single or double quotes.
#[must_use]
pub fn clean_url(raw: &str) -> &str {
    let trimmed = raw.trim();
    let unquoted = strip_quote_pair(trimmed, '\'');
    let unquoted = strip_quote_pair(unquoted, '"');
    unquoted.trim()
}

fn strip_quote_pair(s: &str, quote: char) -> &str {
    if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Removes the final `/segment` of a path, if any.
fn strip_last_segment(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => path,
    }
}
