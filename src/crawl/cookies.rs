//! Best-effort parser for folded `Set-Cookie` header values.
//!
//! Some of the HTTP stacks in front of publisher sites fold multiple
//! `Set-Cookie` headers into one comma-separated line. The parser here
//! re-splits such lines with a token heuristic: the text is split on `=`,
//! the last whitespace-separated word before each `=` is the next key, and
//! a trailing `,` in a value closes one cookie and opens the next. It never
//! fails hard — unparseable fragments are dropped and the crawl continues.

use std::collections::BTreeMap;
use std::fmt;

use tracing::{debug, trace};

/// A single cookie parsed from a `Set-Cookie` value.
///
/// The value field is redacted in Debug output so session tokens never end
/// up in diagnostic logs.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Cookie {
    /// Cookie name; identity within one crawl.
    pub name: String,
    /// Cookie value (sensitive — never log).
    value: String,
    /// Raw `Expires` attribute, when present.
    pub expires: Option<String>,
    /// `Domain` attribute, when present.
    pub domain: Option<String>,
    /// `Path` attribute, when present.
    pub path: Option<String>,
    /// `Secure` attribute.
    pub secure: bool,
    /// Whether the name/value pair has been assigned yet.
    named: bool,
}

impl Cookie {
    /// Creates a plain name/value cookie.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            named: true,
            ..Self::default()
        }
    }

    /// Returns the cookie value.
    ///
    /// Cookie values are sensitive — avoid logging the return value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Routes a key/value pair onto the matching attribute field.
    ///
    /// Attribute keys are case-insensitive. The first unrecognized pair
    /// becomes the cookie's name/value; later unrecognized pairs within the
    /// same cookie are ignored.
    fn set_pair(&mut self, key: &str, value: &str) {
        match key.to_ascii_lowercase().as_str() {
            "expires" => self.expires = Some(value.to_string()),
            "domain" => self.domain = Some(value.to_string()),
            "path" => self.path = Some(value.to_string()),
            "secure" => self.secure = !value.is_empty() && value != "0",
            _ => {
                if !self.named {
                    self.name = key.to_string();
                    self.value = value.to_string();
                    self.named = true;
                }
            }
        }
    }
}

impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("expires", &self.expires)
            .field("domain", &self.domain)
            .field("path", &self.path)
            .field("secure", &self.secure)
            .finish()
    }
}

/// Parses one (possibly folded) `Set-Cookie` header value into cookies, in
/// the order they appear.
#[must_use]
pub fn parse_set_cookie(header: &str) -> Vec<Cookie> {
    let parts: Vec<&str> = header.split('=').collect();
    if parts.len() < 2 {
        trace!(header_len = header.len(), "Set-Cookie value without '=', dropping");
        return Vec::new();
    }

    let mut cookies = Vec::new();
    let mut cookie = Cookie::default();
    let mut key = parts[0];

    for (i, part) in parts.iter().enumerate().skip(1) {
        if i == parts.len() - 1 {
            // Final segment is the value for the pending key.
            cookie.set_pair(key, part);
            cookies.push(cookie);
            break;
        }

        // The last whitespace-separated word of this segment is the next
        // key; everything before it (minus the separator char) is the value
        // for the pending key.
        let next_key = part.rsplit(' ').next().unwrap_or(part);
        let cut = part.len().saturating_sub(next_key.len() + 1);
        let with_terminator = safe_prefix(part, cut);
        let terminator = with_terminator.chars().next_back();
        let value = match terminator {
            Some(c) => &with_terminator[..with_terminator.len() - c.len_utf8()],
            None => with_terminator,
        };

        cookie.set_pair(key, value);
        if terminator == Some(',') {
            cookies.push(std::mem::take(&mut cookie));
        }
        key = next_key;
    }

    cookies
}

/// Accumulated cookies for one crawl, keyed by name (last write wins).
///
/// The jar is threaded explicitly through every recursive crawl call so
/// concurrent crawls stay isolated from each other. A `BTreeMap` keeps the
/// rendered request header deterministic for request fingerprinting.
#[derive(Clone, Debug, Default)]
pub struct CookieJar {
    cookies: BTreeMap<String, Cookie>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a `Set-Cookie` value and merges the resulting cookies into
    /// the jar, overwriting prior entries with the same name.
    pub fn merge_set_cookie(&mut self, header: &str) {
        for cookie in parse_set_cookie(header) {
            if cookie.name.is_empty() {
                trace!("dropping parsed cookie without a name");
                continue;
            }
            debug!(cookie = %cookie.name, "merging cookie into jar");
            self.cookies.insert(cookie.name.clone(), cookie);
        }
    }

    /// Inserts a single cookie, overwriting any prior entry with its name.
    pub fn insert(&mut self, cookie: Cookie) {
        self.cookies.insert(cookie.name.clone(), cookie);
    }

    /// Renders the outgoing `Cookie` request header value, joining every
    /// entry as `name=value; `.
    #[must_use]
    pub fn header_value(&self) -> String {
        self.cookies
            .values()
            .map(|c| format!("{}={}; ", c.name, c.value))
            .collect()
    }

    /// Number of cookies currently in the jar.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Whether the jar holds no cookies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Looks up a cookie by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Cookie> {
        self.cookies.get(name)
    }
}

/// Byte prefix of `s`, backed off to the nearest char boundary so malformed
/// multi-byte input can never panic the parser.
fn safe_prefix(s: &str, mut len: usize) -> &str {
    if len >= s.len() {
        return s;
    }
    while len > 0 && !s.is_char_boundary(len) {
        len -= 1;
    }
    &s[..len]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_single_cookie_with_attributes() {
        let cookies =
            parse_set_cookie("sessionid=abc123; path=/; domain=.example.com; expires=Wed");
        assert_eq!(cookies.len(), 1);
        let c = &cookies[0];
        assert_eq!(c.name, "sessionid");
        assert_eq!(c.value(), "abc123");
        assert_eq!(c.path.as_deref(), Some("/"));
        assert_eq!(c.domain.as_deref(), Some(".example.com"));
        assert_eq!(c.expires.as_deref(), Some("Wed"));
    }

    #[test]
    fn test_parse_folded_line_yields_multiple_cookies() {
        let cookies = parse_set_cookie("first=one; expires=Mon, second=two; path=/x");
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "first");
        assert_eq!(cookies[0].value(), "one");
        assert_eq!(cookies[0].expires.as_deref(), Some("Mon"));
        assert_eq!(cookies[1].name, "second");
        assert_eq!(cookies[1].value(), "two");
        assert_eq!(cookies[1].path.as_deref(), Some("/x"));
    }

    #[test]
    fn test_parse_attribute_keys_are_case_insensitive() {
        let cookies = parse_set_cookie("token=xyz; Path=/a; Secure=1; Expires=Thu");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].path.as_deref(), Some("/a"));
        assert!(cookies[0].secure);
    }

    #[test]
    fn test_parse_second_unrecognized_pair_is_ignored() {
        let cookies = parse_set_cookie("name=val; other=ignored");
        assert_eq!(cookies.len(), 1);
        assert_eq!(cookies[0].name, "name");
        assert_eq!(cookies[0].value(), "val");
    }

    #[test]
    fn test_parse_value_without_equals_yields_nothing() {
        assert!(parse_set_cookie("garbage without separators").is_empty());
        assert!(parse_set_cookie("").is_empty());
    }

    #[test]
    fn test_parse_malformed_input_does_not_panic() {
        // Segment shorter than the derived next key.
        let _ = parse_set_cookie("a=b=c");
        let _ = parse_set_cookie("=");
        let _ = parse_set_cookie("==,=");
        let _ = parse_set_cookie("k=\u{e9}\u{e9} x=y");
    }

    #[test]
    fn test_jar_merge_is_last_write_wins() {
        let mut jar = CookieJar::new();
        jar.merge_set_cookie("sid=old");
        jar.merge_set_cookie("sid=new");
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get("sid").map(Cookie::value), Some("new"));
    }

    #[test]
    fn test_jar_header_value_joins_entries() {
        let mut jar = CookieJar::new();
        jar.insert(Cookie::new("a", "1"));
        jar.insert(Cookie::new("b", "2"));
        assert_eq!(jar.header_value(), "a=1; b=2; ");
    }

    #[test]
    fn test_jar_empty_renders_empty_header() {
        assert_eq!(CookieJar::new().header_value(), "");
        assert!(CookieJar::new().is_empty());
    }
}
