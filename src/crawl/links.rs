//! Link extraction and relevance scoring for crawled pages.
//!
//! Candidates come from `<a href>`, `<frame src>` and `<iframe src>`
//! elements, matched with regular expressions rather than a structural
//! parser: the scoring heuristic depends on raw markup and byte offsets in
//! the page exactly as served, which a DOM round-trip would not preserve.
//!
//! Each surviving candidate gets a composite `hit_measure` combining PDF
//! keyword density, weighted edit distance between the DOI and the resolved
//! URL, and how early the link appears on the page.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;

use super::urls::{clean_url, relocate};

/// Longest prefix of the DOI and URL strings fed into the edit distance.
const SIMILARITY_PREFIX_LEN: usize = 255;

/// Edit costs for the DOI-to-URL distance.
const COST_INSERT: usize = 1;
const COST_DELETE: usize = 2;
const COST_SUBSTITUTE: usize = 3;

// The Rust regex engine has no backreferences, so the optionally-quoted
// attribute value is an alternation of double-quoted, single-quoted and
// bare forms instead of the usual `(["']?)...\1`.
#[allow(clippy::expect_used)]
static ANCHOR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^"'\s>]+))[^>]*>(.*?)</a>"#,
    )
    .expect("anchor regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static FRAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<frame\s[^>]*?src\s*=\s*(?:"([^"]*)"|'([^']*)'|([^"'\s>]+))[^>]*>(.*?)<"#,
    )
    .expect("frame regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static IFRAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?is)<iframe\s[^>]*?src\s*=\s*(?:"([^"]*)"|'([^']*)'|([^"'\s>]+))[^>]*>(.*?)<"#,
    )
    .expect("iframe regex is valid") // Static pattern, safe to panic
});

/// Keyword signal for a link that plausibly leads to a PDF/PS document.
/// Tokens must be bounded by non-word characters on both sides.
#[allow(clippy::expect_used)]
static KEYWORD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\W(PDF|PS|Full Text)\W").expect("keyword regex is valid") // Static pattern, safe to panic
});

#[allow(clippy::expect_used)]
static WHITESPACE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+").expect("whitespace regex is valid") // Static pattern, safe to panic
});

/// One extracted link, scored for how likely it leads to the document.
#[derive(Debug, Clone)]
pub struct LinkCandidate {
    /// Raw matched markup, whitespace-normalized.
    pub markup: String,
    /// Absolute target URL.
    pub url: String,
    /// Visible title text, whitespace-normalized.
    pub title: String,
    /// Number of PDF/PS/Full-Text keyword hits in the markup.
    pub count: usize,
    /// Weighted edit distance between the DOI and the resolved URL.
    pub similarity: usize,
    /// Byte offset of the first occurrence of the raw href in the page.
    pub pos: usize,
    /// 0-based rank of `pos` among surviving candidates (ties share the
    /// rank of their first sorted occurrence).
    pub pos_rank: usize,
    /// Composite relevance score; higher is better.
    pub hit_measure: f64,
    /// Whether the resolved URL was already visited in this crawl.
    pub already_visited: bool,
}

/// Extracts link candidates from an HTML body, most relevant first.
///
/// Candidates with an empty href, a bare fragment, or an
/// `onclick=`/`javascript:` target are dropped, as is anything without a
/// single keyword hit. The result is stably sorted with unvisited targets
/// before visited ones and descending `hit_measure` within each group.
#[must_use]
pub fn extract_candidates(
    html: &str,
    page_url: &str,
    doi: &str,
    visited: &HashSet<String>,
) -> Vec<LinkCandidate> {
    let mut candidates = Vec::new();

    for pattern in [&*ANCHOR_PATTERN, &*FRAME_PATTERN, &*IFRAME_PATTERN] {
        for caps in pattern.captures_iter(html) {
            let raw_markup = caps.get(0).map_or("", |m| m.as_str());
            let href = caps
                .get(1)
                .or_else(|| caps.get(2))
                .or_else(|| caps.get(3))
                .map_or("", |m| m.as_str())
                .trim();
            let inner = caps.get(4).map_or("", |m| m.as_str());

            if !is_valid_href(href) {
                trace!(href = %href, "dropping invalid link target");
                continue;
            }

            let markup = normalize_whitespace(raw_markup);
            let title = normalize_whitespace(inner);
            let url = relocate(page_url, clean_url(href));

            let count = KEYWORD_PATTERN.find_iter(&markup).count();
            if count == 0 {
                // No PDF/PS/Full-Text signal at all; never followed.
                continue;
            }

            let similarity = edit_distance(doi, &url);
            let pos = html.find(href).unwrap_or(html.len());
            let already_visited = visited.contains(&url);

            candidates.push(LinkCandidate {
                markup,
                url,
                title,
                count,
                similarity,
                pos,
                pos_rank: 0,
                hit_measure: 0.0,
                already_visited,
            });
        }
    }

    assign_position_ranks(&mut candidates);
    for candidate in &mut candidates {
        candidate.hit_measure = candidate.count as f64
            / (1.0 + candidate.similarity as f64 + candidate.pos_rank as f64);
    }

    // Stable: unvisited first, then by descending relevance.
    candidates.sort_by(|a, b| {
        a.already_visited
            .cmp(&b.already_visited)
            .then_with(|| b.hit_measure.total_cmp(&a.hit_measure))
    });

    candidates
}

/// Rejects empty hrefs, bare fragments and script pseudo-targets.
fn is_valid_href(href: &str) -> bool {
    !(href.is_empty()
        || href.starts_with('#')
        || href.starts_with("onclick=")
        || href.starts_with("javascript:"))
}

fn normalize_whitespace(text: &str) -> String {
    WHITESPACE_PATTERN.replace_all(text, " ").trim().to_string()
}

/// Ranks candidates by ascending page position; candidates sharing a `pos`
/// all receive the rank of its first sorted occurrence.
fn assign_position_ranks(candidates: &mut [LinkCandidate]) {
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| candidates[i].pos);

    let mut first_rank: HashMap<usize, usize> = HashMap::new();
    for (rank, &i) in order.iter().enumerate() {
        let shared = *first_rank.entry(candidates[i].pos).or_insert(rank);
        candidates[i].pos_rank = shared;
    }
}

/// Weighted Levenshtein distance over the byte prefixes of `from` and `to`
/// (insertion 1, deletion 2, substitution 3), measuring the cost of
/// turning the DOI string into the candidate URL.
#[must_use]
pub fn edit_distance(from: &str, to: &str) -> usize {
    let a = byte_prefix(from, SIMILARITY_PREFIX_LEN);
    let b = byte_prefix(to, SIMILARITY_PREFIX_LEN);

    let mut prev: Vec<usize> = (0..=b.len()).map(|j| j * COST_INSERT).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = (i + 1) * COST_DELETE;
        for (j, &cb) in b.iter().enumerate() {
            let substitute = prev[j] + if ca == cb { 0 } else { COST_SUBSTITUTE };
            let delete = prev[j + 1] + COST_DELETE;
            let insert = curr[j] + COST_INSERT;
            curr[j + 1] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn byte_prefix(s: &str, len: usize) -> &[u8] {
    let bytes = s.as_bytes();
    &bytes[..bytes.len().min(len)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(html: &str) -> Vec<LinkCandidate> {
        extract_candidates(html, "http://host/page", "10.1000/xyz", &HashSet::new())
    }

    #[test]
    fn test_extract_keeps_only_keyword_links() {
        let html = r#"<a href="/x.pdf">Full Text PDF</a> <a href="/y">About</a>"#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "http://host/x.pdf");
        assert_eq!(candidates[0].title, "Full Text PDF");
        assert!(candidates[0].count > 0);
    }

    #[test]
    fn test_extract_counts_keyword_hits() {
        let html = r#"<a href="/doc" title="PDF download">(PDF)</a>"#;
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].count, 2);
    }

    #[test]
    fn test_extract_requires_nonword_keyword_boundaries() {
        // "PDFs" and "UPDATEDPS" must not count as keyword hits.
        let html = r#"<a href="/a">my PDFs folder</a><a href="/b">UPDATEDPShere</a>"#;
        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_extract_drops_invalid_targets() {
        let html = concat!(
            r#"<a href="">PDF</a>"#,
            r##"<a href="#top">PDF</a>"##,
            r#"<a href="javascript:void(0)">PDF</a>"#,
            r#"<a href="onclick=open()">PDF</a>"#,
        );
        assert!(extract(html).is_empty());
    }

    #[test]
    fn test_extract_handles_frames_and_iframes() {
        let html = concat!(
            r#"<frame src="/viewer.pdf" name="PDF viewer"><p>"#,
            r#"<iframe src='/embed' title='Full Text'></iframe>"#,
        );
        let candidates = extract(html);
        assert_eq!(candidates.len(), 2);
        let urls: Vec<&str> = candidates.iter().map(|c| c.url.as_str()).collect();
        assert!(urls.contains(&"http://host/viewer.pdf"));
        assert!(urls.contains(&"http://host/embed"));
    }

    #[test]
    fn test_extract_matches_across_newlines_case_insensitively() {
        let html = "<A\n  HREF=\"/x\"\n>Full\nText</A>";
        let candidates = extract(html);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Full Text");
        assert_eq!(candidates[0].count, 1);
    }

    #[test]
    fn test_unvisited_candidates_sort_before_visited() {
        let mut visited = HashSet::new();
        visited.insert("http://host/first.pdf".to_string());
        let html = concat!(
            r#"<a href="/first.pdf">Full Text PDF download here</a>"#,
            r#"<a href="/second.pdf">PDF</a>"#,
        );
        let candidates =
            extract_candidates(html, "http://host/page", "10.1000/xyz", &visited);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url, "http://host/second.pdf");
        assert!(!candidates[0].already_visited);
        assert!(candidates[1].already_visited);
    }

    #[test]
    fn test_sort_is_stable_for_equal_scores() {
        // Two links to the same target share pos (first occurrence),
        // similarity and count, so their scores tie exactly and extraction
        // order must be preserved.
        let html = concat!(
            r#"<a href="/x">PDF one</a>"#,
            r#"<a href="/x">PDF two</a>"#,
        );
        let candidates = extract(html);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].hit_measure, candidates[1].hit_measure);
        assert_eq!(candidates[0].title, "PDF one");
        assert_eq!(candidates[1].title, "PDF two");
    }

    #[test]
    fn test_hit_measure_decreases_with_similarity_and_rank() {
        let base = 2.0 / (1.0 + 3.0 + 0.0);
        let worse_similarity = 2.0 / (1.0 + 4.0 + 0.0);
        let worse_rank = 2.0 / (1.0 + 3.0 + 1.0);
        assert!(worse_similarity < base);
        assert!(worse_rank < base);
    }

    #[test]
    fn test_position_rank_ties_share_first_rank() {
        let mut candidates = vec![
            candidate_at(10),
            candidate_at(5),
            candidate_at(10),
            candidate_at(20),
        ];
        assign_position_ranks(&mut candidates);
        assert_eq!(candidates[0].pos_rank, 1);
        assert_eq!(candidates[1].pos_rank, 0);
        assert_eq!(candidates[2].pos_rank, 1);
        assert_eq!(candidates[3].pos_rank, 3);
    }

    fn candidate_at(pos: usize) -> LinkCandidate {
        LinkCandidate {
            markup: String::new(),
            url: String::new(),
            title: String::new(),
            count: 1,
            similarity: 0,
            pos,
            pos_rank: 0,
            hit_measure: 0.0,
            already_visited: false,
        }
    }

    #[test]
    fn test_edit_distance_costs() {
        // Pure insertions: turning "" into "abc" costs 3 * 1.
        assert_eq!(edit_distance("", "abc"), 3);
        // Pure deletions: turning "abc" into "" costs 3 * 2.
        assert_eq!(edit_distance("abc", ""), 6);
        // One substitution costs 3.
        assert_eq!(edit_distance("abc", "abd"), 3);
        // Identical strings cost nothing.
        assert_eq!(edit_distance("10.1000/xyz", "10.1000/xyz"), 0);
    }

    #[test]
    fn test_edit_distance_prefers_cheap_insertions_over_substitution() {
        // "ab" -> "axb": inserting "x" (cost 1) beats substitute+insert.
        assert_eq!(edit_distance("ab", "axb"), 1);
    }
}
