//! Citation parsing and formatting.
//!
//! Free-form citation text ("14", "14-2", "14의2", "제14조의2 제1항 제2호",
//! circled clause glyphs) is matched against a single ordered pattern
//! table, most specific first; the first match wins. The table is the
//! parsing rule: new citation shapes are added as rows, never as ad-hoc
//! branches, and no two rows may match the same input with different
//! results.

use regex::Regex;

use crate::types::citation::{circled_digit, Citation};

/// One row of the pattern table.
struct CitationPattern {
    name: &'static str,
    regex: Regex,
}

/// Parses and formats citations.
///
/// Construct once and share; the pattern table is compiled eagerly.
pub struct CitationNormalizer {
    patterns: Vec<CitationPattern>,
}

/// Ordered pattern table, most specific first. Capture names: `article`,
/// `branch`, `clause`, `sub`. Branch separators accepted: 의, -, "of".
const PATTERN_TABLE: &[(&str, &str)] = &[
    (
        "article-branch-clause-subclause",
        r"^제?(?P<article>\d+)(?:조)?(?:의|-|of)(?P<branch>\d+)제?(?P<clause>\d+)항제?(?P<sub>\d+)호$",
    ),
    (
        "article-clause-subclause",
        r"^제?(?P<article>\d+)(?:조)?제?(?P<clause>\d+)항제?(?P<sub>\d+)호$",
    ),
    (
        "article-branch-clause",
        r"^제?(?P<article>\d+)(?:조)?(?:의|-|of)(?P<branch>\d+)제?(?P<clause>\d+)항$",
    ),
    (
        "article-clause",
        r"^제?(?P<article>\d+)(?:조)?제?(?P<clause>\d+)항$",
    ),
    (
        "article-branch",
        r"^제?(?P<article>\d+)(?:조)?(?:의|-|of)(?P<branch>\d+)$",
    ),
    ("article", r"^제?(?P<article>\d+)(?:조)?$"),
];

impl Default for CitationNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl CitationNormalizer {
    pub fn new() -> Self {
        let patterns = PATTERN_TABLE
            .iter()
            .map(|(name, pattern)| CitationPattern {
                name,
                regex: Regex::new(pattern).expect("citation pattern table is valid"),
            })
            .collect();
        Self { patterns }
    }

    /// Parse free-form citation text.
    ///
    /// Unparsable input yields a citation with `article_no = None`, the
    /// terminal invalid-citation marker. Never panics.
    pub fn parse(&self, law_name: &str, raw: &str) -> Citation {
        let text = preprocess(raw);
        if text.is_empty() {
            return Citation::invalid(law_name);
        }

        for pattern in &self.patterns {
            if let Some(caps) = pattern.regex.captures(&text) {
                tracing::debug!(pattern = pattern.name, raw = %raw, "citation matched");
                let article = match number(&caps, "article") {
                    Some(n) => n,
                    None => return Citation::invalid(law_name),
                };
                let mut citation = Citation::article(law_name, article);
                if let Some(branch) = number(&caps, "branch") {
                    citation = citation.with_branch(branch);
                }
                if let Some(clause) = number(&caps, "clause") {
                    citation = citation.with_clause(clause);
                    if let Some(sub) = number(&caps, "sub") {
                        citation = citation.with_subclause(sub);
                    }
                }
                return citation;
            }
        }

        tracing::debug!(raw = %raw, "citation did not match any pattern");
        Citation::invalid(law_name)
    }

    /// Canonical form, e.g. "제14조의2 제3항 제2호". Empty for an invalid
    /// citation. Left inverse of [`parse`](Self::parse) on its own range.
    pub fn format(&self, citation: &Citation) -> String {
        citation.canonical().unwrap_or_default()
    }

    /// Canonical article-only form, e.g. "제14조의2".
    pub fn format_article_only(&self, citation: &Citation) -> String {
        citation.article_key().unwrap_or_default()
    }
}

/// Strip whitespace and rewrite circled clause glyphs as 제N항 so the
/// pattern table only ever sees one clause spelling.
fn preprocess(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_whitespace() {
            continue;
        }
        match circled_digit(ch) {
            Some(n) => {
                out.push('제');
                out.push_str(&n.to_string());
                out.push('항');
            }
            None => out.push(ch),
        }
    }
    out
}

fn number(caps: &regex::Captures<'_>, group: &str) -> Option<u32> {
    // Leading zeros fall away here; oversized numbers fail the whole parse.
    caps.name(group)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAW: &str = "학교폭력예방 및 대책에 관한 법률";

    fn parse(raw: &str) -> Citation {
        CitationNormalizer::new().parse(LAW, raw)
    }

    #[test]
    fn test_bare_integer() {
        let c = parse("14");
        assert_eq!(c.article_no, Some(14));
        assert_eq!(c.branch_no, None);
    }

    #[test]
    fn test_leading_zeros_stripped() {
        assert_eq!(parse("014"), parse("14"));
    }

    #[test]
    fn test_branch_forms_agree() {
        let canonical = parse("제14조의2");
        assert_eq!(canonical.article_no, Some(14));
        assert_eq!(canonical.branch_no, Some(2));
        assert_eq!(parse("14-2"), canonical);
        assert_eq!(parse("14의2"), canonical);
        assert_eq!(parse("14 of 2"), canonical);
    }

    #[test]
    fn test_full_citation() {
        let c = parse("제14조의2 제1항 제2호");
        assert_eq!(c.article_no, Some(14));
        assert_eq!(c.branch_no, Some(2));
        assert_eq!(c.clause_no, Some(1));
        assert_eq!(c.subclause_no, Some(2));
    }

    #[test]
    fn test_unmarked_clause_numbers() {
        let c = parse("14-2 1항 2호");
        assert_eq!(c.clause_no, Some(1));
        assert_eq!(c.subclause_no, Some(2));
    }

    #[test]
    fn test_circled_glyph_clause() {
        let c = parse("제14조 ③");
        assert_eq!(c.article_no, Some(14));
        assert_eq!(c.clause_no, Some(3));
    }

    #[test]
    fn test_unparsable_is_invalid() {
        assert!(!parse("abc").is_valid());
        assert!(!parse("").is_valid());
        assert!(!parse("③").is_valid());
        assert!(!parse("제조").is_valid());
    }

    #[test]
    fn test_round_trip_on_canonical_forms() {
        let normalizer = CitationNormalizer::new();
        let cases = [
            Citation::article(LAW, 14),
            Citation::article(LAW, 14).with_branch(2),
            Citation::article(LAW, 14).with_branch(2).with_clause(3),
            Citation::article(LAW, 14)
                .with_branch(2)
                .with_clause(3)
                .with_subclause(2),
            Citation::article(LAW, 7).with_clause(1),
        ];
        for citation in cases {
            let formatted = normalizer.format(&citation);
            assert_eq!(normalizer.parse(LAW, &formatted), citation, "{formatted}");
            // format is idempotent through parse
            assert_eq!(
                normalizer.format(&normalizer.parse(LAW, &formatted)),
                formatted
            );
        }
    }
}
