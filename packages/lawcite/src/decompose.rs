//! Recursive decomposition of statute prose into a document tree.
//!
//! Three heading vocabularies are applied in fixed hierarchical order:
//! article headings (제14조, 제14조의2), clause headings (① … ⑳, 제N항),
//! then subclause headings (1., 제N호). Splitting clauses before articles
//! would fragment a branch article's clause structure across the wrong
//! parent, so the order is part of the contract. Each level is a row in a
//! data-driven table; new heading vocabularies are added as rows.

use regex::Regex;

use crate::types::citation::circled_digit;
use crate::types::node::DocumentNode;

/// Result of decomposing a text fragment.
///
/// A fragment with no recognizable headings at any level stays a plain
/// leaf string; otherwise it becomes a container tree whose root body is
/// the preface (text before the first heading).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decomposed {
    Leaf(String),
    Tree(DocumentNode),
}

impl Decomposed {
    /// The full text of the fragment, whichever shape it took.
    pub fn flatten(&self) -> String {
        match self {
            Decomposed::Leaf(text) => text.clone(),
            Decomposed::Tree(node) => node.flatten(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum LevelKind {
    Article,
    Clause,
    Subclause,
}

struct HeadingLevel {
    kind: LevelKind,
    pattern: Regex,
}

/// Heading vocabulary per level, in hierarchical order.
///
/// Article headings match at line starts, or anywhere when followed by a
/// parenthesized title (the strong signal in flattened scrape text).
/// Clause glyphs are unambiguous and match anywhere; spelled-out 제N항 and
/// subclause markers only count at line starts so that inline
/// cross-references ("제2항에 따라…") and amendment dates do not split the
/// text.
const LEVEL_TABLE: &[(LevelKind, &str)] = &[
    (
        LevelKind::Article,
        r"(?m)^[ \t]*제\d+조(?:의\d+)?(?:\([^)\n]*\))?|제\d+조(?:의\d+)?\([^)\n]*\)",
    ),
    (LevelKind::Clause, r"[①-⑳]|(?m)^[ \t]*제\d+항"),
    (
        LevelKind::Subclause,
        r"(?m)^[ \t]*(?:제\d+호|\d{1,2}(?:의\d+)?\.)",
    ),
];

/// Splits statute text into the article → clause → subclause tree.
pub struct Decomposer {
    levels: Vec<HeadingLevel>,
}

impl Default for Decomposer {
    fn default() -> Self {
        Self::new()
    }
}

impl Decomposer {
    pub fn new() -> Self {
        let levels = LEVEL_TABLE
            .iter()
            .map(|(kind, pattern)| HeadingLevel {
                kind: *kind,
                pattern: Regex::new(pattern).expect("heading level table is valid"),
            })
            .collect();
        Self { levels }
    }

    /// Decompose text. Total: never fails, never panics on any input.
    pub fn decompose(&self, text: &str) -> Decomposed {
        self.at_level(text, 0)
    }

    fn at_level(&self, text: &str, level: usize) -> Decomposed {
        let Some(vocab) = self.levels.get(level) else {
            return Decomposed::Leaf(text.trim().to_string());
        };

        let matches: Vec<_> = vocab.pattern.find_iter(text).collect();
        if matches.is_empty() {
            // Nothing at this level; deeper vocabularies may still apply.
            return self.at_level(text, level + 1);
        }

        let preface = text[..matches[0].start()].trim().to_string();
        let mut children = Vec::with_capacity(matches.len());
        for (i, m) in matches.iter().enumerate() {
            let end = matches.get(i + 1).map(|n| n.start()).unwrap_or(text.len());
            let title = vocab.kind.canonical_title(m.as_str());
            let rest = strip_delimiter(&text[m.end()..end]);
            let child = match self.at_level(rest, level + 1) {
                Decomposed::Leaf(body) => DocumentNode {
                    title,
                    body,
                    children: Vec::new(),
                },
                Decomposed::Tree(inner) => DocumentNode {
                    title,
                    body: inner.body,
                    children: inner.children,
                },
            };
            children.push(child);
        }

        Decomposed::Tree(DocumentNode {
            title: String::new(),
            body: preface,
            children,
        })
    }
}

impl LevelKind {
    /// Normalize a matched heading to its canonical title.
    fn canonical_title(&self, heading: &str) -> String {
        // A parenthesized article title is display text, not part of the key.
        let head = heading.split('(').next().unwrap_or(heading);
        let numbers = extract_numbers(head);
        match (self, numbers.first(), numbers.get(1)) {
            (LevelKind::Article, Some(n), Some(b)) => format!("제{}조의{}", n, b),
            (LevelKind::Article, Some(n), None) => format!("제{}조", n),
            (LevelKind::Clause, Some(n), _) => format!("제{}항", n),
            (LevelKind::Subclause, Some(n), _) => format!("제{}호", n),
            _ => heading.trim().to_string(),
        }
    }
}

/// Digit runs (and circled glyphs) in order of appearance.
fn extract_numbers(text: &str) -> Vec<u32> {
    let mut numbers = Vec::new();
    let mut run: Option<u32> = None;
    for ch in text.chars() {
        if let Some(d) = ch.to_digit(10) {
            run = Some(run.unwrap_or(0).saturating_mul(10).saturating_add(d));
        } else {
            if let Some(n) = run.take() {
                numbers.push(n);
            }
            if let Some(n) = circled_digit(ch) {
                numbers.push(n);
            }
        }
    }
    if let Some(n) = run {
        numbers.push(n);
    }
    numbers
}

/// Whitespace and punctuation directly after a heading token belong to the
/// delimiter, not the content.
fn strip_delimiter(text: &str) -> &str {
    text.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '.' | ')'))
}
