//! The citation value type and glyph normalization.

use serde::{Deserialize, Serialize};

/// A parsed legal citation.
///
/// Immutable value identifying one location inside a statute:
/// article (조), optional branch number for inserted articles
/// (제14조의2), optional clause (항) and optional subclause (호).
///
/// Invariants, enforced by the parser and the builder methods:
/// - `clause_no` is only set when `article_no` is set
/// - `subclause_no` is only set when `clause_no` is set
///
/// `article_no == None` marks an unparsable citation; downstream components
/// treat it as a terminal invalid-citation failure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Citation {
    pub law_name: String,
    pub article_no: Option<u32>,
    pub branch_no: Option<u32>,
    pub clause_no: Option<u32>,
    pub subclause_no: Option<u32>,
}

impl Citation {
    /// Create a citation pointing at an article.
    pub fn article(law_name: impl Into<String>, article_no: u32) -> Self {
        Self {
            law_name: law_name.into(),
            article_no: Some(article_no),
            branch_no: None,
            clause_no: None,
            subclause_no: None,
        }
    }

    /// Create an invalid citation (article could not be parsed).
    pub fn invalid(law_name: impl Into<String>) -> Self {
        Self {
            law_name: law_name.into(),
            article_no: None,
            branch_no: None,
            clause_no: None,
            subclause_no: None,
        }
    }

    /// Set the branch number ("제N조의M").
    pub fn with_branch(mut self, branch_no: u32) -> Self {
        self.branch_no = Some(branch_no);
        self
    }

    /// Set the clause number. Ignored on an invalid citation.
    pub fn with_clause(mut self, clause_no: u32) -> Self {
        if self.article_no.is_some() {
            self.clause_no = Some(clause_no);
        }
        self
    }

    /// Set the subclause number. Ignored unless a clause is set.
    pub fn with_subclause(mut self, subclause_no: u32) -> Self {
        if self.clause_no.is_some() {
            self.subclause_no = Some(subclause_no);
        }
        self
    }

    /// Whether the article number was resolved.
    pub fn is_valid(&self) -> bool {
        self.article_no.is_some()
    }

    /// Article key, e.g. "제14조" or "제14조의2". `None` when invalid.
    pub fn article_key(&self) -> Option<String> {
        self.article_no.map(|n| match self.branch_no {
            Some(b) => format!("제{}조의{}", n, b),
            None => format!("제{}조", n),
        })
    }

    /// Clause key, e.g. "제3항".
    pub fn clause_key(&self) -> Option<String> {
        self.clause_no.map(|n| format!("제{}항", n))
    }

    /// Subclause key, e.g. "제2호".
    pub fn subclause_key(&self) -> Option<String> {
        self.subclause_no.map(|n| format!("제{}호", n))
    }

    /// Canonical citation string, e.g. "제14조의2 제3항 제2호".
    ///
    /// `None` when the citation is invalid.
    pub fn canonical(&self) -> Option<String> {
        let mut out = self.article_key()?;
        if let Some(clause) = self.clause_key() {
            out.push(' ');
            out.push_str(&clause);
            if let Some(sub) = self.subclause_key() {
                out.push(' ');
                out.push_str(&sub);
            }
        }
        Some(out)
    }
}

/// Map circled-number glyphs (① … ⑳) to ASCII digit strings.
///
/// Statute clause markers use the Unicode circled digits; user input may
/// carry them through verbatim. All other characters pass unchanged.
pub fn normalize_glyphs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match circled_digit(ch) {
            Some(n) => out.push_str(&n.to_string()),
            None => out.push(ch),
        }
    }
    out
}

/// Value of a circled-digit glyph, if `ch` is one (① → 1 … ⑳ → 20).
pub fn circled_digit(ch: char) -> Option<u32> {
    if ('①'..='⑳').contains(&ch) {
        Some(ch as u32 - '①' as u32 + 1)
    } else {
        None
    }
}
