//! The recursive document tree produced by decomposition.

use serde::{Deserialize, Serialize};

/// One node of the decomposed statute text.
///
/// A node with children is a container; its own `body` is the preface text
/// that precedes the first child heading. A leaf's `body` is the full text
/// at that level. The tree is at most four levels deep: article,
/// clause (항), subclause (호), and unmodeled sub-item text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentNode {
    /// Heading, e.g. "제14조의2", "제1항", "제2호". Empty for the root
    /// container of a multi-article fragment.
    pub title: String,

    /// Preface text for containers, full text for leaves.
    pub body: String,

    /// Ordered child nodes, possibly empty.
    pub children: Vec<DocumentNode>,
}

impl DocumentNode {
    /// Create a leaf node.
    pub fn leaf(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            children: Vec::new(),
        }
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Find a direct child by exact title.
    pub fn child(&self, title: &str) -> Option<&DocumentNode> {
        self.children.iter().find(|c| c.title == title)
    }

    /// Reassemble this subtree into plain text, headings included.
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        if !self.body.is_empty() {
            out.push_str(&self.body);
        }
        for child in &self.children {
            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&child.title);
            let rest = child.flatten();
            if !rest.is_empty() {
                out.push(' ');
                out.push_str(&rest);
            }
        }
        out
    }
}
