//! Tracked-change and comment extraction from parsed parts.

use crate::xml::{NodeId, XmlTree};
use serde::{Deserialize, Serialize};

/// The WordprocessingML main namespace. Documents bind it to the `w` prefix
/// by convention, but matching is always by URI.
pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// One tracked insertion or deletion.
///
/// The visible text is the contract; author and date ride along from the
/// marker's attributes when the document carries them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revision {
    /// Concatenated visible text inside the marker.
    pub text: String,

    /// Revision author from `w:author`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Revision timestamp from `w:date` (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// One reviewer comment from the comments part.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Concatenated visible text of the comment body.
    pub text: String,

    /// Comment author from `w:author`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Comment timestamp from `w:date` (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

/// Insertions and deletions extracted from one document part, each list in
/// document order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedChanges {
    /// Text wrapped in `w:ins` markers.
    pub insertions: Vec<Revision>,

    /// Text wrapped in `w:del` markers.
    pub deletions: Vec<Revision>,
}

impl TrackedChanges {
    /// True when the document carries no tracked changes at all.
    pub fn is_empty(&self) -> bool {
        self.insertions.is_empty() && self.deletions.is_empty()
    }

    /// Total marker count across both lists.
    pub fn len(&self) -> usize {
        self.insertions.len() + self.deletions.len()
    }
}

fn revision_at(tree: &XmlTree, node: NodeId) -> Revision {
    Revision {
        text: tree.text_of(node),
        author: tree.attribute(node, Some(WML_NS), "author").map(String::from),
        date: tree.attribute(node, Some(WML_NS), "date").map(String::from),
    }
}

/// Extract all insertion and deletion markers from a parsed document part.
///
/// Every marker is reported, including markers nested inside a marker of the
/// other kind; overlapping subtrees are not deduplicated, so the list lengths
/// equal the marker counts in the source.
pub fn extract_changes(document: &XmlTree) -> TrackedChanges {
    let root = document.root();
    TrackedChanges {
        insertions: document
            .find_all(root, WML_NS, "ins")
            .into_iter()
            .map(|node| revision_at(document, node))
            .collect(),
        deletions: document
            .find_all(root, WML_NS, "del")
            .into_iter()
            .map(|node| revision_at(document, node))
            .collect(),
    }
}

/// Extract all comments from a parsed comments part, in part order.
///
/// A document without a comments part has no comments; `None` yields an
/// empty list, not an error.
pub fn extract_comments(comments: Option<&XmlTree>) -> Vec<Comment> {
    let Some(tree) = comments else {
        return Vec::new();
    };
    tree.find_all(tree.root(), WML_NS, "comment")
        .into_iter()
        .map(|node| Comment {
            text: tree.text_of(node),
            author: tree.attribute(node, Some(WML_NS), "author").map(String::from),
            date: tree.attribute(node, Some(WML_NS), "date").map(String::from),
        })
        .collect()
}
