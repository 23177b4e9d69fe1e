//! Uniform accept/reject resolution of tracked changes.

use crate::changes::WML_NS;
use crate::error::Result;
use crate::xml::XmlTree;
use serde::{Deserialize, Serialize};

/// Resolution policy applied uniformly to every tracked change in a
/// document. Selected once per export; carries no other state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    /// Keep insertions as ordinary content, discard deletions.
    Accept,
    /// Discard insertions, restore deleted content.
    Reject,
}

/// Marker counts touched by one resolution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolveSummary {
    /// Number of insertion markers processed.
    pub insertions: usize,
    /// Number of deletion markers processed.
    pub deletions: usize,
}

/// Resolve every tracked change in `document` per `resolution`, mutating the
/// tree in place.
///
/// Accepting detaches each `w:del` subtree and retags each `w:ins` to an
/// ordinary `w:r` run; rejecting is the mirror image, which surfaces the
/// deleted runs held inside each `w:del` as restored content. Both marker
/// lists are materialized before any mutation, so detaching one kind cannot
/// invalidate the traversal that found the other. A document without markers
/// resolves trivially, and a second pass over resolved output matches
/// nothing, making the operation idempotent.
pub fn resolve_tree(document: &mut XmlTree, resolution: Resolution) -> Result<ResolveSummary> {
    let root = document.root();
    let insertions = document.find_all(root, WML_NS, "ins");
    let deletions = document.find_all(root, WML_NS, "del");

    let (to_remove, to_retag) = match resolution {
        Resolution::Accept => (&deletions, &insertions),
        Resolution::Reject => (&insertions, &deletions),
    };

    for &marker in to_remove {
        document.remove(marker)?;
    }
    for &marker in to_retag {
        document.retag(marker, WML_NS, "r")?;
    }

    Ok(ResolveSummary {
        insertions: insertions.len(),
        deletions: deletions.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRACKED_BODY: &str = concat!(
        r#"<w:p><w:r><w:t>base </w:t></w:r>"#,
        r#"<w:ins w:id="1" w:author="Ann"><w:r><w:t>added text</w:t></w:r></w:ins>"#,
        r#"<w:del w:id="2" w:author="Ben"><w:r><w:delText>removed text</w:delText></w:r></w:del>"#,
        r#"</w:p>"#,
    );

    fn document(body: &str) -> XmlTree {
        let xml = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{WML_NS}"><w:body>{body}</w:body></w:document>"#
        );
        XmlTree::parse(&xml).unwrap()
    }

    fn reparse(tree: &XmlTree) -> XmlTree {
        let bytes = tree.serialize().unwrap();
        XmlTree::parse(std::str::from_utf8(&bytes).unwrap()).unwrap()
    }

    #[test]
    fn test_accept_keeps_insertions_drops_deletions() {
        let mut tree = document(TRACKED_BODY);
        let summary = resolve_tree(&mut tree, Resolution::Accept).unwrap();
        assert_eq!(summary, ResolveSummary { insertions: 1, deletions: 1 });

        let resolved = reparse(&tree);
        let root = resolved.root();
        assert!(resolved.find_all(root, WML_NS, "ins").is_empty());
        assert!(resolved.find_all(root, WML_NS, "del").is_empty());
        assert_eq!(resolved.text_of(root), "base added text");
    }

    #[test]
    fn test_reject_drops_insertions_restores_deletions() {
        let mut tree = document(TRACKED_BODY);
        resolve_tree(&mut tree, Resolution::Reject).unwrap();

        let resolved = reparse(&tree);
        let root = resolved.root();
        assert!(resolved.find_all(root, WML_NS, "ins").is_empty());
        assert!(resolved.find_all(root, WML_NS, "del").is_empty());
        assert_eq!(resolved.text_of(root), "base removed text");
    }

    #[test]
    fn test_accepted_insertion_becomes_ordinary_run() {
        let mut tree = document(TRACKED_BODY);
        resolve_tree(&mut tree, Resolution::Accept).unwrap();

        let xml = String::from_utf8(tree.serialize().unwrap()).unwrap();
        assert!(xml.contains(r#"<w:r w:id="1" w:author="Ann"><w:r><w:t>added text</w:t></w:r></w:r>"#));
        assert!(!xml.contains("removed text"));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut tree = document(TRACKED_BODY);
        resolve_tree(&mut tree, Resolution::Accept).unwrap();
        let once = tree.serialize().unwrap();

        let summary = resolve_tree(&mut tree, Resolution::Accept).unwrap();
        assert_eq!(summary, ResolveSummary::default());
        assert_eq!(tree.serialize().unwrap(), once);
    }

    #[test]
    fn test_no_markers_is_a_trivial_success() {
        let body = "<w:p><w:r><w:t>untouched</w:t></w:r></w:p>";
        let mut tree = document(body);
        let before = tree.serialize().unwrap();

        let summary = resolve_tree(&mut tree, Resolution::Reject).unwrap();
        assert_eq!(summary, ResolveSummary::default());
        assert_eq!(tree.serialize().unwrap(), before);
    }

    #[test]
    fn test_accept_with_deletion_nested_in_insertion() {
        let body = concat!(
            r#"<w:p><w:ins><w:r><w:t>kept</w:t></w:r>"#,
            r#"<w:del><w:r><w:delText>inner</w:delText></w:r></w:del>"#,
            r#"</w:ins></w:p>"#,
        );
        let mut tree = document(body);
        resolve_tree(&mut tree, Resolution::Accept).unwrap();

        let resolved = reparse(&tree);
        let root = resolved.root();
        assert!(resolved.find_all(root, WML_NS, "ins").is_empty());
        assert!(resolved.find_all(root, WML_NS, "del").is_empty());
        assert_eq!(resolved.text_of(root), "kept");
    }

    #[test]
    fn test_reject_with_insertion_nested_in_deletion() {
        let body = concat!(
            r#"<w:p><w:del><w:r><w:delText>restored</w:delText></w:r>"#,
            r#"<w:ins><w:r><w:t>inner</w:t></w:r></w:ins>"#,
            r#"</w:del></w:p>"#,
        );
        let mut tree = document(body);
        resolve_tree(&mut tree, Resolution::Reject).unwrap();

        let resolved = reparse(&tree);
        let root = resolved.root();
        assert!(resolved.find_all(root, WML_NS, "ins").is_empty());
        assert!(resolved.find_all(root, WML_NS, "del").is_empty());
        assert_eq!(resolved.text_of(root), "restored");
    }
}
