//! # untrack
//!
//! Tracked-change inspection and resolution for Word documents.
//!
//! This library parses the revision-tracking markup inside `.docx` packages
//! (insertions, deletions, comments) and can produce a clean copy of a
//! package with every change uniformly accepted or rejected, leaving all
//! other package parts byte-identical.
//!
//! ## Quick Start
//!
//! ```no_run
//! use untrack::{scan_file, resolve_file, Resolution};
//!
//! // Inspect what changed
//! let report = scan_file("draft.docx")?;
//! for ins in &report.changes.insertions {
//!     println!("+ {}", ins.text);
//! }
//! for del in &report.changes.deletions {
//!     println!("- {}", del.text);
//! }
//!
//! // Produce a clean copy with every change accepted
//! let clean = resolve_file("draft.docx", Resolution::Accept)?;
//! std::fs::write("accepted_changes.docx", clean)?;
//! # Ok::<(), untrack::Error>(())
//! ```
//!
//! ## Lower-level API
//!
//! ```no_run
//! use untrack::{DocxPackage, XmlTree, extract_changes, resolve_tree, Resolution, DOCUMENT_PART};
//! use std::collections::HashMap;
//!
//! let package = DocxPackage::open("draft.docx")?;
//! let mut tree = XmlTree::parse_bytes(&package.read_part(DOCUMENT_PART)?)?;
//! let changes = extract_changes(&tree);
//! println!("{} markers", changes.len());
//!
//! resolve_tree(&mut tree, Resolution::Reject)?;
//! let mut replacements = HashMap::new();
//! replacements.insert(DOCUMENT_PART.to_string(), tree.serialize()?);
//! let rejected = package.rewrite(&replacements)?;
//! # Ok::<(), untrack::Error>(())
//! ```

pub mod changes;
pub mod error;
pub mod package;
pub mod resolve;
pub mod xml;

// Re-exports
pub use changes::{extract_changes, extract_comments, Comment, Revision, TrackedChanges, WML_NS};
pub use error::{Error, Result};
pub use package::{DocxPackage, COMMENTS_PART, DOCUMENT_PART, DOCX_MIME};
pub use resolve::{resolve_tree, Resolution, ResolveSummary};
pub use xml::{NodeId, XmlTree};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Everything extracted from one document: tracked changes from the main
/// part and comments from the (optional) comments part.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentChanges {
    /// Insertions and deletions from `word/document.xml`.
    pub changes: TrackedChanges,

    /// Comments from `word/comments.xml`; empty when the part is absent.
    pub comments: Vec<Comment>,
}

impl DocumentChanges {
    /// Render the extraction result as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)
        } else {
            serde_json::to_string(self)
        };
        json.map_err(|e| Error::InvalidData(e.to_string()))
    }
}

/// Extract tracked changes and comments from package bytes.
///
/// The main document part is required; a missing comments part yields an
/// empty comment list rather than an error.
pub fn scan_bytes(data: Vec<u8>) -> Result<DocumentChanges> {
    let package = DocxPackage::from_bytes(data)?;
    scan_package(&package)
}

/// Extract tracked changes and comments from a package file.
///
/// # Example
///
/// ```no_run
/// use untrack::scan_file;
///
/// let report = scan_file("draft.docx")?;
/// println!("{} insertions", report.changes.insertions.len());
/// # Ok::<(), untrack::Error>(())
/// ```
pub fn scan_file(path: impl AsRef<Path>) -> Result<DocumentChanges> {
    let package = DocxPackage::open(path)?;
    scan_package(&package)
}

/// Extract tracked changes and comments from an opened package.
pub fn scan_package(package: &DocxPackage) -> Result<DocumentChanges> {
    let document = XmlTree::parse_bytes(&package.read_part(DOCUMENT_PART)?)?;

    let comments_tree = match package.read_part(COMMENTS_PART) {
        Ok(bytes) => Some(XmlTree::parse_bytes(&bytes)?),
        Err(Error::PartNotFound(_)) => None,
        Err(e) => return Err(e),
    };

    Ok(DocumentChanges {
        changes: extract_changes(&document),
        comments: extract_comments(comments_tree.as_ref()),
    })
}

/// Produce a new package with every tracked change resolved per
/// `resolution`.
///
/// Only `word/document.xml` is rewritten; every other part passes through
/// with byte-identical content. The operation is all-or-nothing: the first
/// failing step aborts with its error and no partial package is returned.
pub fn resolve_bytes(data: Vec<u8>, resolution: Resolution) -> Result<Vec<u8>> {
    let package = DocxPackage::from_bytes(data)?;
    resolve_package(&package, resolution)
}

/// Resolve a package file, returning the finished package bytes.
///
/// # Example
///
/// ```no_run
/// use untrack::{resolve_file, Resolution};
///
/// let rejected = resolve_file("draft.docx", Resolution::Reject)?;
/// std::fs::write("rejected_changes.docx", rejected)?;
/// # Ok::<(), untrack::Error>(())
/// ```
pub fn resolve_file(path: impl AsRef<Path>, resolution: Resolution) -> Result<Vec<u8>> {
    let package = DocxPackage::open(path)?;
    resolve_package(&package, resolution)
}

/// Resolve an opened package, returning the finished package bytes.
pub fn resolve_package(package: &DocxPackage, resolution: Resolution) -> Result<Vec<u8>> {
    let mut document = XmlTree::parse_bytes(&package.read_part(DOCUMENT_PART)?)?;
    resolve_tree(&mut document, resolution)?;

    let mut replacements = HashMap::new();
    replacements.insert(DOCUMENT_PART.to_string(), document.serialize()?);
    package.rewrite(&replacements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_changes_json_shape() {
        let report = DocumentChanges {
            changes: TrackedChanges {
                insertions: vec![Revision {
                    text: "added".to_string(),
                    author: Some("Ann".to_string()),
                    date: None,
                }],
                deletions: Vec::new(),
            },
            comments: Vec::new(),
        };

        let json = report.to_json(false).unwrap();
        assert_eq!(
            json,
            r#"{"changes":{"insertions":[{"text":"added","author":"Ann"}],"deletions":[]},"comments":[]}"#
        );

        let parsed: DocumentChanges = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, report);
    }

    #[test]
    fn test_scan_bytes_rejects_non_archive() {
        let result = scan_bytes(b"not a zip at all".to_vec());
        assert!(matches!(result, Err(Error::InvalidArchive(_))));
    }
}
