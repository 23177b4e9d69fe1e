//! Error types for the untrack library.

use std::io;
use thiserror::Error;

/// Result type alias for untrack operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while inspecting or resolving a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input bytes are not a valid ZIP container.
    #[error("Invalid archive: {0}")]
    InvalidArchive(String),

    /// A named package part is absent. Fatal for the main document part,
    /// expected and handled locally for optional parts such as comments.
    #[error("Part not found: {0}")]
    PartNotFound(String),

    /// A part's bytes are not well-formed XML.
    #[error("Malformed markup: {0}")]
    MalformedMarkup(String),

    /// Error during text encoding conversion.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// A qualified name uses a namespace with no binding at the document root.
    #[error("Namespace not bound at document root: {0}")]
    UnboundNamespace(String),

    /// Detach was attempted on a node without a parent. The resolver's
    /// traversal never targets the root, so this is an internal invariant
    /// violation rather than a user-facing condition.
    #[error("Cannot detach a node that has no parent")]
    NoParent,

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::InvalidArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::MalformedMarkup(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::PartNotFound("word/document.xml".to_string());
        assert_eq!(err.to_string(), "Part not found: word/document.xml");

        let err = Error::NoParent;
        assert_eq!(err.to_string(), "Cannot detach a node that has no parent");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_zip() {
        let zip_err = zip::result::ZipError::InvalidArchive("truncated".into());
        let err: Error = zip_err.into();
        assert!(matches!(err, Error::InvalidArchive(_)));
    }
}
