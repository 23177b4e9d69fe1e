//! ZIP package access for `.docx` documents.

use crate::error::{Error, Result};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Name of the main document part. Its absence makes a package unusable.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Name of the comments part. Legitimately absent from documents without
/// comments.
pub const COMMENTS_PART: &str = "word/comments.xml";

/// MIME type of a WordprocessingML document, for downstream download naming.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// A `.docx` package held in memory as a ZIP archive.
///
/// Provides named-part read access and a transactional rewrite that copies
/// every part of the source archive, substituting replacement bytes for the
/// parts the caller names.
pub struct DocxPackage {
    archive: RefCell<ZipArchive<Cursor<Vec<u8>>>>,
}

impl DocxPackage {
    /// Open a package from a file path.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use untrack::DocxPackage;
    ///
    /// let package = DocxPackage::open("report.docx")?;
    /// # Ok::<(), untrack::Error>(())
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())?;
        let mut reader = BufReader::new(file);
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data)
    }

    /// Open a package from a byte buffer.
    ///
    /// Fails with [`Error::InvalidArchive`] if the bytes are not a valid ZIP
    /// container.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(data))?;
        Ok(Self {
            archive: RefCell::new(archive),
        })
    }

    /// Read the raw bytes of a named part.
    ///
    /// Fails with [`Error::PartNotFound`] when the part is absent. For
    /// optional parts this is a recoverable condition, not a fatal one.
    pub fn read_part(&self, name: &str) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut part = archive
            .by_name(name)
            .map_err(|_| Error::PartNotFound(name.to_string()))?;
        let mut data = Vec::new();
        part.read_to_end(&mut data)?;
        Ok(data)
    }

    /// Check whether a named part exists.
    pub fn has_part(&self, name: &str) -> bool {
        self.archive.borrow().file_names().any(|n| n == name)
    }

    /// List all part names in archive order.
    pub fn part_names(&self) -> Vec<String> {
        self.archive.borrow().file_names().map(String::from).collect()
    }

    /// Produce a new archive containing every part of this package, with the
    /// parts named in `replacements` written from the replacement bytes
    /// instead of their originals.
    ///
    /// Part order is preserved. Untouched parts are copied in their original
    /// compressed form, so their content round-trips byte-identically. The
    /// source package is not modified.
    pub fn rewrite(&self, replacements: &HashMap<String, Vec<u8>>) -> Result<Vec<u8>> {
        let mut archive = self.archive.borrow_mut();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        for index in 0..archive.len() {
            let part = archive.by_index(index)?;
            match replacements.get(part.name()) {
                Some(bytes) => {
                    let name = part.name().to_string();
                    drop(part);
                    writer.start_file(name, SimpleFileOptions::default())?;
                    writer.write_all(bytes)?;
                }
                None => {
                    writer.raw_copy_file(part)?;
                }
            }
        }

        let cursor = writer.finish()?;
        Ok(cursor.into_inner())
    }
}

impl std::fmt::Debug for DocxPackage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocxPackage")
            .field("parts", &self.archive.borrow().len())
            .finish()
    }
}
