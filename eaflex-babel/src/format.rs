//! Format trait definition
//!
//! This module defines the core Format trait that both document formats implement.
//! The trait provides a uniform interface for parsing and serializing documents.

use crate::error::FormatError;
use crate::ir::eaf::AnnotationDocument;
use crate::ir::flextext::InterlinearDocument;

/// A parsed document of either format.
#[derive(Debug, Clone, PartialEq)]
pub enum Document {
    Eaf(AnnotationDocument),
    FlexText(InterlinearDocument),
}

impl Document {
    /// Name of the format this document belongs to.
    pub fn format_name(&self) -> &'static str {
        match self {
            Document::Eaf(_) => "eaf",
            Document::FlexText(_) => "flextext",
        }
    }

    pub fn into_eaf(self) -> Result<AnnotationDocument, FormatError> {
        match self {
            Document::Eaf(doc) => Ok(doc),
            other => Err(FormatError::NotSupported(format!(
                "expected an annotation document, got {}",
                other.format_name()
            ))),
        }
    }

    pub fn into_flextext(self) -> Result<InterlinearDocument, FormatError> {
        match self {
            Document::FlexText(doc) => Ok(doc),
            other => Err(FormatError::NotSupported(format!(
                "expected an interlinear text, got {}",
                other.format_name()
            ))),
        }
    }
}

/// Trait for document formats
///
/// Implementors provide bidirectional conversion between the XML text of a
/// format and its [`Document`] representation.
///
/// # Examples
///
/// ```ignore
/// let format = EafFormat;
/// let doc = format.parse(&std::fs::read_to_string("session.eaf")?)?;
/// let xml = format.serialize(&doc)?;
/// ```
pub trait Format: Send + Sync {
    /// The name of this format (e.g., "eaf", "flextext")
    fn name(&self) -> &str;

    /// Optional description of this format
    fn description(&self) -> &str {
        ""
    }

    /// File extensions associated with this format, without the leading dot.
    /// Used for automatic format detection from filenames.
    fn file_extensions(&self) -> &[&str] {
        &[]
    }

    /// Parse source text into a Document
    fn parse(&self, source: &str) -> Result<Document, FormatError>;

    /// Serialize a Document into source text
    ///
    /// Fails with [`FormatError::NotSupported`] when given a document of the
    /// other format.
    fn serialize(&self, doc: &Document) -> Result<String, FormatError>;
}
