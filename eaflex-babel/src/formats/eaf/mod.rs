//! ELAN annotation format (`.eaf`)
//!
//! Parses with roxmltree and writes with quick-xml. Tiers, annotations, the
//! timeline and the linguistic types are read into [`AnnotationDocument`];
//! the header and everything after the linguistic types (languages,
//! constraints, controlled vocabularies, ...) is carried through unchanged.
//!
//! [`AnnotationDocument`]: crate::ir::eaf::AnnotationDocument

use crate::error::FormatError;
use crate::format::{Document, Format};

mod parser;
mod serializer;

pub use parser::parse_eaf;
pub use serializer::serialize_eaf;

pub struct EafFormat;

impl Format for EafFormat {
    fn name(&self) -> &str {
        "eaf"
    }

    fn description(&self) -> &str {
        "ELAN annotation document"
    }

    fn file_extensions(&self) -> &[&str] {
        &["eaf"]
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        parse_eaf(source).map(Document::Eaf)
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        match doc {
            Document::Eaf(doc) => serialize_eaf(doc),
            other => Err(FormatError::NotSupported(format!(
                "eaf cannot serialize a {} document",
                other.format_name()
            ))),
        }
    }
}
