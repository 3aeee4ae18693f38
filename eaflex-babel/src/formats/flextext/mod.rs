//! FLEx interlinear text format (`.flextext`)
//!
//! Reads the first `<interlinear-text>` of a document into an
//! [`InterlinearDocument`]. Phrase notes are classified on the way in and
//! written back through [`Note::note_text`], so free notes that look like
//! markers or alignment ids survive a round trip. Elements the converter has
//! no use for (interlinear-text level items other than the title, word items
//! other than txt/punct/gls/pos) are dropped.
//!
//! Missing guids are filled with fresh v4 UUIDs when writing.
//!
//! [`InterlinearDocument`]: crate::ir::flextext::InterlinearDocument
//! [`Note::note_text`]: crate::ir::flextext::Note::note_text

use crate::error::FormatError;
use crate::format::{Document, Format};

mod parser;
mod serializer;

pub use parser::parse_flextext;
pub use serializer::serialize_flextext;

pub struct FlexTextFormat;

impl Format for FlexTextFormat {
    fn name(&self) -> &str {
        "flextext"
    }

    fn description(&self) -> &str {
        "FLEx interlinear text"
    }

    fn file_extensions(&self) -> &[&str] {
        &["flextext"]
    }

    fn parse(&self, source: &str) -> Result<Document, FormatError> {
        parse_flextext(source).map(Document::FlexText)
    }

    fn serialize(&self, doc: &Document) -> Result<String, FormatError> {
        match doc {
            Document::FlexText(doc) => serialize_flextext(doc),
            other => Err(FormatError::NotSupported(format!(
                "flextext cannot serialize a {} document",
                other.format_name()
            ))),
        }
    }
}
