//! Error types for format and conversion operations

use thiserror::Error;

/// Errors raised by the format adapters and the registry
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FormatError {
    /// Format not found in registry
    #[error("Format '{0}' not found")]
    FormatNotFound(String),
    /// Error during parsing
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Error during serialization
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// Operation not available for this format
    #[error("Operation not supported: {0}")]
    NotSupported(String),
}

/// Errors raised while mapping between the tier graph and the interlinear tree.
///
/// Every variant is fatal for the document being converted. Other documents in
/// a batch are unaffected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConversionError {
    /// Missing or malformed configuration
    #[error("Configuration error: {0}")]
    Config(String),
    /// A time slot or time value could not be resolved
    #[error("Alignment error: {0}")]
    Alignment(String),
    /// A field required by the tier schema is absent from a segment
    #[error("Segment {segment}: missing {field} (was the source exported with all fields visible?)")]
    MissingField { segment: String, field: String },
    /// A target utterance could not be matched with its phonetic utterance
    #[error("Segment {segment}: {message}")]
    Pairing { segment: String, message: String },
    /// An annotation references something that does not exist
    #[error("Annotation {annotation}: {message}")]
    StructuralIntegrity { annotation: String, message: String },
    /// A word is written in a language the utterance kind does not allow
    #[error("Segment {segment}: word in language '{language}' found in a non-phonetic utterance")]
    UnexpectedLanguage { segment: String, language: String },
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl ConversionError {
    pub(crate) fn missing_field(segment: impl ToString, field: impl Into<String>) -> Self {
        Self::MissingField {
            segment: segment.to_string(),
            field: field.into(),
        }
    }

    pub(crate) fn pairing(segment: impl ToString, message: impl Into<String>) -> Self {
        Self::Pairing {
            segment: segment.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn integrity(annotation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::StructuralIntegrity {
            annotation: annotation.into(),
            message: message.into(),
        }
    }
}
