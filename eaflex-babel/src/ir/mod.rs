//! Intermediate Representation (IR) for both document formats.
//!
//! - [`eaf`]: the tier/annotation graph anchored to a shared timeline.
//! - [`flextext`]: the nested paragraph/phrase/word/morph tree.
//! - [`segment`]: the per-utterance record both conversion directions pass through.
//! - [`xml`]: a generic element tree for metadata carried through verbatim.
//!
//! The format adapters in [`crate::formats`] convert these types to and from XML;
//! the mapping core in [`crate::common`] converts between them.

pub mod eaf;
pub mod flextext;
pub mod segment;
pub mod xml;
