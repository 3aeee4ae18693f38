//! Conversion between ELAN annotation documents and FLEx interlinear texts
//!
//!     ELAN keeps utterances as time-aligned annotations on a graph of tiers. FLEx keeps the
//!     same material as a tree: paragraphs of phrases, phrases of words, words of morphs. This
//!     crate moves a corpus from the first to the second for glossing, and brings the glossed
//!     result back as a fresh set of ELAN tiers.
//!
//!     This is a pure lib: it powers eaflex-cli but assumes no shell. No printing, no env vars,
//!     no process exit. Diagnostics go through `tracing`, failures through the error enums.
//!
//! Architecture
//!
//!     Format code only reads and writes XML. Everything that knows about utterances, speakers,
//!     segment numbers or annotation ids lives in the mapping core (./common/mod.rs) and works
//!     on the two document models in ./ir/mod.rs.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── format.rs               # Format trait and the Document enum
//!     ├── registry.rs             # FormatRegistry for discovery and selection
//!     ├── settings.rs             # ConversionSettings, built by eaflex-config
//!     ├── transforms.rs           # whole-document conversions
//!     ├── formats
//!     │   ├── common              # quick-xml writer shared by serializers
//!     │   ├── eaf
//!     │   └── flextext
//!     ├── ir                      # the tier graph, the interlinear tree, segment records
//!     └── common                  # the mapping core
//!
//! Testing
//!     tests
//!     ├── lib.rs                  # includes the per-area modules below
//!     ├── <area>.rs
//!     └── fixtures
//!         ├── session.eaf
//!         └── session.flextext
//!
//! Core Algorithms
//!
//!     Both directions go through segment records (./ir/segment.rs), one per utterance, keyed by
//!     segment number:
//!
//!     - tiers to tree (./common/tiers_to_tree.rs): every annotation on a speaker's top-level tier
//!       becomes a record; child tiers contribute translations, notes and the target rendition.
//!       Records sort by start time and each becomes a paragraph, two when a target exists.
//!     - tree to tiers (./common/tree_to_tiers.rs): phrases are read and merged per integer
//!       segment number, targets are paired with their phonetic utterance through the
//!       alignment-id note, and everything is written onto a tier skeleton built from settings
//!       (./common/tier_schema.rs), with ids handed out in writing order (./common/ids.rs).
//!
//!     The tree-to-tiers direction does not try to recover the original tiers. The original
//!     document only lends its participants, header and trailing metadata.
//!
//! Formats
//!
//!     Each format implements the Format trait (./format.rs): a name, file extensions, parse()
//!     and serialize(). FormatRegistry finds them by name or by file extension.
//!
//! Library Choices
//!
//!     roxmltree for reading (both formats are small enough to hold as a tree), quick-xml for
//!     writing, regex for the tokenizer's character classes, uuid for FLEx guids.
//!
pub mod error;
pub mod format;
pub mod formats;
pub mod registry;
pub mod settings;
pub mod transforms;

pub mod common;
pub mod ir;

pub use error::{ConversionError, FormatError};
pub use format::{Document, Format};
pub use registry::FormatRegistry;
pub use settings::ConversionSettings;
pub use transforms::{eaf_to_flextext, flextext_to_eaf, EafExport};
