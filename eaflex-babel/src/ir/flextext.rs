//! The interlinear text: paragraphs of phrases, phrases of words, words of morphs.
//!
//! Phrase-level notes are typed ([`Note`]) instead of being kept as raw item
//! text. Reading a note is context-free: only the utterance markers, alignment
//! ids and escaped free notes are recognized by shape. Speaker and addressee
//! notes depend on configuration and are promoted by the mapping core.

use crate::settings::FlexLanguage;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct InterlinearDocument {
    pub guid: Option<String>,
    pub title: Option<String>,
    /// Language of segment numbers, titles and notes
    pub analysis_language: String,
    pub paragraphs: Vec<Paragraph>,
    pub languages: Vec<FlexLanguage>,
    pub media_files: Option<MediaFiles>,
}

impl InterlinearDocument {
    pub fn phrases(&self) -> impl Iterator<Item = &Phrase> {
        self.paragraphs.iter().flat_map(|p| p.phrases.iter())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Paragraph {
    pub guid: Option<String>,
    pub phrases: Vec<Phrase>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Phrase {
    pub guid: Option<String>,
    /// Segment number, `"3"` or `"3.1"` for the parts of a split phrase
    pub segnum: Option<String>,
    /// Raw offsets as written in the document
    pub begin_offset: Option<String>,
    pub end_offset: Option<String>,
    pub speaker: Option<String>,
    pub media_file: Option<String>,
    pub words: Vec<Word>,
    pub notes: Vec<Note>,
}

impl Phrase {
    pub fn marker(&self) -> Option<UtteranceKind> {
        self.notes.iter().find_map(|note| match note {
            Note::Marker(kind) => Some(*kind),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UtteranceKind {
    Phonetic,
    Target,
}

impl UtteranceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            UtteranceKind::Phonetic => "Phonetic",
            UtteranceKind::Target => "Target",
        }
    }
}

impl fmt::Display for UtteranceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Note {
    /// Free translation (`item type="gls"`)
    Translation { lang: String, text: String },
    /// Free-form note
    Free(String),
    /// Phonetic/target marker
    Marker(UtteranceKind),
    /// Id of the source annotation, shared by a target and its phonetic utterance
    AlignmentId(String),
    Speaker(String),
    /// Addressee note from the configured vocabulary
    Xds(String),
}

impl Note {
    /// Read the text of a `note` item.
    pub fn classify(text: &str) -> Note {
        if let Some(escaped) = text.strip_prefix('\\') {
            return Note::Free(escaped.to_string());
        }
        match text {
            "Phonetic" => Note::Marker(UtteranceKind::Phonetic),
            "Target" => Note::Marker(UtteranceKind::Target),
            _ if is_alignment_id(text) => Note::AlignmentId(text.to_string()),
            _ => Note::Free(text.to_string()),
        }
    }

    /// Text of the `note` item for this note. Free notes that would read back
    /// as something else get a leading backslash. Translations are not notes.
    pub fn note_text(&self) -> Option<Cow<'_, str>> {
        match self {
            Note::Translation { .. } => None,
            Note::Free(text) => {
                if text.starts_with('\\') || Note::classify(text) != Note::Free(text.clone()) {
                    Some(Cow::Owned(format!("\\{text}")))
                } else {
                    Some(Cow::Borrowed(text))
                }
            }
            Note::Marker(kind) => Some(Cow::Borrowed(kind.as_str())),
            Note::AlignmentId(id) => Some(Cow::Borrowed(id)),
            Note::Speaker(code) => Some(Cow::Borrowed(code)),
            Note::Xds(value) => Some(Cow::Borrowed(value)),
        }
    }
}

/// One ASCII letter followed by one or more digits (`a7`, `a120`).
pub fn is_alignment_id(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && !chars.as_str().is_empty()
        && chars.all(|c| c.is_ascii_digit())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormKind {
    Txt,
    Punct,
}

impl FormKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FormKind::Txt => "txt",
            FormKind::Punct => "punct",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordForm {
    pub kind: FormKind,
    pub lang: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Word {
    pub guid: Option<String>,
    pub forms: Vec<WordForm>,
    pub pos: Option<String>,
    pub gloss: Option<String>,
    pub morphs: Vec<Morph>,
}

impl Word {
    pub fn new(kind: FormKind, lang: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            forms: vec![WordForm {
                kind,
                lang: lang.into(),
                text: text.into(),
            }],
            ..Self::default()
        }
    }

    /// First form written in `lang`.
    pub fn form_in(&self, lang: &str) -> Option<&WordForm> {
        self.forms.iter().find(|form| form.lang == lang)
    }

    pub fn is_punctuation(&self) -> bool {
        !self.forms.is_empty() && self.forms.iter().all(|f| f.kind == FormKind::Punct)
    }
}

/// Morph-level fields, in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum MorphField {
    #[serde(rename = "txt")]
    Form,
    #[serde(rename = "cf")]
    CitationForm,
    #[serde(rename = "gls")]
    Gloss,
    #[serde(rename = "msa")]
    Analysis,
    #[serde(rename = "variantTypes")]
    VariantTypes,
    #[serde(rename = "hn")]
    SenseNumber,
    #[serde(rename = "morph_type")]
    MorphType,
}

impl MorphField {
    pub const ALL: [MorphField; 7] = [
        MorphField::Form,
        MorphField::CitationForm,
        MorphField::Gloss,
        MorphField::Analysis,
        MorphField::VariantTypes,
        MorphField::SenseNumber,
        MorphField::MorphType,
    ];

    /// Item type in the interlinear text, and suffix of the tier name.
    pub fn key(self) -> &'static str {
        match self {
            MorphField::Form => "txt",
            MorphField::CitationForm => "cf",
            MorphField::Gloss => "gls",
            MorphField::Analysis => "msa",
            MorphField::VariantTypes => "variantTypes",
            MorphField::SenseNumber => "hn",
            MorphField::MorphType => "morph_type",
        }
    }

    /// Linguistic type id (`morph-txt`, `morph-gls`, ...).
    pub fn type_id(self) -> String {
        format!("morph-{}", self.key())
    }
}

impl fmt::Display for MorphField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for MorphField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MorphField::ALL
            .into_iter()
            .find(|field| field.key() == s)
            .ok_or_else(|| format!("unknown morph field '{s}'"))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MorphItem {
    pub field: MorphField,
    pub lang: Option<String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Morph {
    pub guid: Option<String>,
    /// `type` attribute (stem, suffix, ...)
    pub kind: Option<String>,
    pub items: Vec<MorphItem>,
}

impl Morph {
    pub fn get(&self, field: MorphField) -> Option<&str> {
        match field {
            MorphField::MorphType => self.kind.as_deref(),
            _ => self
                .items
                .iter()
                .find(|item| item.field == field)
                .map(|item| item.text.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaFiles {
    pub offset_type: String,
    pub media: Vec<Media>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub guid: String,
    pub location: String,
}
