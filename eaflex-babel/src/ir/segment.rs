//! Segment records: one utterance, as both conversion directions see it.
//!
//! A [`SegmentRecord`] is built while reading one side, completed by pairing,
//! and consumed when the other side is written. Records are serializable so a
//! conversion can emit them as a JSON side output.

use super::flextext::{MorphField, UtteranceKind};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Segment number of a phrase: `3`, or `3.1` for one part of a split phrase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentNumber {
    pub base: u32,
    pub part: Option<u32>,
}

impl SegmentNumber {
    pub fn new(base: u32) -> Self {
        Self { base, part: None }
    }

    pub fn part(base: u32, part: u32) -> Self {
        Self {
            base,
            part: Some(part),
        }
    }

    /// The integer prefix shared by all parts.
    pub fn normalized(self) -> Self {
        Self::new(self.base)
    }
}

impl fmt::Display for SegmentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.part {
            Some(part) => write!(f, "{}.{}", self.base, part),
            None => write!(f, "{}", self.base),
        }
    }
}

impl FromStr for SegmentNumber {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || format!("invalid segment number '{s}'");
        match s.split_once('.') {
            Some((base, part)) => Ok(Self::part(
                base.parse().map_err(|_| invalid())?,
                part.parse().map_err(|_| invalid())?,
            )),
            None => Ok(Self::new(s.parse().map_err(|_| invalid())?)),
        }
    }
}

impl Serialize for SegmentNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved point in time: the slot it came from (if any) and its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimePoint {
    pub slot: Option<String>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct MorphRecord {
    pub fields: BTreeMap<MorphField, String>,
}

impl MorphRecord {
    /// Value of a field; absent fields read as empty.
    pub fn get(&self, field: MorphField) -> &str {
        self.fields.get(&field).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct WordRecord {
    pub text: String,
    pub punctuation: bool,
    pub language: Option<String>,
    pub pos: String,
    pub gloss: String,
    pub morphs: Vec<MorphRecord>,
}

/// Content of a dependent tier attached to a top-level annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChildField {
    pub tier_id: String,
    /// Set when the tier is mapped to a translation language
    pub language: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentRecord {
    pub number: SegmentNumber,
    pub full_text: String,
    pub begin: Option<TimePoint>,
    pub end: Option<TimePoint>,
    /// Translation language to text
    pub translations: BTreeMap<String, String>,
    /// Free notes joined with `"; "`
    pub notes: String,
    pub xds: String,
    pub kind: Option<UtteranceKind>,
    pub alignment_id: Option<String>,
    pub speaker: Option<String>,
    pub words: Vec<WordRecord>,
    /// For a target: annotation id of its phonetic utterance
    pub paired_annotation_id: Option<u64>,
    pub own_annotation_id: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub child_fields: Vec<ChildField>,
}

impl SegmentRecord {
    pub fn new(number: SegmentNumber) -> Self {
        Self {
            number,
            full_text: String::new(),
            begin: None,
            end: None,
            translations: BTreeMap::new(),
            notes: String::new(),
            xds: String::new(),
            kind: None,
            alignment_id: None,
            speaker: None,
            words: Vec::new(),
            paired_annotation_id: None,
            own_annotation_id: None,
            child_fields: Vec::new(),
        }
    }

    pub fn is_target(&self) -> bool {
        self.kind == Some(UtteranceKind::Target)
    }

    pub fn is_phonetic(&self) -> bool {
        self.kind == Some(UtteranceKind::Phonetic)
    }

    /// Key shared by a target and the phonetic utterance it renders.
    pub fn pair_key(&self) -> Option<&str> {
        self.alignment_id.as_deref()
    }

    /// Merge the parts of a split phrase into one record.
    ///
    /// Parts are taken in ascending segment-number order. Words are
    /// concatenated, the non-empty texts are joined with a space, and every
    /// other field comes from the last part. The result carries the integer
    /// segment number, a lone part included. An empty input yields `None`.
    pub fn merge(records: impl IntoIterator<Item = SegmentRecord>) -> Option<SegmentRecord> {
        let mut parts: Vec<SegmentRecord> = records.into_iter().collect();
        if parts.len() <= 1 {
            return parts.pop().map(|mut record| {
                record.number = record.number.normalized();
                record
            });
        }
        parts.sort_by_key(|record| record.number);

        let mut words = Vec::new();
        let mut texts = Vec::new();
        for part in &mut parts {
            words.append(&mut part.words);
            if !part.full_text.is_empty() {
                texts.push(std::mem::take(&mut part.full_text));
            }
        }

        let mut merged = parts.pop()?;
        merged.number = merged.number.normalized();
        merged.words = words;
        merged.full_text = texts.join(" ");
        Some(merged)
    }
}
