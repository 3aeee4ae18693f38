//! Converts tiers of annotations into an interlinear text.
//!
//! # The High-Level Concept
//!
//! Every time-aligned annotation on a top-level tier is one utterance. The
//! tiers directly below hold what is said about it (translations, notes, the
//! target rendering of child speech), each annotation pointing at its
//! utterance by id. Grouping those by the annotation they point at gives one
//! [`SegmentRecord`] per utterance, which is then written out as a phrase.
//!
//! # The Algorithm
//!
//! 1. **Select tiers:**
//!    - Drop tiers whose type carries an excluded constraint
//!    - Top-level tiers are those without a parent and not excluded by id or type
//!    - Child tiers are the non-excluded tiers whose parent is a top-level tier
//!
//! 2. **Build records:**
//!    - One record per alignable annotation of a top-level tier: its value, time
//!      bounds and the tier participant
//!    - Every referring annotation of a child tier is attached to the record of
//!      the annotation it refers to, tagged with a translation language when
//!      its tier is mapped to one
//!
//! 3. **Build phrases:**
//!    - Child content becomes translations, the target text (tiers of a target
//!      type) or free notes; then the `Phonetic` marker, the source annotation
//!      id and the speaker are added as notes
//!    - With a target, the original text is tokenized in the child language and
//!      the target text becomes a second paragraph in the main language, noted
//!      only with the shared id and the `Target` marker
//!    - Otherwise the text is tokenized in the main language
//!
//! 4. **Order:**
//!    - Paragraphs are sorted by begin time (stable) and numbered from 1

use super::time_order::{format_offset, TimeIndex};
use super::tokenizer::{Token, Tokenizer};
use crate::error::ConversionError;
use crate::ir::eaf::{annotation_number, Annotation, AnnotationDocument, Tier};
use crate::ir::flextext::{
    FormKind, InterlinearDocument, Media, MediaFiles, Note, Paragraph, Phrase, UtteranceKind, Word,
};
use crate::ir::segment::{ChildField, SegmentNumber, SegmentRecord, WordRecord};
use crate::settings::ConversionSettings;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};
use uuid::Uuid;

/// Builds an interlinear text from annotation tiers.
pub fn tiers_to_tree(
    doc: AnnotationDocument,
    settings: &ConversionSettings,
) -> Result<InterlinearDocument, ConversionError> {
    tiers_to_tree_with_segments(doc, settings).map(|(tree, _)| tree)
}

/// Like [`tiers_to_tree`], also returning one record per source utterance,
/// numbered like the output paragraphs and sorted by that number.
pub fn tiers_to_tree_with_segments(
    mut doc: AnnotationDocument,
    settings: &ConversionSettings,
) -> Result<(InterlinearDocument, Vec<SegmentRecord>), ConversionError> {
    settings.validate()?;
    for constraint in &settings.exclude_tier_constraint {
        let removed = doc.remove_tiers_with_constraint(constraint);
        if removed > 0 {
            debug!(constraint = %constraint, removed, "dropped tiers by constraint");
        }
    }
    TreeAssembler::new(&doc, settings)?.assemble()
}

pub struct TreeAssembler<'a> {
    doc: &'a AnnotationDocument,
    settings: &'a ConversionSettings,
    index: TimeIndex,
    tokenizer: Tokenizer,
    target_tiers: HashSet<&'a str>,
    media_guid: Option<String>,
}

impl<'a> TreeAssembler<'a> {
    pub fn new(doc: &'a AnnotationDocument, settings: &'a ConversionSettings) -> Result<Self, ConversionError> {
        let target_tiers = doc
            .tiers
            .iter()
            .filter(|t| settings.target_utterance_tier_type.contains(&t.linguistic_type))
            .map(|t| t.id.as_str())
            .collect();
        let media_guid = (!doc.media_urls().is_empty()).then(|| Uuid::new_v4().to_string());
        Ok(Self {
            doc,
            settings,
            index: TimeIndex::build(&doc.time_order),
            tokenizer: Tokenizer::from_settings(settings)?,
            target_tiers,
            media_guid,
        })
    }

    fn excluded(&self, tier: &Tier) -> bool {
        self.settings.exclude_tier_id.contains(&tier.id)
            || self.settings.exclude_tier_type.contains(&tier.linguistic_type)
    }

    /// Top-level tiers, and the child tiers attached to them.
    fn select_tiers(&self) -> (Vec<&'a Tier>, Vec<&'a Tier>) {
        let doc = self.doc;
        let top: Vec<&Tier> = doc
            .tiers
            .iter()
            .filter(|t| t.parent.is_none() && !self.excluded(t))
            .collect();
        let children = doc
            .tiers
            .iter()
            .filter(|t| !self.excluded(t))
            .filter(|t| {
                t.parent
                    .as_deref()
                    .is_some_and(|p| top.iter().any(|parent| parent.id == p))
            })
            .collect();
        (top, children)
    }

    /// One record per utterance, in document order, with child content attached.
    pub fn collect_segments(&self) -> Result<Vec<SegmentRecord>, ConversionError> {
        let (top, children) = self.select_tiers();
        let mut records = Vec::new();
        let mut by_id: HashMap<&str, usize> = HashMap::new();

        for tier in top {
            for annotation in &tier.annotations {
                let Annotation::Alignable(a) = annotation else {
                    return Err(ConversionError::integrity(
                        annotation.id(),
                        format!("top-level tier '{}' holds a referring annotation", tier.id),
                    ));
                };
                let participant = tier
                    .participant
                    .clone()
                    .ok_or_else(|| ConversionError::missing_field(&a.id, "tier participant"))?;

                let mut record = SegmentRecord::new(SegmentNumber::new(0));
                record.full_text = a.value.clone();
                record.begin = Some(self.index.point_for_slot(&a.begin_slot)?);
                record.end = Some(self.index.point_for_slot(&a.end_slot)?);
                record.speaker = Some(participant);
                record.alignment_id = Some(a.id.clone());
                record.own_annotation_id = annotation_number(&a.id);
                by_id.insert(a.id.as_str(), records.len());
                records.push(record);
            }
        }

        for tier in children {
            let language = self.settings.translation_tiers.get(&tier.id);
            for annotation in &tier.annotations {
                let Annotation::Reference(r) = annotation else {
                    warn!(
                        tier = %tier.id,
                        annotation = %annotation.id(),
                        "skipping time-aligned annotation on a dependent tier"
                    );
                    continue;
                };
                let index = *by_id.get(r.parent.as_str()).ok_or_else(|| {
                    ConversionError::integrity(
                        &r.id,
                        format!("refers to unknown annotation {}", r.parent),
                    )
                })?;
                records[index].child_fields.push(ChildField {
                    tier_id: tier.id.clone(),
                    language: language.cloned(),
                    value: r.value.clone(),
                });
            }
        }
        Ok(records)
    }

    pub fn assemble(self) -> Result<(InterlinearDocument, Vec<SegmentRecord>), ConversionError> {
        let mut records = self.collect_segments()?;
        let mut paragraphs: Vec<(f64, usize, Paragraph)> = Vec::new();
        for (i, record) in records.iter_mut().enumerate() {
            for paragraph in self.build_paragraphs(record)? {
                let begin = record.begin.as_ref().map_or(0.0, |p| p.value);
                paragraphs.push((begin, i, paragraph));
            }
        }
        paragraphs.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut numbered = vec![false; records.len()];
        let mut out = Vec::with_capacity(paragraphs.len());
        for (n, (_, i, mut paragraph)) in paragraphs.into_iter().enumerate() {
            let segnum = n as u32 + 1;
            for phrase in &mut paragraph.phrases {
                phrase.segnum = Some(segnum.to_string());
            }
            if !numbered[i] {
                records[i].number = SegmentNumber::new(segnum);
                numbered[i] = true;
            }
            out.push(paragraph);
        }
        records.sort_by_key(|record| record.number);

        let tree = InterlinearDocument {
            guid: Some(Uuid::new_v4().to_string()),
            title: None,
            analysis_language: self.settings.analysis_language.clone(),
            paragraphs: out,
            languages: self.settings.flextext_languages.clone(),
            media_files: self.media_files(),
        };
        debug!(
            segments = records.len(),
            paragraphs = tree.paragraphs.len(),
            "built interlinear text"
        );
        Ok((tree, records))
    }

    fn build_paragraphs(&self, record: &mut SegmentRecord) -> Result<Vec<Paragraph>, ConversionError> {
        let mut notes = Vec::new();
        let mut target_text = None;
        for field in &record.child_fields {
            if let Some(lang) = &field.language {
                record.translations.insert(lang.clone(), field.value.clone());
                if !field.value.is_empty() {
                    notes.push(Note::Translation {
                        lang: lang.clone(),
                        text: field.value.clone(),
                    });
                }
            } else if self.target_tiers.contains(field.tier_id.as_str()) {
                target_text = Some(field.value.clone());
            } else if !field.value.is_empty() {
                notes.push(Note::Free(field.value.clone()));
            }
        }
        let free: Vec<&str> = notes
            .iter()
            .filter_map(|n| match n {
                Note::Free(text) => Some(text.as_str()),
                _ => None,
            })
            .collect();
        record.notes = free.join("; ");

        let source_id = record.alignment_id.clone().unwrap_or_default();
        let speaker = record.speaker.clone().unwrap_or_default();
        record.kind = Some(UtteranceKind::Phonetic);
        notes.push(Note::Marker(UtteranceKind::Phonetic));
        notes.push(Note::AlignmentId(source_id.clone()));
        notes.push(Note::Speaker(speaker));

        let language = if target_text.is_some() {
            &self.settings.child_language
        } else {
            &self.settings.language
        };
        let words = self.words(&record.full_text, language)?;
        record.words = word_records(&words);
        let mut paragraphs = vec![self.paragraph(record, words, notes)];

        if let Some(text) = target_text {
            let words = self.words(&text, &self.settings.language)?;
            let notes = vec![
                Note::AlignmentId(source_id),
                Note::Marker(UtteranceKind::Target),
            ];
            paragraphs.push(self.paragraph(record, words, notes));
        }
        Ok(paragraphs)
    }

    fn words(&self, text: &str, language: &str) -> Result<Vec<Word>, ConversionError> {
        Ok(self
            .tokenizer
            .tokenize(text, language)?
            .into_iter()
            .map(|token| match token {
                Token::Word(text) => Word::new(FormKind::Txt, language, text),
                Token::Punctuation(text) => Word::new(FormKind::Punct, language, text),
            })
            .collect())
    }

    fn paragraph(&self, record: &SegmentRecord, words: Vec<Word>, notes: Vec<Note>) -> Paragraph {
        Paragraph {
            guid: None,
            phrases: vec![Phrase {
                guid: None,
                segnum: None,
                begin_offset: record.begin.as_ref().map(|p| format_offset(p.value)),
                end_offset: record.end.as_ref().map(|p| format_offset(p.value)),
                speaker: record.speaker.clone(),
                media_file: self.media_guid.clone(),
                words,
                notes,
            }],
        }
    }

    fn media_files(&self) -> Option<MediaFiles> {
        let primary = self.media_guid.clone()?;
        let media = self
            .doc
            .media_urls()
            .into_iter()
            .enumerate()
            .map(|(i, location)| Media {
                guid: if i == 0 {
                    primary.clone()
                } else {
                    Uuid::new_v4().to_string()
                },
                location,
            })
            .collect();
        Some(MediaFiles {
            offset_type: String::new(),
            media,
        })
    }
}

fn word_records(words: &[Word]) -> Vec<WordRecord> {
    words
        .iter()
        .filter_map(|word| {
            word.forms.first().map(|form| WordRecord {
                text: form.text.clone(),
                punctuation: form.kind == FormKind::Punct,
                language: Some(form.lang.clone()),
                ..WordRecord::default()
            })
        })
        .collect()
}
