//! Converts an interlinear text into tiers of annotations.
//!
//! # The High-Level Concept
//!
//! An interlinear text nests everything about an utterance under one phrase.
//! An annotation document spreads the same content over parallel tiers that
//! point at each other by annotation id. Going from one to the other means
//! flattening each phrase into a [`SegmentRecord`] first, resolving the
//! relations between records (split phrases, target/phonetic pairs), and only
//! then writing annotations, so that every reference points at something that
//! already exists.
//!
//! # The Algorithm
//!
//! 1. **Collect:**
//!    - Read every phrase into a record: time bounds, translations, words and
//!      morphs, and typed notes. Free notes naming a configured speaker become
//!      the speaker, members of the addressee vocabulary become the xds field,
//!      the rest are joined into the notes field
//!    - Group records by the integer part of their segment number and merge
//!      each group
//!    - Check what the tier schema requires: a Phonetic/Target marker, and for
//!      phonetic utterances a speaker and both time bounds
//!
//! 2. **Pair:**
//!    - Match each target with the phonetic utterance carrying the same
//!      alignment id. The target takes the phonetic speaker, and its
//!      phrase-level content moves to the phonetic record, whose tiers hold it
//!
//! 3. **Emit:**
//!    - Walk records by ascending segment number. A target that sorts before
//!      its phonetic utterance is written right after it instead
//!    - Write the utterance annotation (alignable for phonetic, referring to
//!      the phonetic annotation for a target), then notes, xds and
//!      translations, then per word the word, its part of speech and gloss,
//!      then per morph its form followed by the other morph fields
//!    - Empty values produce no annotation. Words and morph forms are always
//!      written, since they carry the chain the dependent fields hang from
//!
//! Ids are handed out at the moment of writing, so they increase strictly in
//! the order annotations appear and the last one is the document's final id.

use super::ids::Emitter;
use super::tier_schema::{TierNames, TierTemplate, GLOSS_TYPE, POS_TYPE};
use super::time_order::{parse_offset, TimeIndex};
use crate::error::ConversionError;
use crate::ir::eaf::{AnnotationDocument, TimeOrder};
use crate::ir::flextext::{InterlinearDocument, MorphField, Note, Phrase, UtteranceKind, Word};
use crate::ir::segment::{MorphRecord, SegmentNumber, SegmentRecord, TimePoint, WordRecord};
use crate::settings::ConversionSettings;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Builds annotation tiers from an interlinear text.
pub fn tree_to_tiers(
    doc: &InterlinearDocument,
    skeleton: TierTemplate,
    time_order: TimeOrder,
    settings: &ConversionSettings,
) -> Result<AnnotationDocument, ConversionError> {
    tree_to_tiers_with_segments(doc, skeleton, time_order, settings).map(|(doc, _)| doc)
}

/// Like [`tree_to_tiers`], also returning the segment records that were written.
pub fn tree_to_tiers_with_segments(
    doc: &InterlinearDocument,
    skeleton: TierTemplate,
    time_order: TimeOrder,
    settings: &ConversionSettings,
) -> Result<(AnnotationDocument, Vec<SegmentRecord>), ConversionError> {
    settings.validate()?;
    let assembler = GraphAssembler::new(settings, &time_order);
    let mut records = assembler.collect_segments(doc)?;
    let pairs = assembler.pair(&mut records)?;

    let target = AnnotationDocument {
        time_order,
        tiers: skeleton.tiers,
        linguistic_types: skeleton.linguistic_types,
        ..AnnotationDocument::default()
    };
    let out = assembler.emit(&mut records, &pairs, target)?;
    debug!(
        segments = records.len(),
        annotations = out.annotation_count(),
        "built annotation tiers"
    );
    Ok((out, records))
}

pub struct GraphAssembler<'a> {
    settings: &'a ConversionSettings,
    index: TimeIndex,
}

impl<'a> GraphAssembler<'a> {
    pub fn new(settings: &'a ConversionSettings, time_order: &TimeOrder) -> Self {
        Self {
            settings,
            index: TimeIndex::build(time_order),
        }
    }

    /// One merged, checked record per integer segment number, in ascending order.
    pub fn collect_segments(
        &self,
        doc: &InterlinearDocument,
    ) -> Result<Vec<SegmentRecord>, ConversionError> {
        let mut groups: BTreeMap<u32, Vec<SegmentRecord>> = BTreeMap::new();
        for (position, phrase) in doc.phrases().enumerate() {
            let record = self.read_phrase(phrase, position + 1)?;
            groups.entry(record.number.base).or_default().push(record);
        }

        let mut records = Vec::with_capacity(groups.len());
        for (_, parts) in groups {
            if let Some(record) = SegmentRecord::merge(parts) {
                self.check(&record)?;
                records.push(record);
            }
        }
        Ok(records)
    }

    fn read_phrase(&self, phrase: &Phrase, position: usize) -> Result<SegmentRecord, ConversionError> {
        let raw = phrase.segnum.as_deref().ok_or_else(|| {
            ConversionError::missing_field(format!("#{position}"), "segment number")
        })?;
        let number: SegmentNumber = raw
            .parse()
            .map_err(|_| ConversionError::missing_field(raw, "numeric segment number"))?;

        let mut record = SegmentRecord::new(number);
        record.begin = self.time_point(phrase.begin_offset.as_deref())?;
        record.end = self.time_point(phrase.end_offset.as_deref())?;

        let mut notes = Vec::new();
        for note in &phrase.notes {
            match note {
                Note::Translation { text, .. } if text.trim().is_empty() => {}
                Note::Translation { lang, text } => {
                    record.translations.insert(lang.clone(), text.clone());
                }
                Note::Marker(kind) => record.kind = Some(*kind),
                Note::AlignmentId(id) => record.alignment_id = Some(id.clone()),
                Note::Speaker(code) => record.speaker = Some(self.speaker_code(code)),
                Note::Xds(value) => record.xds = value.clone(),
                Note::Free(text) if text.trim().is_empty() => {}
                Note::Free(text) => {
                    if let Some(speaker) = self.settings.speaker_by_code_or_name(text) {
                        record.speaker = Some(speaker.code.clone());
                    } else if self.settings.is_xds(text) {
                        record.xds = text.clone();
                    } else {
                        notes.push(text.as_str());
                    }
                }
            }
        }
        record.notes = notes.join("; ");
        if record.speaker.is_none() {
            record.speaker = phrase
                .speaker
                .as_deref()
                .and_then(|s| self.settings.speaker_by_code_or_name(s))
                .map(|s| s.code.clone());
        }

        record.words = phrase.words.iter().map(|w| self.read_word(w)).collect();
        record.full_text = record
            .words
            .iter()
            .filter(|w| !w.punctuation && !w.text.is_empty())
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Ok(record)
    }

    fn read_word(&self, word: &Word) -> WordRecord {
        let form = word
            .form_in(&self.settings.language)
            .or_else(|| word.form_in(&self.settings.child_language));
        WordRecord {
            text: form.map(|f| f.text.clone()).unwrap_or_default(),
            punctuation: word.is_punctuation(),
            language: form.map(|f| f.lang.clone()),
            pos: word.pos.clone().unwrap_or_default(),
            gloss: word.gloss.clone().unwrap_or_default(),
            morphs: word
                .morphs
                .iter()
                .map(|morph| MorphRecord {
                    fields: MorphField::ALL
                        .into_iter()
                        .filter_map(|field| morph.get(field).map(|v| (field, v.to_string())))
                        .collect(),
                })
                .collect(),
        }
    }

    fn time_point(&self, raw: Option<&str>) -> Result<Option<TimePoint>, ConversionError> {
        raw.map(|raw| self.index.point_for_value(parse_offset(raw)?))
            .transpose()
    }

    fn speaker_code(&self, value: &str) -> String {
        self.settings
            .speaker_by_code_or_name(value)
            .map(|s| s.code.clone())
            .unwrap_or_else(|| value.to_string())
    }

    fn check(&self, record: &SegmentRecord) -> Result<(), ConversionError> {
        let kind = record
            .kind
            .ok_or_else(|| ConversionError::missing_field(record.number, "Phonetic/Target note"))?;

        if kind != UtteranceKind::Phonetic && self.settings.child_language != self.settings.language {
            let child = record
                .words
                .iter()
                .find(|w| w.language.as_deref() == Some(self.settings.child_language.as_str()));
            if let Some(word) = child {
                return Err(ConversionError::UnexpectedLanguage {
                    segment: record.number.to_string(),
                    language: word.language.clone().unwrap_or_default(),
                });
            }
        }

        if kind == UtteranceKind::Phonetic {
            if record.speaker.is_none() {
                return Err(ConversionError::missing_field(record.number, "speaker note"));
            }
            if record.begin.is_none() || record.end.is_none() {
                return Err(ConversionError::Alignment(format!(
                    "segment {} has no time offsets",
                    record.number
                )));
            }
        }
        Ok(())
    }

    /// Match targets with their phonetic utterances. Returns `(target, phonetic)`
    /// index pairs.
    pub fn pair(&self, records: &mut [SegmentRecord]) -> Result<Vec<(usize, usize)>, ConversionError> {
        let mut phonetics: HashMap<String, usize> = HashMap::new();
        for (i, record) in records.iter().enumerate() {
            if !record.is_phonetic() {
                continue;
            }
            if let Some(key) = record.pair_key() {
                if phonetics.insert(key.to_string(), i).is_some() {
                    return Err(ConversionError::pairing(
                        record.number,
                        format!("alignment id {key} is used by more than one phonetic utterance"),
                    ));
                }
            }
        }

        let mut pairs = Vec::new();
        let mut claimed: HashMap<usize, usize> = HashMap::new();
        for t in 0..records.len() {
            if !records[t].is_target() {
                continue;
            }
            let number = records[t].number;
            let key = records[t]
                .pair_key()
                .ok_or_else(|| ConversionError::pairing(number, "target utterance has no alignment id note"))?;
            let p = *phonetics.get(key).ok_or_else(|| {
                ConversionError::pairing(number, format!("no phonetic utterance has alignment id {key}"))
            })?;
            if let Some(other) = claimed.insert(p, t) {
                return Err(ConversionError::pairing(
                    number,
                    format!(
                        "phonetic utterance {} is already paired with segment {}",
                        records[p].number, records[other].number
                    ),
                ));
            }

            records[t].speaker = records[p].speaker.clone();
            fold_into_phonetic(records, t, p);
            pairs.push((t, p));
        }
        Ok(pairs)
    }

    /// Write every record into `doc` and return the finished document.
    pub fn emit(
        &self,
        records: &mut [SegmentRecord],
        pairs: &[(usize, usize)],
        doc: AnnotationDocument,
    ) -> Result<AnnotationDocument, ConversionError> {
        let mut emitter = Emitter::new(doc);
        let target_of: HashMap<usize, usize> = pairs.iter().map(|&(t, p)| (p, t)).collect();

        for i in emission_order(records, pairs) {
            let id = self.emit_record(&mut emitter, &records[i])?;
            records[i].own_annotation_id = Some(id);
            if let Some(&t) = target_of.get(&i) {
                records[t].paired_annotation_id = Some(id);
            }
        }
        Ok(emitter.finish())
    }

    fn emit_record(&self, emitter: &mut Emitter, record: &SegmentRecord) -> Result<u64, ConversionError> {
        let kind = record
            .kind
            .ok_or_else(|| ConversionError::missing_field(record.number, "Phonetic/Target note"))?;
        let code = record
            .speaker
            .as_deref()
            .ok_or_else(|| ConversionError::missing_field(record.number, "speaker note"))?;
        let speaker = self
            .settings
            .speaker(code)
            .ok_or_else(|| ConversionError::Config(format!("speaker '{code}' is not configured")))?;
        let names = TierNames::new(&speaker.name, &self.settings.language);

        let baseline = match kind {
            UtteranceKind::Phonetic => {
                let begin = slot(record.begin.as_ref(), record.number)?;
                let end = slot(record.end.as_ref(), record.number)?;
                emitter.emit_alignable(&names.baseline(kind), begin, end, &record.full_text)?
            }
            UtteranceKind::Target => {
                let parent = record.paired_annotation_id.ok_or_else(|| {
                    ConversionError::pairing(record.number, "target utterance was not paired")
                })?;
                emitter.emit_ref(&names.baseline(kind), parent, &record.full_text)?
            }
        };

        if kind == UtteranceKind::Phonetic {
            let mut content = vec![(names.notes(), record.notes.as_str()), (names.xds(), record.xds.as_str())];
            for language in &self.settings.translations {
                let text = record.translations.get(language).map(String::as_str).unwrap_or("");
                content.push((names.translation(language), text));
            }
            for (tier, value) in content {
                if !value.trim().is_empty() {
                    emitter.emit_ref(&tier, baseline, value)?;
                }
            }
        }

        for word in &record.words {
            let word_id = emitter.emit_ref(&names.words(kind), baseline, &word.text)?;
            for (field, value) in [(POS_TYPE, &word.pos), (GLOSS_TYPE, &word.gloss)] {
                if !value.trim().is_empty() {
                    emitter.emit_ref(&names.word_field(kind, field), word_id, value)?;
                }
            }
            for morph in &word.morphs {
                let form = morph.get(MorphField::Form);
                let morph_id = emitter.emit_ref(&names.morph(kind, MorphField::Form), word_id, form)?;
                for field in &self.settings.morph_fields {
                    let value = morph.get(*field);
                    if *field != MorphField::Form && !value.trim().is_empty() {
                        emitter.emit_ref(&names.morph(kind, *field), morph_id, value)?;
                    }
                }
            }
        }
        Ok(baseline)
    }
}

fn slot(point: Option<&TimePoint>, number: SegmentNumber) -> Result<&str, ConversionError> {
    point
        .and_then(|p| p.slot.as_deref())
        .ok_or_else(|| ConversionError::Alignment(format!("segment {number} has no time offsets")))
}

/// Move a target's phrase-level content onto its phonetic record.
fn fold_into_phonetic(records: &mut [SegmentRecord], target: usize, phonetic: usize) {
    let notes = std::mem::take(&mut records[target].notes);
    let xds = std::mem::take(&mut records[target].xds);
    let translations = std::mem::take(&mut records[target].translations);
    if notes.is_empty() && xds.is_empty() && translations.is_empty() {
        return;
    }
    warn!(
        target = %records[target].number,
        phonetic = %records[phonetic].number,
        "moving target notes and translations to the phonetic utterance"
    );

    let into = &mut records[phonetic];
    append(&mut into.notes, notes);
    append(&mut into.xds, xds);
    for (language, text) in translations {
        append(into.translations.entry(language).or_default(), text);
    }
}

fn append(field: &mut String, value: String) {
    if value.is_empty() {
        return;
    }
    if !field.is_empty() {
        field.push_str("; ");
    }
    field.push_str(&value);
}

/// Ascending segment order, except that a target sorting before its phonetic
/// utterance directly follows it.
fn emission_order(records: &[SegmentRecord], pairs: &[(usize, usize)]) -> Vec<usize> {
    let mut sorted: Vec<usize> = (0..records.len()).collect();
    sorted.sort_by_key(|&i| records[i].number);
    let mut position = vec![0; records.len()];
    for (pos, &i) in sorted.iter().enumerate() {
        position[i] = pos;
    }
    let phonetic_of: HashMap<usize, usize> = pairs.iter().copied().collect();
    let target_of: HashMap<usize, usize> = pairs.iter().map(|&(t, p)| (p, t)).collect();

    let mut order = Vec::with_capacity(records.len());
    for &i in &sorted {
        if phonetic_of.get(&i).is_some_and(|&p| position[p] > position[i]) {
            continue;
        }
        order.push(i);
        if let Some(&t) = target_of.get(&i) {
            if position[t] < position[i] {
                order.push(t);
            }
        }
    }
    order
}
