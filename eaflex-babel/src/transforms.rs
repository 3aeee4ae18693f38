//! Whole-document conversions
//!
//! These wrap parsing, the mapping core and serialization into single calls
//! taking and returning XML text. The CLI uses nothing else.
//!
//! # Example
//!
//! ```ignore
//! use eaflex_babel::transforms::{eaf_to_flextext, flextext_to_eaf};
//!
//! let flextext = eaf_to_flextext(&eaf, &settings, Some("Fishing trip"))?;
//! // ... gloss the text in FLEx ...
//! let export = flextext_to_eaf(&glossed, &eaf, &settings)?;
//! std::fs::write("session-flex_export.eaf", export.document)?;
//! ```

use crate::common::tier_schema;
use crate::common::time_order::time_order_from_phrases;
use crate::common::tree_to_tiers::GraphAssembler;
use crate::common::{tiers_to_tree_with_segments, tree_to_tiers_with_segments};
use crate::error::ConversionError;
use crate::formats::eaf::{parse_eaf, serialize_eaf};
use crate::formats::flextext::{parse_flextext, serialize_flextext};
use crate::ir::eaf::{Annotation, AnnotationDocument, Tier};
use crate::ir::segment::SegmentRecord;
use crate::ir::xml::Element;
use crate::settings::{ConversionSettings, EafLanguage};

/// Result of the interlinear-to-annotation direction.
#[derive(Debug, Clone)]
pub struct EafExport {
    /// Serialized `.eaf` document
    pub document: String,
    /// One record per written segment, in segment-number order
    pub segments: Vec<SegmentRecord>,
}

/// Convert an annotation document into an interlinear text.
pub fn eaf_to_flextext(
    source: &str,
    settings: &ConversionSettings,
    title: Option<&str>,
) -> Result<String, ConversionError> {
    let doc = parse_eaf(source)?;
    let (mut tree, _) = tiers_to_tree_with_segments(doc, settings)?;
    tree.title = title.map(str::to_string);
    Ok(serialize_flextext(&tree)?)
}

/// Convert a glossed interlinear text back into an annotation document.
///
/// `original_eaf` is the document the interlinear text was exported from. Its
/// participants decide which speakers get tiers; its root attributes, header
/// and trailing metadata are carried into the result.
pub fn flextext_to_eaf(
    flextext: &str,
    original_eaf: &str,
    settings: &ConversionSettings,
) -> Result<EafExport, ConversionError> {
    let tree = parse_flextext(flextext)?;
    let original = parse_eaf(original_eaf)?;

    let codes = speaker_codes(&original, settings)?;
    let skeleton = tier_schema::build(settings, codes.iter().map(String::as_str))?;
    let time_order = time_order_from_phrases(&tree)?;
    let (mut doc, segments) = tree_to_tiers_with_segments(&tree, skeleton, time_order, settings)?;

    doc.attributes = original.attributes;
    doc.header = original.header;
    doc.passthrough = with_languages(original.passthrough, &settings.eaf_languages);

    Ok(EafExport {
        document: serialize_eaf(&doc)?,
        segments,
    })
}

/// Segment records of an interlinear text, merged and paired but not written
/// anywhere.
pub fn flextext_segments(
    flextext: &str,
    settings: &ConversionSettings,
) -> Result<Vec<SegmentRecord>, ConversionError> {
    settings.validate()?;
    let tree = parse_flextext(flextext)?;
    let time_order = time_order_from_phrases(&tree)?;
    let assembler = GraphAssembler::new(settings, &time_order);
    let mut records = assembler.collect_segments(&tree)?;
    assembler.pair(&mut records)?;
    Ok(records)
}

/// Segment records of an annotation document, one per source utterance.
pub fn eaf_segments(
    source: &str,
    settings: &ConversionSettings,
) -> Result<Vec<SegmentRecord>, ConversionError> {
    let doc = parse_eaf(source)?;
    tiers_to_tree_with_segments(doc, settings).map(|(_, records)| records)
}

/// Participants of the original document as configured speaker codes,
/// sorted by participant.
fn speaker_codes(
    original: &AnnotationDocument,
    settings: &ConversionSettings,
) -> Result<Vec<String>, ConversionError> {
    let mut codes: Vec<String> = Vec::new();
    for participant in original.participants() {
        let speaker = settings.speaker_by_code_or_name(&participant).ok_or_else(|| {
            ConversionError::Config(format!(
                "participant '{participant}' of the original document is not a configured speaker"
            ))
        })?;
        if !codes.contains(&speaker.code) {
            codes.push(speaker.code.clone());
        }
    }
    Ok(codes)
}

/// Put the configured LANGUAGE definitions where the original keeps its
/// own: before the first LANGUAGE, otherwise after the LOCALEs. Original
/// definitions with a configured LANG_ID are replaced.
fn with_languages(passthrough: Vec<Element>, languages: &[EafLanguage]) -> Vec<Element> {
    if languages.is_empty() {
        return passthrough;
    }
    let configured: Vec<&str> = languages.iter().map(|l| l.lang_id.as_str()).collect();
    let mut kept: Vec<Element> = passthrough
        .into_iter()
        .filter(|el| {
            el.name != "LANGUAGE"
                || !el
                    .attribute("LANG_ID")
                    .is_some_and(|id| configured.contains(&id))
        })
        .collect();

    let at = kept
        .iter()
        .position(|el| el.name == "LANGUAGE")
        .or_else(|| {
            kept.iter()
                .rposition(|el| el.name == "LOCALE")
                .map(|i| i + 1)
        })
        .unwrap_or(0);
    let elements = languages.iter().map(|l| {
        Element::new("LANGUAGE")
            .with_attribute("LANG_DEF", &l.lang_def)
            .with_attribute("LANG_ID", &l.lang_id)
            .with_attribute("LANG_LABEL", &l.lang_label)
    });
    kept.splice(at..at, elements);
    kept
}

/// Indented outline of the tier hierarchy, one tier per line:
/// id, linguistic type (and constraint), participant, annotation count.
pub fn tier_outline(doc: &AnnotationDocument) -> String {
    let mut out = String::new();
    let is_root = |tier: &Tier| {
        tier.parent
            .as_deref()
            .map_or(true, |parent| doc.tier(parent).is_none())
    };
    for tier in doc.tiers.iter().filter(|t| is_root(t)) {
        outline_tier(doc, tier, 0, &mut out);
    }
    out
}

fn outline_tier(doc: &AnnotationDocument, tier: &Tier, depth: usize, out: &mut String) {
    let constraint = doc
        .type_of(tier)
        .and_then(|lt| lt.constraint)
        .map(|c| format!("/{c}"))
        .unwrap_or_default();
    let aligned = tier
        .annotations
        .iter()
        .filter(|a| matches!(a, Annotation::Alignable(_)))
        .count();
    out.push_str(&format!(
        "{:indent$}{} [{}{}]",
        "",
        tier.id,
        tier.linguistic_type,
        constraint,
        indent = depth * 2
    ));
    if let Some(participant) = &tier.participant {
        out.push_str(&format!(" @{participant}"));
    }
    out.push_str(&format!(" {} ({aligned} aligned)\n", tier.annotations.len()));

    for child in doc
        .tiers
        .iter()
        .filter(|t| t.parent.as_deref() == Some(tier.id.as_str()))
    {
        outline_tier(doc, child, depth + 1, out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn language(id: &str) -> EafLanguage {
        EafLanguage {
            lang_def: format!("http://cdb.iso.org/lg/{id}"),
            lang_id: id.into(),
            lang_label: format!("{id} label"),
        }
    }

    fn names(elements: &[Element]) -> Vec<String> {
        elements
            .iter()
            .map(|e| match e.attribute("LANG_ID") {
                Some(id) => format!("{}:{id}", e.name),
                None => e.name.clone(),
            })
            .collect()
    }

    #[test]
    fn test_languages_go_before_existing_ones() {
        let passthrough = vec![
            Element::new("LOCALE"),
            Element::new("LANGUAGE").with_attribute("LANG_ID", "eng"),
            Element::new("LANGUAGE").with_attribute("LANG_ID", "ain"),
            Element::new("CONSTRAINT"),
        ];
        let out = with_languages(passthrough, &[language("ain"), language("jpn")]);
        assert_eq!(
            names(&out),
            ["LOCALE", "LANGUAGE:ain", "LANGUAGE:jpn", "LANGUAGE:eng", "CONSTRAINT"]
        );
        assert_eq!(out[1].attribute("LANG_LABEL"), Some("ain label"));
    }

    #[test]
    fn test_languages_follow_locales_when_there_are_none() {
        let passthrough = vec![Element::new("LOCALE"), Element::new("CONSTRAINT")];
        let out = with_languages(passthrough, &[language("ain")]);
        assert_eq!(names(&out), ["LOCALE", "LANGUAGE:ain", "CONSTRAINT"]);

        let out = with_languages(vec![Element::new("CONSTRAINT")], &[language("ain")]);
        assert_eq!(names(&out), ["LANGUAGE:ain", "CONSTRAINT"]);
    }

    #[test]
    fn test_outline_nests_children_under_parents() {
        let mut doc = AnnotationDocument::default();
        doc.linguistic_types.push(crate::ir::eaf::LinguisticType::new("default-lt", true, None));
        doc.tiers.push(Tier::new("ANA", "default-lt", None, Some("Ana".into())));
        doc.tiers.push(Tier::new("ANA-notes", "notes", Some("ANA".into()), None));
        doc.tiers.push(Tier::new("orphan", "notes", Some("missing".into()), None));

        assert_eq!(
            tier_outline(&doc),
            "ANA [default-lt] @Ana 0 (0 aligned)\n  ANA-notes [notes] 0 (0 aligned)\norphan [notes] 0 (0 aligned)\n"
        );
    }
}
