//! Interlinear text back to annotation tiers, and the full loop.

use crate::common::{fixture, settings};
use eaflex_babel::formats::eaf::parse_eaf;
use eaflex_babel::ir::eaf::{Annotation, AnnotationDocument};
use eaflex_babel::transforms::{eaf_to_flextext, flextext_to_eaf};
use eaflex_babel::ConversionError;

fn values<'a>(doc: &'a AnnotationDocument, tier: &str) -> Vec<&'a str> {
    doc.tier(tier)
        .unwrap_or_else(|| panic!("missing tier {tier}"))
        .annotations
        .iter()
        .map(Annotation::value)
        .collect()
}

fn export() -> AnnotationDocument {
    let export = flextext_to_eaf(
        &fixture("session.flextext"),
        &fixture("session.eaf"),
        &settings(),
    )
    .unwrap();
    parse_eaf(&export.document).unwrap()
}

#[test]
fn test_glossed_text_to_tiers() {
    let doc = export();

    assert_eq!(values(&doc, "Ana-ain-phonetic"), ["hai there", "kor hai"]);
    assert_eq!(values(&doc, "Ana-tns-en"), ["hello there"]);
    assert_eq!(values(&doc, "Ana-notes"), ["laughs", "a9"]);
    assert_eq!(values(&doc, "Ana-xds"), ["ADS"]);
    assert_eq!(values(&doc, "Ana-ain-phonetic-words"), ["hai", "there", "kor", ",", "hai"]);
    assert_eq!(values(&doc, "Ana-ain-phonetic-gls"), ["hey", "there", "and", "hey"]);
    assert_eq!(values(&doc, "Ana-ain-phonetic-pos"), ["interj"]);
    assert_eq!(values(&doc, "Ana-ain-phonetic-morph-txt"), ["hai"]);
    assert_eq!(values(&doc, "Ana-ain-phonetic-morph-gls"), ["hey"]);

    assert_eq!(values(&doc, "Bo-ain-phonetic"), ["tat cat"]);
    assert_eq!(values(&doc, "Bo-tns-en"), ["that cat"]);
    assert_eq!(values(&doc, "Bo-ain-target"), ["that cat"]);
    assert_eq!(values(&doc, "Bo-ain-target-words"), ["that", "cat", " ."]);
    assert_eq!(values(&doc, "Bo-ain-target-pos"), ["dem", "n"]);
}

#[test]
fn test_ids_follow_writing_order() {
    let doc = export();

    assert_eq!(doc.annotation_count(), 31);
    assert_eq!(doc.last_used_annotation_id, Some(31));

    let target = doc.tier("Bo-ain-target").unwrap();
    let phonetic = doc.tier("Bo-ain-phonetic").unwrap();
    match (&target.annotations[0], &phonetic.annotations[0]) {
        (Annotation::Reference(t), Annotation::Alignable(p)) => {
            assert_eq!(p.id, "a11");
            assert_eq!(t.id, "a16");
            assert_eq!(t.parent, p.id);
        }
        other => panic!("Unexpected annotations {other:?}"),
    }

    let words = doc.tier("Ana-ain-phonetic-words").unwrap();
    match &words.annotations[1] {
        Annotation::Reference(r) => assert_eq!(r.previous.as_deref(), Some("a4")),
        other => panic!("Expected a referring annotation, got {other:?}"),
    }
}

#[test]
fn test_original_metadata_is_carried() {
    let doc = export();

    assert_eq!(doc.attributes[0], ("xmlns:xsi".into(), "http://www.w3.org/2001/XMLSchema-instance".into()));
    assert_eq!(
        doc.media_urls(),
        ["file:///corpus/session.wav", "file:///corpus/session.mp4"]
    );
    let names: Vec<_> = doc.passthrough.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        ["LOCALE", "LANGUAGE", "LANGUAGE", "CONSTRAINT", "CONSTRAINT", "CONSTRAINT", "CONSTRAINT"]
    );
    assert_eq!(doc.passthrough[1].attribute("LANG_ID"), Some("ain"));
    assert_eq!(doc.passthrough[2].attribute("LANG_ID"), Some("eng"));
    assert_eq!(doc.participants().into_iter().collect::<Vec<_>>(), ["Ana", "Bo"]);
}

#[test]
fn test_split_phrases_share_a_timeline_slot() {
    let doc = export();

    let ana = doc.tier("Ana-ain-phonetic").unwrap();
    let Annotation::Alignable(last) = &ana.annotations[1] else {
        panic!("Expected an alignable annotation");
    };
    let slot = |id: &str| {
        doc.time_order
            .slots
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.value)
    };
    assert_eq!(slot(&last.begin_slot), Some(2600.0));
    assert_eq!(slot(&last.end_slot), Some(4000.0));
}

#[test]
fn test_full_loop() {
    let settings = settings();
    let original = fixture("session.eaf");
    let flextext = eaf_to_flextext(&original, &settings, Some("session")).unwrap();
    let export = flextext_to_eaf(&flextext, &original, &settings).unwrap();
    let doc = parse_eaf(&export.document).unwrap();

    assert_eq!(values(&doc, "Ana-ain-phonetic"), ["hai there", "kor hai"]);
    assert_eq!(values(&doc, "Ana-notes"), ["laughs"]);
    assert_eq!(values(&doc, "Bo-ain-phonetic"), ["tat cat"]);
    assert_eq!(values(&doc, "Bo-ain-target"), ["that cat"]);
    assert_eq!(values(&doc, "Bo-tns-en"), ["that cat"]);

    let numbers: Vec<_> = export.segments.iter().map(|s| s.number.to_string()).collect();
    assert_eq!(numbers, ["1", "2", "3", "4"]);
    assert_eq!(export.segments[2].paired_annotation_id, export.segments[1].own_annotation_id);
}

#[test]
fn test_unknown_participant_is_a_config_error() {
    let mut settings = settings();
    settings.speakers.retain(|s| s.code != "BO");
    let err = flextext_to_eaf(
        &fixture("session.flextext"),
        &fixture("session.eaf"),
        &settings,
    )
    .unwrap_err();
    assert!(matches!(err, ConversionError::Config(message) if message.contains("'Bo'")));
}

#[test]
fn test_target_without_phonetic_is_a_pairing_error() {
    let flextext = fixture("session.flextext").replace(
        "<item type=\"note\" lang=\"en\">a2</item>\n            <item type=\"note\" lang=\"en\">Target</item>",
        "<item type=\"note\" lang=\"en\">a42</item>\n            <item type=\"note\" lang=\"en\">Target</item>",
    );
    let err = flextext_to_eaf(&flextext, &fixture("session.eaf"), &settings()).unwrap_err();
    match err {
        ConversionError::Pairing { segment, message } => {
            assert_eq!(segment, "3");
            assert!(message.contains("a42"));
        }
        other => panic!("Expected a pairing error, got {other:?}"),
    }
}
