//! Annotation document to interlinear text.

use crate::common::{fixture, settings};
use eaflex_babel::common::tiers_to_tree;
use eaflex_babel::formats::flextext::parse_flextext;
use eaflex_babel::ir::eaf::{
    AlignableAnnotation, Annotation, AnnotationDocument, LinguisticType, Tier, TimeOrder,
};
use eaflex_babel::ir::flextext::{FormKind, Note, UtteranceKind};
use eaflex_babel::transforms::{eaf_segments, eaf_to_flextext, flextext_segments};
use eaflex_babel::ConversionError;

fn texts(phrase: &eaflex_babel::ir::flextext::Phrase) -> Vec<&str> {
    phrase
        .words
        .iter()
        .map(|w| w.forms[0].text.as_str())
        .collect()
}

#[test]
fn test_single_utterance() {
    let settings = settings();
    let mut time_order = TimeOrder::default();
    let begin = time_order.push(0.0);
    let end = time_order.push(1.5);
    let mut tier = Tier::new("Ana", "utterance", None, Some("Ana".into()));
    tier.annotations.push(Annotation::Alignable(AlignableAnnotation {
        id: "a1".into(),
        begin_slot: begin,
        end_slot: end,
        value: "hai there".into(),
    }));
    let doc = AnnotationDocument {
        time_order,
        tiers: vec![tier],
        linguistic_types: vec![LinguisticType::new("utterance", true, None)],
        ..AnnotationDocument::default()
    };

    let tree = tiers_to_tree(doc, &settings).unwrap();

    assert_eq!(tree.paragraphs.len(), 1);
    let phrases = &tree.paragraphs[0].phrases;
    assert_eq!(phrases.len(), 1);
    assert_eq!(phrases[0].begin_offset.as_deref(), Some("0"));
    assert_eq!(phrases[0].end_offset.as_deref(), Some("1.5"));
    assert_eq!(texts(&phrases[0]), ["hai", "there"]);
    assert_eq!(phrases[0].marker(), Some(UtteranceKind::Phonetic));
}

#[test]
fn test_fixture_to_interlinear_text() {
    let xml = eaf_to_flextext(&fixture("session.eaf"), &settings(), Some("session")).unwrap();
    let tree = parse_flextext(&xml).unwrap();

    assert_eq!(tree.title.as_deref(), Some("session"));
    assert_eq!(tree.paragraphs.len(), 4);
    let phrases: Vec<_> = tree.phrases().collect();
    let segnums: Vec<_> = phrases.iter().map(|p| p.segnum.as_deref().unwrap()).collect();
    assert_eq!(segnums, ["1", "2", "3", "4"]);

    assert_eq!(texts(phrases[0]), ["hai", "there"]);
    assert_eq!(
        phrases[0].notes,
        vec![
            Note::Translation { lang: "en".into(), text: "hello there".into() },
            Note::Free("laughs".into()),
            Note::Marker(UtteranceKind::Phonetic),
            Note::AlignmentId("a1".into()),
            Note::Free("Ana".into()),
        ]
    );
    assert_eq!(texts(phrases[3]), ["kor", ",", "hai"]);
    assert_eq!(phrases[3].words[1].forms[0].kind, FormKind::Punct);
}

#[test]
fn test_child_speech_with_target() {
    let xml = eaf_to_flextext(&fixture("session.eaf"), &settings(), None).unwrap();
    let tree = parse_flextext(&xml).unwrap();
    let phrases: Vec<_> = tree.phrases().collect();

    let (phonetic, target) = (phrases[1], phrases[2]);
    assert_eq!(texts(phonetic), ["tat", "cat", " ."]);
    assert_eq!(phonetic.words[0].forms[0].lang, "ain-x-child");
    assert_eq!(phonetic.marker(), Some(UtteranceKind::Phonetic));
    assert!(phonetic.notes.contains(&Note::AlignmentId("a2".into())));
    // the subdivided phones tier is excluded by constraint
    assert!(!phonetic.notes.iter().any(|n| matches!(n, Note::Free(t) if t.contains("t a t"))));

    assert_eq!(texts(target), ["that", "cat", " ."]);
    assert_eq!(target.words[0].forms[0].lang, "ain");
    assert_eq!(
        target.notes,
        vec![Note::AlignmentId("a2".into()), Note::Marker(UtteranceKind::Target)]
    );
    assert_eq!(target.begin_offset, phonetic.begin_offset);
}

#[test]
fn test_languages_and_media() {
    let xml = eaf_to_flextext(&fixture("session.eaf"), &settings(), None).unwrap();
    let tree = parse_flextext(&xml).unwrap();

    let langs: Vec<_> = tree.languages.iter().map(|l| l.lang.as_str()).collect();
    assert_eq!(langs, ["ain", "en"]);
    assert!(tree.languages[0].vernacular);

    let media = tree.media_files.as_ref().unwrap();
    assert_eq!(media.media.len(), 2);
    assert_eq!(media.media[0].location, "file:///corpus/session.wav");
    let primary = media.media[0].guid.as_str();
    assert!(tree.phrases().all(|p| p.media_file.as_deref() == Some(primary)));
}

#[test]
fn test_segment_records_of_both_directions() {
    let settings = settings();
    let forward = eaf_segments(&fixture("session.eaf"), &settings).unwrap();
    assert_eq!(forward.len(), 3);
    assert_eq!(forward[1].full_text, "tat cat.");
    assert_eq!(forward[1].number.to_string(), "2");
    assert_eq!(forward[2].number.to_string(), "4");
    assert_eq!(forward[0].translations["en"], "hello there");

    let backward = flextext_segments(&fixture("session.flextext"), &settings).unwrap();
    assert_eq!(backward.len(), 4);
    assert_eq!(backward[3].full_text, "kor hai");
    assert_eq!(backward[3].xds, "ADS");
    assert_eq!(backward[3].notes, "a9");
    assert_eq!(backward[2].speaker.as_deref(), Some("BO"));
}

#[test]
fn test_invalid_word_characters() {
    let mut settings = settings();
    settings.main_characters = "[".into();
    let err = eaf_to_flextext(&fixture("session.eaf"), &settings, None).unwrap_err();
    assert!(matches!(err, ConversionError::Config(_)));
}
