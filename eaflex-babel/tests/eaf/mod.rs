//! Annotation document tests: reading the fixture and outlining its tiers.

use crate::common::fixture;
use eaflex_babel::format::Format;
use eaflex_babel::formats::eaf::{parse_eaf, serialize_eaf, EafFormat};
use eaflex_babel::ir::eaf::Annotation;
use eaflex_babel::transforms::tier_outline;
use eaflex_babel::FormatRegistry;

#[test]
fn test_fixture_structure() {
    let doc = parse_eaf(&fixture("session.eaf")).unwrap();

    assert_eq!(doc.tiers.len(), 7);
    assert_eq!(doc.time_order.len(), 6);
    assert_eq!(doc.annotation_count(), 9);
    assert_eq!(doc.last_used_annotation_id, Some(9));
    assert_eq!(
        doc.participants().into_iter().collect::<Vec<_>>(),
        ["Ana", "Bo"]
    );
    assert_eq!(
        doc.media_urls(),
        ["file:///corpus/session.wav", "file:///corpus/session.mp4"]
    );

    let phones = doc.tier("Bo-phones").unwrap();
    match &phones.annotations[1] {
        Annotation::Reference(r) => assert_eq!(r.previous.as_deref(), Some("a8")),
        other => panic!("Expected a referring annotation, got {other:?}"),
    }
}

#[test]
fn test_tier_outline() {
    let doc = parse_eaf(&fixture("session.eaf")).unwrap();

    insta::assert_snapshot!(tier_outline(&doc), @r"
Ana [utterance] @Ana 2 (2 aligned)
  Ana-tns-en [translation/Symbolic_Association] @Ana 1 (0 aligned)
  Ana-notes [comment/Symbolic_Association] @Ana 1 (0 aligned)
Bo [utterance] @Bo 1 (1 aligned)
  Bo-target [target/Symbolic_Association] @Bo 1 (0 aligned)
  Bo-tns-en [translation/Symbolic_Association] @Bo 1 (0 aligned)
  Bo-phones [phones/Symbolic_Subdivision] @Bo 2 (0 aligned)
");
}

#[test]
fn test_removing_tiers_by_constraint() {
    let mut doc = parse_eaf(&fixture("session.eaf")).unwrap();

    assert_eq!(doc.remove_tiers_with_constraint("Symbolic_Subdivision"), 1);
    assert!(doc.tier("Bo-phones").is_none());
    assert_eq!(doc.remove_tiers_with_constraint("Included_In"), 0);
    assert_eq!(doc.tiers.len(), 6);
}

#[test]
fn test_metadata_survives_rewriting() {
    let source = fixture("session.eaf");
    let doc = parse_eaf(&source).unwrap();
    let xml = serialize_eaf(&doc).unwrap();

    assert!(xml.contains("<LOCALE COUNTRY_CODE=\"JP\" LANGUAGE_CODE=\"ja\"/>"));
    assert!(xml.contains("STEREOTYPE=\"Included_In\""));
    assert!(xml.contains("urn:nl-mpi-tools-elan-eaf:4c3e8a7e-0d5f-4a53-9d57-8f1d1a3b2c11"));
    assert!(xml.contains("ANNOTATOR=\"MK\""));
    assert_eq!(parse_eaf(&xml).unwrap(), doc);
}

#[test]
fn test_registry_dispatch() {
    let registry = FormatRegistry::default();
    let name = registry
        .detect_format_from_filename("corpus/session.eaf")
        .unwrap();
    let doc = registry.parse(&fixture("session.eaf"), &name).unwrap();

    assert_eq!(doc.format_name(), "eaf");
    assert_eq!(
        registry.serialize(&doc, "eaf").unwrap(),
        EafFormat.serialize(&doc).unwrap()
    );
    assert!(registry.serialize(&doc, "flextext").is_err());
}
