//! Algebraic properties of segment merging and annotation id allocation.

use crate::common::settings;
use eaflex_babel::common::tier_schema;
use eaflex_babel::common::time_order::time_order_from_phrases;
use eaflex_babel::common::tree_to_tiers;
use eaflex_babel::ir::eaf::{annotation_number, Annotation, AnnotationDocument};
use eaflex_babel::ir::flextext::{
    FormKind, InterlinearDocument, Note, Paragraph, Phrase, UtteranceKind, Word,
};
use eaflex_babel::ir::segment::{SegmentNumber, SegmentRecord, WordRecord};
use proptest::prelude::*;
use std::collections::HashMap;

fn part(base: u32, index: u32, text: &str, notes: &str) -> SegmentRecord {
    let mut record = SegmentRecord::new(SegmentNumber::part(base, index));
    record.full_text = text.to_string();
    record.notes = notes.to_string();
    record.words = text
        .split_whitespace()
        .map(|w| WordRecord {
            text: w.to_string(),
            ..WordRecord::default()
        })
        .collect();
    record
}

fn parts() -> impl Strategy<Value = Vec<SegmentRecord>> {
    prop::collection::vec(("[a-z]{1,5}( [a-z]{1,5}){0,2}|", "[a-z]{0,4}"), 2..6).prop_map(
        |contents| {
            contents
                .iter()
                .enumerate()
                .map(|(i, (text, notes))| part(7, i as u32 + 1, text, notes))
                .collect()
        },
    )
}

fn phrase(index: usize, words: &[(String, Option<String>)]) -> Phrase {
    let begin = index * 1000;
    Phrase {
        segnum: Some((index + 1).to_string()),
        begin_offset: Some(begin.to_string()),
        end_offset: Some((begin + 900).to_string()),
        words: words
            .iter()
            .map(|(text, gloss)| Word {
                gloss: gloss.clone(),
                ..Word::new(FormKind::Txt, "ain", text.as_str())
            })
            .collect(),
        notes: vec![
            Note::Marker(UtteranceKind::Phonetic),
            Note::Free("ANA".into()),
            Note::Translation {
                lang: "en".into(),
                text: format!("line {index}"),
            },
        ],
        ..Phrase::default()
    }
}

fn documents() -> impl Strategy<Value = InterlinearDocument> {
    let word = ("[a-z]{1,6}", prop::option::of("[a-z]{1,4}"));
    prop::collection::vec(prop::collection::vec(word, 1..5), 1..6).prop_map(|phrases| {
        InterlinearDocument {
            analysis_language: "en".into(),
            paragraphs: phrases
                .iter()
                .enumerate()
                .map(|(i, words)| Paragraph {
                    guid: None,
                    phrases: vec![phrase(i, words)],
                })
                .collect(),
            ..InterlinearDocument::default()
        }
    })
}

fn convert(tree: &InterlinearDocument) -> AnnotationDocument {
    let settings = settings();
    let skeleton = tier_schema::build(&settings, ["ANA"]).unwrap();
    let time_order = time_order_from_phrases(tree).unwrap();
    tree_to_tiers(tree, skeleton, time_order, &settings).unwrap()
}

proptest! {
    #[test]
    fn test_merge_does_not_depend_on_part_order(parts in parts().prop_shuffle()) {
        let mut sorted = parts.clone();
        sorted.sort_by_key(|r| r.number);
        prop_assert_eq!(SegmentRecord::merge(parts), SegmentRecord::merge(sorted));
    }

    #[test]
    fn test_merging_a_prefix_first_changes_nothing(parts in parts(), split in 1usize..5) {
        let split = split.min(parts.len());
        let rest = parts[split..].to_vec();
        let head = SegmentRecord::merge(parts[..split].to_vec()).unwrap();

        let stepwise = SegmentRecord::merge(std::iter::once(head).chain(rest));
        let at_once = SegmentRecord::merge(parts);
        prop_assert_eq!(stepwise, at_once);
    }

    #[test]
    fn test_ids_are_dense_and_increase_in_writing_order(tree in documents()) {
        let doc = convert(&tree);
        let count = doc.annotation_count() as u64;
        prop_assert_eq!(doc.last_used_annotation_id, Some(count));

        let mut ids: Vec<u64> = doc
            .annotations()
            .map(|(_, a)| annotation_number(a.id()).unwrap())
            .collect();
        ids.sort_unstable();
        prop_assert_eq!(ids, (1..=count).collect::<Vec<_>>());

        for tier in &doc.tiers {
            let numbers: Vec<u64> = tier
                .annotations
                .iter()
                .map(|a| annotation_number(a.id()).unwrap())
                .collect();
            prop_assert!(numbers.windows(2).all(|w| w[0] < w[1]), "tier {} out of order", tier.id);
        }
    }

    #[test]
    fn test_references_form_well_formed_chains(tree in documents()) {
        let doc = convert(&tree);
        let tier_of: HashMap<&str, &str> = doc
            .annotations()
            .map(|(tier, a)| (a.id(), tier.id.as_str()))
            .collect();

        for (tier, annotation) in doc.annotations() {
            let Annotation::Reference(r) = annotation else {
                prop_assert!(tier.parent.is_none());
                continue;
            };
            prop_assert_eq!(tier_of.get(r.parent.as_str()).copied(), tier.parent.as_deref());
            prop_assert!(annotation_number(&r.parent) < annotation_number(&r.id));

            if let Some(previous) = &r.previous {
                let Some(Annotation::Reference(prev)) = tier.annotation(previous) else {
                    prop_assert!(false, "previous {} is not on tier {}", previous, tier.id);
                    continue;
                };
                prop_assert_eq!(&prev.parent, &r.parent);
                prop_assert!(annotation_number(previous) < annotation_number(&r.id));
            }
        }

        for tier in &doc.tiers {
            let mut siblings: HashMap<&str, Vec<(&str, Option<&str>)>> = HashMap::new();
            for annotation in &tier.annotations {
                if let Annotation::Reference(r) = annotation {
                    siblings
                        .entry(r.parent.as_str())
                        .or_default()
                        .push((r.id.as_str(), r.previous.as_deref()));
                }
            }
            for (parent, group) in &siblings {
                let heads: Vec<&str> = group
                    .iter()
                    .filter(|(_, previous)| previous.is_none())
                    .map(|(id, _)| *id)
                    .collect();
                prop_assert_eq!(heads.len(), 1, "tier {} parent {} has {} chain heads", tier.id, parent, heads.len());

                let mut length = 1;
                let mut current = heads[0];
                while let Some((next, _)) = group.iter().find(|(_, previous)| *previous == Some(current)) {
                    current = *next;
                    length += 1;
                    prop_assert!(length <= group.len(), "tier {} parent {} chain loops", tier.id, parent);
                }
                prop_assert_eq!(length, group.len(), "tier {} parent {} chain misses siblings", tier.id, parent);
            }
        }
    }
}
