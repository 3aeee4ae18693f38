use crate::common::time_order::format_offset;
use crate::error::FormatError;
use crate::formats::common::XmlWriter;
use crate::ir::eaf::{Annotation, AnnotationDocument, LinguisticType, Tier, LAST_USED_ANNOTATION_ID};
use crate::ir::xml::Element;

pub fn serialize_eaf(doc: &AnnotationDocument) -> Result<String, FormatError> {
    let mut w = XmlWriter::new();
    w.declaration()?;
    w.start("ANNOTATION_DOCUMENT", pairs(&doc.attributes))?;
    w.element(&header(doc))?;

    if doc.time_order.is_empty() {
        w.empty("TIME_ORDER", [])?;
    } else {
        w.start("TIME_ORDER", [])?;
        for slot in &doc.time_order.slots {
            let value = slot.value.map(format_offset);
            let mut attributes = vec![("TIME_SLOT_ID", slot.id.as_str())];
            if let Some(value) = &value {
                attributes.push(("TIME_VALUE", value.as_str()));
            }
            w.empty("TIME_SLOT", attributes)?;
        }
        w.end("TIME_ORDER")?;
    }

    for tier in &doc.tiers {
        write_tier(&mut w, tier)?;
    }
    for lt in &doc.linguistic_types {
        write_linguistic_type(&mut w, lt)?;
    }
    for element in &doc.passthrough {
        w.element(element)?;
    }

    w.end("ANNOTATION_DOCUMENT")?;
    w.finish()
}

fn pairs(attributes: &[(String, String)]) -> impl Iterator<Item = (&str, &str)> {
    attributes.iter().map(|(k, v)| (k.as_str(), v.as_str()))
}

/// The header with the last-used-id property brought up to date.
fn header(doc: &AnnotationDocument) -> Element {
    let mut header = doc.header.clone();
    let Some(last) = doc.last_used_annotation_id else {
        return header;
    };
    let existing = header
        .children
        .iter()
        .position(|p| p.name == "PROPERTY" && p.attribute("NAME") == Some(LAST_USED_ANNOTATION_ID));
    match existing {
        Some(i) => header.children[i].text = Some(last.to_string()),
        None => header.children.push(
            Element::new("PROPERTY")
                .with_attribute("NAME", LAST_USED_ANNOTATION_ID)
                .with_text(last.to_string()),
        ),
    }
    header
}

fn write_tier(w: &mut XmlWriter, tier: &Tier) -> Result<(), FormatError> {
    let mut attributes = vec![
        ("TIER_ID", tier.id.as_str()),
        ("LINGUISTIC_TYPE_REF", tier.linguistic_type.as_str()),
    ];
    if let Some(parent) = &tier.parent {
        attributes.push(("PARENT_REF", parent.as_str()));
    }
    if let Some(participant) = &tier.participant {
        attributes.push(("PARTICIPANT", participant.as_str()));
    }
    attributes.extend(pairs(&tier.extra_attributes));

    if tier.annotations.is_empty() {
        return w.empty("TIER", attributes);
    }
    w.start("TIER", attributes)?;
    for annotation in &tier.annotations {
        w.start("ANNOTATION", [])?;
        match annotation {
            Annotation::Alignable(a) => {
                w.start(
                    "ALIGNABLE_ANNOTATION",
                    [
                        ("ANNOTATION_ID", a.id.as_str()),
                        ("TIME_SLOT_REF1", a.begin_slot.as_str()),
                        ("TIME_SLOT_REF2", a.end_slot.as_str()),
                    ],
                )?;
                w.text_element("ANNOTATION_VALUE", [], &a.value)?;
                w.end("ALIGNABLE_ANNOTATION")?;
            }
            Annotation::Reference(r) => {
                let mut attributes = vec![
                    ("ANNOTATION_ID", r.id.as_str()),
                    ("ANNOTATION_REF", r.parent.as_str()),
                ];
                if let Some(previous) = &r.previous {
                    attributes.push(("PREVIOUS_ANNOTATION", previous.as_str()));
                }
                w.start("REF_ANNOTATION", attributes)?;
                w.text_element("ANNOTATION_VALUE", [], &r.value)?;
                w.end("REF_ANNOTATION")?;
            }
        }
        w.end("ANNOTATION")?;
    }
    w.end("TIER")
}

fn write_linguistic_type(w: &mut XmlWriter, lt: &LinguisticType) -> Result<(), FormatError> {
    let mut attributes = vec![("LINGUISTIC_TYPE_ID", lt.id.as_str())];
    attributes.extend(pairs(&lt.extra_attributes));
    attributes.push(("TIME_ALIGNABLE", if lt.time_alignable { "true" } else { "false" }));
    if let Some(constraint) = lt.constraint {
        attributes.push(("CONSTRAINTS", constraint.as_str()));
    }
    w.empty("LINGUISTIC_TYPE", attributes)
}
