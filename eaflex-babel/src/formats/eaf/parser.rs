use crate::error::FormatError;
use crate::ir::eaf::{
    AlignableAnnotation, Annotation, AnnotationDocument, Constraint, LinguisticType, RefAnnotation,
    Tier, TimeOrder, TimeSlot, LAST_USED_ANNOTATION_ID,
};
use crate::ir::xml::{qualified_attributes, Element};
use roxmltree::Node;

pub fn parse_eaf(source: &str) -> Result<AnnotationDocument, FormatError> {
    let xml = roxmltree::Document::parse(source)
        .map_err(|e| FormatError::ParseError(format!("XML parsing error: {e}")))?;

    let root = xml.root_element();
    if root.tag_name().name() != "ANNOTATION_DOCUMENT" {
        return Err(FormatError::ParseError(format!(
            "Root element is <{}>, expected <ANNOTATION_DOCUMENT>",
            root.tag_name().name()
        )));
    }

    let mut doc = AnnotationDocument {
        attributes: qualified_attributes(root),
        ..AnnotationDocument::default()
    };
    for child in root.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "HEADER" => doc.header = Element::from_node(child),
            "TIME_ORDER" => doc.time_order = parse_time_order(child)?,
            "TIER" => doc.tiers.push(parse_tier(child)?),
            "LINGUISTIC_TYPE" => doc.linguistic_types.push(parse_linguistic_type(child)?),
            _ => doc.passthrough.push(Element::from_node(child)),
        }
    }
    doc.last_used_annotation_id = doc
        .header
        .children_named("PROPERTY")
        .find(|p| p.attribute("NAME") == Some(LAST_USED_ANNOTATION_ID))
        .and_then(|p| p.text.as_deref())
        .and_then(|text| text.trim().parse().ok());
    Ok(doc)
}

fn required<'a>(node: Node<'a, '_>, name: &str) -> Result<&'a str, FormatError> {
    node.attribute(name).ok_or_else(|| {
        FormatError::ParseError(format!(
            "<{}> is missing the {name} attribute",
            node.tag_name().name()
        ))
    })
}

/// Attributes of `node` not in `known`, in document order.
fn extra_attributes(node: Node, known: &[&str]) -> Vec<(String, String)> {
    qualified_attributes(node)
        .into_iter()
        .filter(|(name, _)| !known.contains(&name.as_str()))
        .collect()
}

fn parse_time_order(node: Node) -> Result<TimeOrder, FormatError> {
    let mut order = TimeOrder::default();
    for slot in node.children().filter(|n| n.has_tag_name("TIME_SLOT")) {
        let id = required(slot, "TIME_SLOT_ID")?;
        let value = slot
            .attribute("TIME_VALUE")
            .map(|v| {
                v.trim().parse::<f64>().map_err(|_| {
                    FormatError::ParseError(format!("time slot {id} has a malformed value '{v}'"))
                })
            })
            .transpose()?;
        order.slots.push(TimeSlot {
            id: id.to_string(),
            value,
        });
    }
    Ok(order)
}

fn parse_tier(node: Node) -> Result<Tier, FormatError> {
    let mut tier = Tier::new(
        required(node, "TIER_ID")?,
        required(node, "LINGUISTIC_TYPE_REF")?,
        node.attribute("PARENT_REF").map(str::to_string),
        node.attribute("PARTICIPANT").map(str::to_string),
    );
    tier.extra_attributes = extra_attributes(
        node,
        &["TIER_ID", "LINGUISTIC_TYPE_REF", "PARENT_REF", "PARTICIPANT"],
    );
    for wrapper in node.children().filter(|n| n.has_tag_name("ANNOTATION")) {
        if let Some(annotation) = wrapper.children().find(Node::is_element) {
            tier.annotations.push(parse_annotation(annotation)?);
        }
    }
    Ok(tier)
}

fn parse_annotation(node: Node) -> Result<Annotation, FormatError> {
    let value = node
        .children()
        .find(|n| n.has_tag_name("ANNOTATION_VALUE"))
        .and_then(|n| n.text())
        .unwrap_or("")
        .to_string();
    let id = required(node, "ANNOTATION_ID")?.to_string();

    match node.tag_name().name() {
        "ALIGNABLE_ANNOTATION" => Ok(Annotation::Alignable(AlignableAnnotation {
            id,
            begin_slot: required(node, "TIME_SLOT_REF1")?.to_string(),
            end_slot: required(node, "TIME_SLOT_REF2")?.to_string(),
            value,
        })),
        "REF_ANNOTATION" => Ok(Annotation::Reference(RefAnnotation {
            id,
            parent: required(node, "ANNOTATION_REF")?.to_string(),
            previous: node.attribute("PREVIOUS_ANNOTATION").map(str::to_string),
            value,
        })),
        other => Err(FormatError::ParseError(format!(
            "unexpected <{other}> inside <ANNOTATION>"
        ))),
    }
}

fn parse_linguistic_type(node: Node) -> Result<LinguisticType, FormatError> {
    let constraint = node
        .attribute("CONSTRAINTS")
        .map(|c| c.parse::<Constraint>().map_err(FormatError::ParseError))
        .transpose()?;
    Ok(LinguisticType {
        id: required(node, "LINGUISTIC_TYPE_ID")?.to_string(),
        time_alignable: node.attribute("TIME_ALIGNABLE") == Some("true"),
        constraint,
        extra_attributes: extra_attributes(
            node,
            &["LINGUISTIC_TYPE_ID", "TIME_ALIGNABLE", "CONSTRAINTS"],
        ),
    })
}
