//! Generic labeled-node tree for metadata that is carried through verbatim.

use roxmltree::{Node, NodeType};

/// An XML element kept as-is: name, attributes, direct text, and children.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Replace an attribute in place, or append it.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Direct children with the given name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    pub fn from_node(node: Node) -> Self {
        let mut text = String::new();
        let mut children = Vec::new();
        for child in node.children() {
            match child.node_type() {
                NodeType::Element => children.push(Element::from_node(child)),
                NodeType::Text => text.push_str(child.text().unwrap_or("")),
                _ => {}
            }
        }
        let text = if text.trim().is_empty() && !children.is_empty() {
            None
        } else if text.is_empty() {
            None
        } else {
            Some(text)
        };

        Self {
            name: node.tag_name().name().to_string(),
            attributes: qualified_attributes(node),
            text,
            children,
        }
    }
}

/// Attributes of `node` with namespace prefixes restored, preceded by the
/// namespace declarations introduced on this node.
pub(crate) fn qualified_attributes(node: Node) -> Vec<(String, String)> {
    let inherited: Vec<(Option<String>, String)> = node
        .parent_element()
        .map(|parent| {
            parent
                .namespaces()
                .map(|ns| (ns.name().map(str::to_string), ns.uri().to_string()))
                .collect()
        })
        .unwrap_or_default();

    let mut attributes = Vec::new();
    for ns in node.namespaces() {
        if ns.name() == Some("xml") {
            continue;
        }
        let key = (ns.name().map(str::to_string), ns.uri().to_string());
        if inherited.contains(&key) {
            continue;
        }
        let name = match ns.name() {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };
        attributes.push((name, ns.uri().to_string()));
    }

    for attr in node.attributes() {
        let name = match attr.namespace().and_then(|uri| node.lookup_prefix(uri)) {
            Some(prefix) => format!("{prefix}:{}", attr.name()),
            None => attr.name().to_string(),
        };
        attributes.push((name, attr.value().to_string()));
    }
    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_namespaced_attributes() {
        let source = r#"<ANNOTATION_DOCUMENT xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" AUTHOR="" xsi:noNamespaceSchemaLocation="http://www.mpi.nl/tools/elan/EAFv3.0.xsd"><HEADER MEDIA_FILE=""/></ANNOTATION_DOCUMENT>"#;
        let doc = roxmltree::Document::parse(source).unwrap();
        let root = Element::from_node(doc.root_element());

        assert_eq!(
            root.attribute("xmlns:xsi"),
            Some("http://www.w3.org/2001/XMLSchema-instance")
        );
        assert_eq!(
            root.attribute("xsi:noNamespaceSchemaLocation"),
            Some("http://www.mpi.nl/tools/elan/EAFv3.0.xsd")
        );
        assert_eq!(root.attribute("AUTHOR"), Some(""));
        // Children do not re-declare inherited namespaces
        assert!(root.children[0].attribute("xmlns:xsi").is_none());
    }

    #[test]
    fn test_keeps_text_of_leaf_elements() {
        let doc = roxmltree::Document::parse(
            "<CV><CV_ENTRY_ML><CVE_VALUE>child</CVE_VALUE></CV_ENTRY_ML></CV>",
        )
        .unwrap();
        let cv = Element::from_node(doc.root_element());
        let value = &cv.children[0].children[0];
        assert_eq!(value.name, "CVE_VALUE");
        assert_eq!(value.text.as_deref(), Some("child"));
        assert!(cv.text.is_none());
    }

    #[test]
    fn test_set_attribute_replaces_existing_value() {
        let mut el = Element::new("PROPERTY").with_attribute("NAME", "a");
        el.set_attribute("NAME", "b");
        assert_eq!(el.attributes, vec![("NAME".to_string(), "b".to_string())]);
    }
}
