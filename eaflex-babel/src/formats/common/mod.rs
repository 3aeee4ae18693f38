//! XML writing shared by the format serializers.
//!
//! A thin layer over `quick_xml::Writer` with tab indentation. Attribute
//! values and text are escaped by quick-xml; errors surface as
//! [`FormatError::SerializationError`].

use crate::error::FormatError;
use crate::ir::xml::Element;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

pub struct XmlWriter {
    writer: Writer<Vec<u8>>,
}

impl Default for XmlWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlWriter {
    pub fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b'\t', 1),
        }
    }

    fn write(&mut self, event: Event) -> Result<(), FormatError> {
        self.writer
            .write_event(event)
            .map_err(|e| FormatError::SerializationError(e.to_string()))
    }

    pub fn declaration(&mut self) -> Result<(), FormatError> {
        self.write(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
    }

    pub fn start<'a, I>(&mut self, name: &str, attributes: I) -> Result<(), FormatError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tag = BytesStart::new(name);
        for attribute in attributes {
            tag.push_attribute(attribute);
        }
        self.write(Event::Start(tag))
    }

    pub fn end(&mut self, name: &str) -> Result<(), FormatError> {
        self.write(Event::End(BytesEnd::new(name)))
    }

    pub fn empty<'a, I>(&mut self, name: &str, attributes: I) -> Result<(), FormatError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut tag = BytesStart::new(name);
        for attribute in attributes {
            tag.push_attribute(attribute);
        }
        self.write(Event::Empty(tag))
    }

    /// `<name attrs>text</name>`, or an empty element when `text` is empty.
    pub fn text_element<'a, I>(&mut self, name: &str, attributes: I, text: &str) -> Result<(), FormatError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        if text.is_empty() {
            return self.empty(name, attributes);
        }
        self.start(name, attributes)?;
        self.write(Event::Text(BytesText::new(text)))?;
        self.end(name)
    }

    /// Write a carried-through element and its subtree.
    pub fn element(&mut self, element: &Element) -> Result<(), FormatError> {
        let attributes = element
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()));
        match (&element.text, element.children.is_empty()) {
            (Some(text), true) => self.text_element(&element.name, attributes, text),
            (None, true) => self.empty(&element.name, attributes),
            (text, false) => {
                self.start(&element.name, attributes)?;
                if let Some(text) = text.as_deref().filter(|t| !t.trim().is_empty()) {
                    self.write(Event::Text(BytesText::new(text)))?;
                }
                for child in &element.children {
                    self.element(child)?;
                }
                self.end(&element.name)
            }
        }
    }

    pub fn finish(self) -> Result<String, FormatError> {
        let mut out = String::from_utf8(self.writer.into_inner())
            .map_err(|e| FormatError::SerializationError(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_indented_escaped_xml() {
        let mut w = XmlWriter::new();
        w.declaration().unwrap();
        w.start("document", [("version", "2")]).unwrap();
        w.text_element("item", [("type", "title")], "Tom & Jerry").unwrap();
        w.text_element("item", [("type", "note")], "").unwrap();
        w.end("document").unwrap();
        let xml = w.finish().unwrap();

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <document version=\"2\">\n\
             \t<item type=\"title\">Tom &amp; Jerry</item>\n\
             \t<item type=\"note\"/>\n\
             </document>\n"
        );
    }

    #[test]
    fn test_writes_carried_elements() {
        let el = Element::new("CONTROLLED_VOCABULARY")
            .with_attribute("CV_ID", "xds")
            .with_child(Element::new("DESCRIPTION").with_text("addressee"));
        let mut w = XmlWriter::new();
        w.element(&el).unwrap();
        let xml = w.finish().unwrap();
        assert!(xml.contains("<CONTROLLED_VOCABULARY CV_ID=\"xds\">"));
        assert!(xml.contains("\t<DESCRIPTION>addressee</DESCRIPTION>"));
    }
}
