//! Minimal XML tree
//!
//! Reporters build the whole document as plain values first and serialize
//! it once at the end, so the structure can be inspected in tests without
//! going through text.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::{ReportError, ReportResult};

#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((key.into(), value.to_string()));
        self
    }

    pub fn child(mut self, child: XmlElement) -> Self {
        self.push(child);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlNode::Text(text.into()));
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// First child element with the given name
    pub fn find(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|element| element.name == name)
    }

    pub fn text_content(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                XmlNode::Text(text) => Some(text.as_str()),
                XmlNode::Element(_) => None,
            })
            .collect()
    }
}

fn xml_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::Xml(err.to_string())
}

/// Serialize with a UTF-8 declaration (no BOM) and two-space indentation
pub fn to_xml_string(root: &XmlElement) -> ReportResult<String> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
        .map_err(xml_error)?;
    write_element(&mut writer, root)?;

    String::from_utf8(writer.into_inner()).map_err(xml_error)
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> ReportResult<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        // `<name attr="v" />`, with a space before the slash
        let mut content = String::from_utf8(start.to_vec()).map_err(xml_error)?;
        content.push(' ');
        let empty = BytesStart::from_content(content, element.name.len());
        writer.write_event(Event::Empty(empty)).map_err(xml_error)?;
        return Ok(());
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for node in &element.children {
        match node {
            XmlNode::Element(child) => write_element(writer, child)?,
            XmlNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(element.name.as_str())))
        .map_err(xml_error)?;

    Ok(())
}
