//! Namespace-aware XML document tree
//!
//! BPMN documents carry a lot of content this crate never interprets
//! (documentation, extension elements, vendor attributes). The tree keeps
//! all of it so a document can be written back with only the diagram
//! interchange section added.

pub mod reader;
pub mod writer;

pub use reader::parse_document;
pub use writer::write_document;

/// A parsed XML document.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    /// Comments, processing instructions and doctype before the root element
    pub prolog: Vec<XmlNode>,
    /// The document element
    pub root: XmlElement,
    /// Comments and processing instructions after the root element
    pub epilog: Vec<XmlNode>,
}

/// A node inside an element or around the root.
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

/// An element with its qualified name and resolved namespace.
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    /// Qualified name as written (`bpmn:task`, `task`)
    pub qname: String,
    /// Namespace URI the name resolves to, if any
    pub namespace: Option<String>,
    /// Attributes in document order, values unescaped
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    /// Create an element with no attributes or children.
    pub fn new(qname: impl Into<String>, namespace: Option<&str>) -> Self {
        Self {
            qname: qname.into(),
            namespace: namespace.map(str::to_string),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.set_attr(name, value);
        self
    }

    /// Builder-style child appender.
    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    /// Local part of the qualified name.
    pub fn local_name(&self) -> &str {
        match self.qname.split_once(':') {
            Some((_, local)) => local,
            None => &self.qname,
        }
    }

    /// Prefix of the qualified name, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.qname.split_once(':').map(|(prefix, _)| prefix)
    }

    /// True when the element is `local` in namespace `ns`.
    pub fn is(&self, ns: &str, local: &str) -> bool {
        self.namespace.as_deref() == Some(ns) && self.local_name() == local
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Child elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Concatenated text and CDATA content of this element, trimmed.
    pub fn text(&self) -> String {
        let mut text = String::new();
        for node in &self.children {
            match node {
                XmlNode::Text(value) | XmlNode::CData(value) => text.push_str(value),
                _ => {}
            }
        }
        text.trim().to_string()
    }

    /// Namespace declarations on this element as `(prefix, uri)`.
    ///
    /// The default namespace is reported with an empty prefix.
    pub fn namespace_declarations(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().filter_map(|(key, value)| {
            if key == "xmlns" {
                Some(("", value.as_str()))
            } else {
                key.strip_prefix("xmlns:")
                    .map(|prefix| (prefix, value.as_str()))
            }
        })
    }
}
