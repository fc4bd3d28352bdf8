//! XML tree reader built on quick-xml's namespace-resolving reader

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;
use thiserror::Error;

use super::{XmlDocument, XmlElement, XmlNode};

/// Reasons a document is rejected as not well-formed.
#[derive(Debug, Error)]
pub enum XmlParseError {
    #[error("malformed XML at byte {position}: {message}")]
    Malformed { position: u64, message: String },

    #[error("invalid attribute: {0}")]
    Attribute(String),

    #[error("unbound namespace prefix '{0}'")]
    UnboundPrefix(String),

    #[error("unexpected end tag </{0}>")]
    UnexpectedEnd(String),

    #[error("unclosed element <{0}> at end of input")]
    Unclosed(String),

    #[error("more than one root element (found <{0}>)")]
    MultipleRoots(String),

    #[error("text content outside the root element")]
    TextOutsideRoot,

    #[error("document has no root element")]
    NoRoot,
}

/// Parse XML text into a document tree.
///
/// Whitespace-only text is dropped. All other content, including comments
/// and processing instructions, is kept in document order.
pub fn parse_document(xml: &str) -> Result<XmlDocument, XmlParseError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut builder = TreeBuilder::default();

    loop {
        let (namespace, event) = match reader.read_resolved_event() {
            Ok((resolved, event)) => (resolve_namespace(resolved)?, event),
            Err(e) => {
                return Err(XmlParseError::Malformed {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                });
            }
        };

        match event {
            Event::Start(start) => {
                let element = element_from(&start, namespace)?;
                builder.open.push(element);
            }
            Event::Empty(start) => {
                let element = element_from(&start, namespace)?;
                builder.close(element)?;
            }
            Event::End(end) => {
                let element = builder.open.pop().ok_or_else(|| {
                    XmlParseError::UnexpectedEnd(String::from_utf8_lossy(end.name().as_ref()).into_owned())
                })?;
                builder.close(element)?;
            }
            Event::Text(text) => {
                let value = text.unescape().map_err(|e| XmlParseError::Malformed {
                    position: reader.buffer_position() as u64,
                    message: e.to_string(),
                })?;
                if !value.trim().is_empty() {
                    builder.content(XmlNode::Text(value.into_owned()))?;
                }
            }
            Event::CData(cdata) => {
                builder.content(XmlNode::CData(
                    String::from_utf8_lossy(&cdata).into_owned(),
                ))?;
            }
            Event::Comment(comment) => {
                builder.markup(XmlNode::Comment(
                    String::from_utf8_lossy(&comment).into_owned(),
                ));
            }
            Event::PI(pi) => {
                builder.markup(XmlNode::ProcessingInstruction(
                    String::from_utf8_lossy(&pi).into_owned(),
                ));
            }
            Event::DocType(doctype) => {
                builder.markup(XmlNode::DocType(
                    String::from_utf8_lossy(&doctype).trim().to_string(),
                ));
            }
            Event::Eof => break,
            // The XML declaration is regenerated on write
            _ => {}
        }
    }

    builder.finish()
}

fn resolve_namespace(resolved: ResolveResult<'_>) -> Result<Option<String>, XmlParseError> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(String::from_utf8_lossy(ns.as_ref()).into_owned())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(XmlParseError::UnboundPrefix(
            String::from_utf8_lossy(&prefix).into_owned(),
        )),
    }
}

fn element_from(
    start: &BytesStart<'_>,
    namespace: Option<String>,
) -> Result<XmlElement, XmlParseError> {
    let mut element = XmlElement {
        qname: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
        namespace,
        attributes: Vec::new(),
        children: Vec::new(),
    };

    for attr in start.attributes() {
        let attr = attr.map_err(|e| XmlParseError::Attribute(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| XmlParseError::Attribute(format!("{}: {}", key, e)))?
            .into_owned();
        element.attributes.push((key, value));
    }

    Ok(element)
}

#[derive(Default)]
struct TreeBuilder {
    prolog: Vec<XmlNode>,
    epilog: Vec<XmlNode>,
    open: Vec<XmlElement>,
    root: Option<XmlElement>,
}

impl TreeBuilder {
    /// Attach a finished element to its parent, or make it the root.
    fn close(&mut self, element: XmlElement) -> Result<(), XmlParseError> {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(XmlNode::Element(element));
            return Ok(());
        }
        if self.root.is_some() {
            return Err(XmlParseError::MultipleRoots(element.qname));
        }
        self.root = Some(element);
        Ok(())
    }

    /// Text or CDATA, only valid inside an element.
    fn content(&mut self, node: XmlNode) -> Result<(), XmlParseError> {
        match self.open.last_mut() {
            Some(parent) => {
                parent.children.push(node);
                Ok(())
            }
            None => Err(XmlParseError::TextOutsideRoot),
        }
    }

    /// Comments, processing instructions and doctype, valid anywhere.
    fn markup(&mut self, node: XmlNode) {
        if let Some(parent) = self.open.last_mut() {
            parent.children.push(node);
        } else if self.root.is_none() {
            self.prolog.push(node);
        } else {
            self.epilog.push(node);
        }
    }

    fn finish(mut self) -> Result<XmlDocument, XmlParseError> {
        if let Some(unclosed) = self.open.pop() {
            return Err(XmlParseError::Unclosed(unclosed.qname));
        }
        let root = self.root.ok_or(XmlParseError::NoRoot)?;
        Ok(XmlDocument {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}
