//! XML tree writer

use quick_xml::Writer;
use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};

use super::{XmlDocument, XmlElement, XmlNode};

/// Serialize a document with an XML declaration.
///
/// With `format` set, nested elements are indented by two spaces; text-only
/// elements stay on one line.
pub fn write_document(document: &XmlDocument, format: bool) -> Result<String, String> {
    let mut writer = if format {
        Writer::new_with_indent(Vec::new(), b' ', 2)
    } else {
        Writer::new(Vec::new())
    };

    emit(
        &mut writer,
        Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
    )?;
    for node in &document.prolog {
        write_node(&mut writer, node)?;
    }
    write_element(&mut writer, &document.root)?;
    for node in &document.epilog {
        write_node(&mut writer, node)?;
    }

    let mut xml = String::from_utf8(writer.into_inner()).map_err(|e| e.to_string())?;
    xml.push('\n');
    Ok(xml)
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), String> {
    writer.write_event(event).map_err(|e| e.to_string())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), String> {
    match node {
        XmlNode::Element(element) => write_element(writer, element),
        XmlNode::Text(text) => emit(
            writer,
            Event::Text(BytesText::from_escaped(escape_text(text))),
        ),
        XmlNode::CData(text) => emit(writer, Event::CData(BytesCData::new(text.as_str()))),
        XmlNode::Comment(text) => emit(writer, Event::Comment(BytesText::from_escaped(text.as_str()))),
        XmlNode::ProcessingInstruction(text) => emit(writer, Event::PI(BytesPI::new(text.as_str()))),
        XmlNode::DocType(text) => emit(writer, Event::DocType(BytesText::from_escaped(text.as_str()))),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &XmlElement) -> Result<(), String> {
    let mut start = BytesStart::new(element.qname.as_str());
    for (key, value) in &element.attributes {
        let value = escape_attribute(value);
        start.push_attribute(Attribute::from((key.as_bytes(), value.as_bytes())));
    }

    if element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    emit(writer, Event::End(BytesEnd::new(element.qname.as_str())))
}

/// Parsers turn a literal tab or line break in an attribute into a space,
/// so those are written as character references.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\t', "&#9;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
}

/// A literal carriage return in text would be read back as a line feed.
fn escape_text(text: &str) -> String {
    escape(text).replace('\r', "&#13;")
}
