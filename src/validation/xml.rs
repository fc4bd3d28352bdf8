//! XML validation utilities
//!
//! Well-formedness checks for serialized documents.

use anyhow::{Context, Result, bail};
use quick_xml::Reader;
use quick_xml::events::Event;

/// Check that `xml_content` is a well-formed XML document.
///
/// # Arguments
///
/// * `xml_content` - The XML content to validate
///
/// # Returns
///
/// A `Result` indicating whether validation succeeded.
///
/// # Note
///
/// This checks syntax and element nesting only. There is no schema check.
pub fn validate_well_formed(xml_content: &str) -> Result<()> {
    let mut reader = Reader::from_str(xml_content);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut roots = 0usize;
    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                return Err(anyhow::anyhow!(
                    "XML parsing error at position {}: {}",
                    reader.buffer_position(),
                    e
                ))
                .context("XML validation failed");
            }
        };
        match event {
            Event::Start(_) => {
                if depth == 0 {
                    roots += 1;
                }
                depth += 1;
            }
            Event::Empty(_) => {
                if depth == 0 {
                    roots += 1;
                }
            }
            Event::End(_) => depth = depth.saturating_sub(1),
            Event::Text(text) if depth == 0 => {
                if !text.iter().all(u8::is_ascii_whitespace) {
                    bail!("XML validation failed: text outside the root element");
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if depth != 0 {
        bail!("XML validation failed: {} unclosed element(s)", depth);
    }
    match roots {
        1 => Ok(()),
        0 => bail!("XML validation failed: no root element"),
        n => bail!("XML validation failed: {} root elements", n),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_well_formed_document() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<definitions id="d"><process id="P"/></definitions>
"#;
        assert!(validate_well_formed(xml).is_ok());
    }

    #[test]
    fn test_mismatched_end_tag() {
        let result = validate_well_formed("<a><b></a>");
        assert!(result.is_err());
    }

    #[test]
    fn test_unclosed_element() {
        let err = validate_well_formed("<a><b/>").unwrap_err();
        assert!(format!("{:#}", err).contains("XML validation failed"));
    }

    #[test]
    fn test_root_count() {
        assert!(validate_well_formed("").is_err());
        assert!(validate_well_formed("<a/><b/>").is_err());
    }
}
