//! Two-phase modeler API
//!
//! A [`Modeler`] holds one imported document at a time. `import_xml`
//! parses it and computes diagram interchange where the document has none;
//! `save_xml` writes it back with that interchange included.

use tracing::{info, warn};

use crate::export::{BPMNExporter, ExportError, SaveOptions};
use crate::import::{BPMNImporter, ImportError, ImportOutcome};
use crate::layout::{LayoutConfig, LayoutEngine};
use crate::models::di::DiDiagram;
use crate::xml::XmlDocument;

/// BPMN modeler
#[derive(Debug, Default)]
pub struct Modeler {
    engine: LayoutEngine,
    document: Option<XmlDocument>,
    diagrams: Vec<DiDiagram>,
}

impl Modeler {
    /// Create a modeler with the default layout metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a modeler with custom layout metrics
    pub fn with_config(config: LayoutConfig) -> Self {
        Self {
            engine: LayoutEngine::new(config),
            ..Default::default()
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        self.engine.config()
    }

    /// Diagrams computed by the last import. Empty when the document
    /// brought its own interchange.
    pub fn diagrams(&self) -> &[DiDiagram] {
        &self.diagrams
    }

    /// Import BPMN XML, replacing any previously imported document.
    ///
    /// On error the previous document is kept.
    pub fn import_xml(&mut self, xml: &str) -> Result<ImportOutcome, ImportError> {
        let mut importer = BPMNImporter::new();
        let (document, definitions) = importer.import(xml)?;

        for warning in &importer.warnings {
            warn!("{}", warning);
        }

        let diagrams = if definitions.has_diagram {
            info!("document has diagram interchange; keeping it");
            Vec::new()
        } else {
            self.engine.layout(&definitions)
        };

        let outcome = ImportOutcome {
            warnings: importer.warnings,
            diagrams_created: diagrams.len(),
            existing_di_kept: definitions.has_diagram,
        };
        self.document = Some(document);
        self.diagrams = diagrams;
        Ok(outcome)
    }

    /// Serialize the imported document with its diagram interchange.
    pub fn save_xml(&self, options: &SaveOptions) -> Result<String, ExportError> {
        let document = self.document.as_ref().ok_or(ExportError::NoDocument)?;
        BPMNExporter::new().export(document, &self.diagrams, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::ImportWarning;

    const SIMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<bpmn:definitions xmlns:bpmn="http://www.omg.org/spec/BPMN/20100524/MODEL" id="Definitions_1">
  <bpmn:process id="P">
    <bpmn:startEvent id="S"/>
    <bpmn:task id="T" name="Work"/>
    <bpmn:sequenceFlow id="F" sourceRef="S" targetRef="T"/>
  </bpmn:process>
</bpmn:definitions>
"#;

    #[test]
    fn test_save_before_import_fails() {
        let modeler = Modeler::new();
        assert!(matches!(
            modeler.save_xml(&SaveOptions::default()),
            Err(ExportError::NoDocument)
        ));
    }

    #[test]
    fn test_import_computes_layout() {
        let mut modeler = Modeler::new();
        let outcome = modeler.import_xml(SIMPLE).unwrap();
        assert!(outcome.warnings.is_empty());
        assert_eq!(outcome.diagrams_created, 1);
        assert!(!outcome.existing_di_kept);

        let diagram = &modeler.diagrams()[0];
        assert_eq!(diagram.plane_element, "P");
        assert!(diagram.shape("S").is_some());
        assert!(diagram.shape("T").is_some());
        assert!(diagram.edge("F").is_some());
    }

    #[test]
    fn test_failed_import_keeps_previous_document() {
        let mut modeler = Modeler::new();
        let _ = modeler.import_xml(SIMPLE).unwrap();
        let before = modeler.save_xml(&SaveOptions { format: true }).unwrap();

        assert!(matches!(
            modeler.import_xml("<bpmn:definitions"),
            Err(ImportError::ParseError(_))
        ));
        assert_eq!(modeler.save_xml(&SaveOptions { format: true }).unwrap(), before);
    }

    #[test]
    fn test_existing_di_is_kept() {
        let mut modeler = Modeler::new();
        let _ = modeler.import_xml(SIMPLE).unwrap();
        let first = modeler.save_xml(&SaveOptions { format: true }).unwrap();

        let outcome = modeler.import_xml(&first).unwrap();
        assert!(outcome.existing_di_kept);
        assert_eq!(outcome.diagrams_created, 0);
        assert!(modeler.diagrams().is_empty());
        assert_eq!(modeler.save_xml(&SaveOptions { format: true }).unwrap(), first);
    }

    #[test]
    fn test_warnings_are_reported() {
        let xml = r#"<definitions xmlns="http://www.omg.org/spec/BPMN/20100524/MODEL">
  <process id="P">
    <task id="T"/>
    <sequenceFlow id="F" sourceRef="T" targetRef="Missing"/>
  </process>
</definitions>"#;
        let mut modeler = Modeler::new();
        let outcome = modeler.import_xml(xml).unwrap();
        assert!(outcome.warnings.iter().any(|warning| matches!(
            warning,
            ImportWarning::UnresolvedReference { reference, .. } if reference == "Missing"
        )));
        assert!(modeler.diagrams()[0].edge("F").is_none());
    }
}
