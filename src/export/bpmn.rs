//! BPMN exporter
//!
//! Appends `BPMNDiagram` elements to a document tree and serializes it.

use std::collections::HashSet;

use crate::export::{ExportError, SaveOptions};
use crate::models::bpmn::{BPMN_DI_NS, DC_NS, DI_NS};
use crate::models::di::{Bounds, DiDiagram, DiEdge, DiShape};
use crate::validation::xml::validate_well_formed;
use crate::xml::{XmlDocument, XmlElement, XmlNode, write_document};

/// Prefixes for the diagram namespaces, resolved against the document root.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DiPrefixes {
    bpmndi: String,
    dc: String,
    di: String,
}

/// BPMN Exporter
///
/// Serializes a document tree, adding the given diagrams.
#[derive(Debug, Default)]
pub struct BPMNExporter;

impl BPMNExporter {
    /// Create a new BPMNExporter
    pub fn new() -> Self {
        Self
    }

    /// Export a document with `diagrams` appended to its root.
    ///
    /// # Arguments
    ///
    /// * `document` - The imported document tree. It is not modified.
    /// * `diagrams` - Diagrams to add; may be empty.
    /// * `options` - Output formatting.
    ///
    /// # Returns
    ///
    /// The XML text, checked for well-formedness.
    pub fn export(
        &self,
        document: &XmlDocument,
        diagrams: &[DiDiagram],
        options: &SaveOptions,
    ) -> Result<String, ExportError> {
        let mut document = document.clone();

        if !diagrams.is_empty() {
            let diagrams = with_unique_ids(&document.root, diagrams);
            let prefixes = declare_prefixes(&mut document.root);
            for diagram in &diagrams {
                document
                    .root
                    .children
                    .push(XmlNode::Element(diagram_element(diagram, &prefixes)));
            }
        }

        let xml = write_document(&document, options.format)
            .map_err(ExportError::SerializationError)?;
        validate_well_formed(&xml).map_err(|e| ExportError::ValidationError(format!("{:#}", e)))?;
        Ok(xml)
    }
}

/// Copy `diagrams`, renaming DI ids that clash with ids already in the
/// document. A clash gets the first free `_N` suffix, counting from 2.
fn with_unique_ids(root: &XmlElement, diagrams: &[DiDiagram]) -> Vec<DiDiagram> {
    let mut taken = HashSet::new();
    collect_ids(root, &mut taken);

    let mut claim = |id: &mut String| {
        if taken.insert(id.clone()) {
            return;
        }
        let mut suffix = 2;
        loop {
            let candidate = format!("{}_{}", id, suffix);
            if taken.insert(candidate.clone()) {
                *id = candidate;
                return;
            }
            suffix += 1;
        }
    };

    diagrams
        .iter()
        .cloned()
        .map(|mut diagram| {
            claim(&mut diagram.id);
            claim(&mut diagram.plane_id);
            for shape in &mut diagram.shapes {
                claim(&mut shape.id);
            }
            for edge in &mut diagram.edges {
                claim(&mut edge.id);
            }
            diagram
        })
        .collect()
}

fn collect_ids(element: &XmlElement, ids: &mut HashSet<String>) {
    if let Some(id) = element.attr("id") {
        ids.insert(id.to_string());
    }
    for child in element.elements() {
        collect_ids(child, ids);
    }
}

/// Reuse prefixes the root already binds to the diagram namespaces and
/// declare the missing ones.
fn declare_prefixes(root: &mut XmlElement) -> DiPrefixes {
    DiPrefixes {
        bpmndi: declare_prefix(root, BPMN_DI_NS, "bpmndi"),
        dc: declare_prefix(root, DC_NS, "dc"),
        di: declare_prefix(root, DI_NS, "di"),
    }
}

fn declare_prefix(root: &mut XmlElement, uri: &str, preferred: &str) -> String {
    if let Some((prefix, _)) = root
        .namespace_declarations()
        .find(|(prefix, bound)| !prefix.is_empty() && *bound == uri)
    {
        return prefix.to_string();
    }

    let taken = |root: &XmlElement, prefix: &str| {
        root.namespace_declarations()
            .any(|(declared, _)| declared == prefix)
    };
    let mut prefix = preferred.to_string();
    let mut suffix = 1;
    while taken(root, &prefix) {
        prefix = format!("{}{}", preferred, suffix);
        suffix += 1;
    }
    root.set_attr(format!("xmlns:{}", prefix), uri);
    prefix
}

fn diagram_element(diagram: &DiDiagram, prefixes: &DiPrefixes) -> XmlElement {
    let mut plane = XmlElement::new(format!("{}:BPMNPlane", prefixes.bpmndi), Some(BPMN_DI_NS))
        .with_attr("id", &diagram.plane_id)
        .with_attr("bpmnElement", &diagram.plane_element);
    for shape in &diagram.shapes {
        plane.children.push(XmlNode::Element(shape_element(shape, prefixes)));
    }
    for edge in &diagram.edges {
        plane.children.push(XmlNode::Element(edge_element(edge, prefixes)));
    }

    XmlElement::new(format!("{}:BPMNDiagram", prefixes.bpmndi), Some(BPMN_DI_NS))
        .with_attr("id", &diagram.id)
        .with_child(plane)
}

fn shape_element(shape: &DiShape, prefixes: &DiPrefixes) -> XmlElement {
    let mut element = XmlElement::new(format!("{}:BPMNShape", prefixes.bpmndi), Some(BPMN_DI_NS))
        .with_attr("id", &shape.id)
        .with_attr("bpmnElement", &shape.element_ref);
    if let Some(horizontal) = shape.is_horizontal {
        element.set_attr("isHorizontal", horizontal);
    }
    if let Some(expanded) = shape.is_expanded {
        element.set_attr("isExpanded", expanded);
    }
    element = element.with_child(bounds_element(&shape.bounds, prefixes));
    if let Some(label) = &shape.label {
        element = element.with_child(label_element(label, prefixes));
    }
    element
}

fn edge_element(edge: &DiEdge, prefixes: &DiPrefixes) -> XmlElement {
    let mut element = XmlElement::new(format!("{}:BPMNEdge", prefixes.bpmndi), Some(BPMN_DI_NS))
        .with_attr("id", &edge.id)
        .with_attr("bpmnElement", &edge.element_ref);
    for point in &edge.waypoints {
        element = element.with_child(
            XmlElement::new(format!("{}:waypoint", prefixes.di), Some(DI_NS))
                .with_attr("x", point.x)
                .with_attr("y", point.y),
        );
    }
    if let Some(label) = &edge.label {
        element = element.with_child(label_element(label, prefixes));
    }
    element
}

fn bounds_element(bounds: &Bounds, prefixes: &DiPrefixes) -> XmlElement {
    XmlElement::new(format!("{}:Bounds", prefixes.dc), Some(DC_NS))
        .with_attr("x", bounds.x)
        .with_attr("y", bounds.y)
        .with_attr("width", bounds.width)
        .with_attr("height", bounds.height)
}

fn label_element(bounds: &Bounds, prefixes: &DiPrefixes) -> XmlElement {
    XmlElement::new(format!("{}:BPMNLabel", prefixes.bpmndi), Some(BPMN_DI_NS))
        .with_child(bounds_element(bounds, prefixes))
}
