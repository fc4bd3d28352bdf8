//! BPMN importer
//!
//! Provides functionality to import BPMN 2.0 XML into a document tree and
//! the semantic model used for layout.

use std::collections::HashSet;

use tracing::debug;

use crate::import::{ImportError, ImportWarning};
use crate::models::bpmn::{
    BPMN_DI_NS, BPMN_MODEL_NS, Collaboration, Definitions, FlowContainer, FlowNode, FlowNodeKind,
    Lane, MessageFlow, Participant, SequenceFlow, UNSUPPORTED_FLOW_ELEMENTS,
};
use crate::xml::{XmlDocument, XmlElement, parse_document};

/// BPMN Importer
///
/// Imports BPMN 2.0 XML content, collecting warnings for references and
/// elements it cannot use.
#[derive(Debug, Default)]
pub struct BPMNImporter {
    /// Warnings encountered during extraction
    pub warnings: Vec<ImportWarning>,
    seen_ids: HashSet<String>,
}

impl BPMNImporter {
    /// Create a new BPMNImporter
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that the document root is a BPMN `definitions` element.
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed XML document.
    pub fn validate(&self, document: &XmlDocument) -> Result<(), ImportError> {
        let root = &document.root;
        if root.is(BPMN_MODEL_NS, "definitions") {
            return Ok(());
        }
        Err(ImportError::NotDefinitions(format!(
            "root element <{}> in namespace {}",
            root.qname,
            root.namespace.as_deref().unwrap_or("(none)")
        )))
    }

    /// Import BPMN XML content.
    ///
    /// # Arguments
    ///
    /// * `xml_content` - The BPMN XML content as a string.
    ///
    /// # Returns
    ///
    /// The parsed document tree and its semantic model, or an error if the
    /// text is not well-formed or not a BPMN document.
    pub fn import(&mut self, xml_content: &str) -> Result<(XmlDocument, Definitions), ImportError> {
        let document =
            parse_document(xml_content).map_err(|e| ImportError::ParseError(e.to_string()))?;
        self.validate(&document)?;
        let definitions = self.extract(&document);
        Ok((document, definitions))
    }

    /// Extract the semantic model from a validated document.
    pub fn extract(&mut self, document: &XmlDocument) -> Definitions {
        let root = &document.root;
        let mut definitions = Definitions {
            id: root.attr("id").map(str::to_string),
            ..Default::default()
        };

        for child in root.elements() {
            if child.is(BPMN_DI_NS, "BPMNDiagram") {
                definitions.has_diagram = true;
                continue;
            }
            if child.namespace.as_deref() != Some(BPMN_MODEL_NS) {
                continue;
            }
            match child.local_name() {
                "process" => {
                    if let Some(id) = self.claim_id(child) {
                        definitions.processes.push(self.read_container(child, id));
                    }
                }
                "collaboration" => {
                    if let Some(id) = self.claim_id(child) {
                        definitions
                            .collaborations
                            .push(self.read_collaboration(child, id));
                    }
                }
                _ => {}
            }
        }

        self.resolve_collaborations(&mut definitions);

        debug!(
            "Extracted {} process(es) and {} collaboration(s) with {} warning(s)",
            definitions.processes.len(),
            definitions.collaborations.len(),
            self.warnings.len()
        );

        definitions
    }

    /// Record an element id, warning on missing or duplicate ids.
    fn claim_id(&mut self, element: &XmlElement) -> Option<String> {
        let Some(id) = element.attr("id") else {
            self.warnings
                .push(ImportWarning::MissingId(element.local_name().to_string()));
            return None;
        };
        if !self.seen_ids.insert(id.to_string()) {
            self.warnings.push(ImportWarning::DuplicateId(id.to_string()));
            return None;
        }
        Some(id.to_string())
    }

    fn read_container(&mut self, element: &XmlElement, id: String) -> FlowContainer {
        let mut container = FlowContainer::new(id);

        for child in element.elements() {
            if child.namespace.as_deref() != Some(BPMN_MODEL_NS) {
                continue;
            }
            let local_name = child.local_name();

            if let Some(kind) = FlowNodeKind::from_local_name(local_name) {
                let Some(node_id) = self.claim_id(child) else {
                    continue;
                };
                let children = if kind == FlowNodeKind::SubProcess {
                    Some(Box::new(self.read_container(child, node_id.clone())))
                } else {
                    None
                };
                container.flow_nodes.push(FlowNode {
                    id: node_id,
                    name: name_of(child),
                    kind,
                    attached_to: child.attr("attachedToRef").map(str::to_string),
                    children,
                });
            } else if local_name == "sequenceFlow" {
                if let Some(flow_id) = self.claim_id(child) {
                    container.sequence_flows.push(SequenceFlow {
                        id: flow_id,
                        name: name_of(child),
                        source_ref: child.attr("sourceRef").unwrap_or_default().to_string(),
                        target_ref: child.attr("targetRef").unwrap_or_default().to_string(),
                    });
                }
            } else if local_name == "laneSet" && container.lanes.is_empty() {
                container.lanes = self.read_lanes(child);
            } else if UNSUPPORTED_FLOW_ELEMENTS.contains(&local_name) {
                self.warnings.push(ImportWarning::UnsupportedElement {
                    element: child.attr("id").unwrap_or_default().to_string(),
                    kind: local_name.to_string(),
                });
            }
        }

        self.resolve_container(&mut container);
        container
    }

    fn read_lanes(&mut self, lane_set: &XmlElement) -> Vec<Lane> {
        let mut lanes = Vec::new();
        for lane in lane_set.elements().filter(|e| e.is(BPMN_MODEL_NS, "lane")) {
            let Some(id) = self.claim_id(lane) else {
                continue;
            };
            let flow_node_refs = lane
                .elements()
                .filter(|e| e.is(BPMN_MODEL_NS, "flowNodeRef"))
                .map(XmlElement::text)
                .filter(|text| !text.is_empty())
                .collect();
            lanes.push(Lane {
                id,
                name: name_of(lane),
                flow_node_refs,
            });
        }
        lanes
    }

    /// Drop references that do not resolve inside the container.
    fn resolve_container(&mut self, container: &mut FlowContainer) {
        let node_ids: HashSet<String> = container
            .flow_nodes
            .iter()
            .map(|node| node.id.clone())
            .collect();

        let mut flows = std::mem::take(&mut container.sequence_flows);
        flows.retain(|flow| {
            for reference in [&flow.source_ref, &flow.target_ref] {
                if !node_ids.contains(reference) {
                    self.warnings.push(ImportWarning::UnresolvedReference {
                        element: flow.id.clone(),
                        reference: reference.clone(),
                    });
                    return false;
                }
            }
            true
        });
        container.sequence_flows = flows;

        let activity_ids: HashSet<String> = container
            .flow_nodes
            .iter()
            .filter(|node| node.kind.is_activity())
            .map(|node| node.id.clone())
            .collect();
        for node in &mut container.flow_nodes {
            if node.kind != FlowNodeKind::BoundaryEvent {
                node.attached_to = None;
                continue;
            }
            let host = node.attached_to.clone().unwrap_or_default();
            if !activity_ids.contains(&host) {
                self.warnings.push(ImportWarning::InvalidAttachment {
                    event: node.id.clone(),
                    host,
                });
                node.attached_to = None;
            }
        }

        for lane in &mut container.lanes {
            let refs = std::mem::take(&mut lane.flow_node_refs);
            for reference in refs {
                if node_ids.contains(&reference) {
                    lane.flow_node_refs.push(reference);
                } else {
                    self.warnings.push(ImportWarning::UnresolvedReference {
                        element: lane.id.clone(),
                        reference,
                    });
                }
            }
        }
    }

    fn read_collaboration(&mut self, element: &XmlElement, id: String) -> Collaboration {
        let mut collaboration = Collaboration {
            id,
            participants: Vec::new(),
            message_flows: Vec::new(),
        };

        for child in element.elements() {
            if child.namespace.as_deref() != Some(BPMN_MODEL_NS) {
                continue;
            }
            match child.local_name() {
                "participant" => {
                    if let Some(participant_id) = self.claim_id(child) {
                        collaboration.participants.push(Participant {
                            id: participant_id,
                            name: name_of(child),
                            process_ref: child.attr("processRef").map(str::to_string),
                        });
                    }
                }
                "messageFlow" => {
                    if let Some(flow_id) = self.claim_id(child) {
                        collaboration.message_flows.push(MessageFlow {
                            id: flow_id,
                            name: name_of(child),
                            source_ref: child.attr("sourceRef").unwrap_or_default().to_string(),
                            target_ref: child.attr("targetRef").unwrap_or_default().to_string(),
                        });
                    }
                }
                local_name if UNSUPPORTED_FLOW_ELEMENTS.contains(&local_name) => {
                    self.warnings.push(ImportWarning::UnsupportedElement {
                        element: child.attr("id").unwrap_or_default().to_string(),
                        kind: local_name.to_string(),
                    });
                }
                _ => {}
            }
        }

        collaboration
    }

    /// Check participant process references and message flow endpoints.
    ///
    /// Message flows may connect pools or the top-level nodes of the
    /// processes those pools show.
    fn resolve_collaborations(&mut self, definitions: &mut Definitions) {
        let process_ids: HashSet<String> = definitions
            .processes
            .iter()
            .map(|process| process.id.clone())
            .collect();

        for collaboration in &mut definitions.collaborations {
            for participant in &mut collaboration.participants {
                if let Some(process) = &participant.process_ref {
                    if !process_ids.contains(process) {
                        self.warnings.push(ImportWarning::UnknownProcess {
                            participant: participant.id.clone(),
                            process: process.clone(),
                        });
                        participant.process_ref = None;
                    }
                }
            }

            let mut endpoints: HashSet<String> = HashSet::new();
            for participant in &collaboration.participants {
                endpoints.insert(participant.id.clone());
                let process = participant
                    .process_ref
                    .as_deref()
                    .and_then(|id| definitions.processes.iter().find(|p| p.id == id));
                if let Some(process) = process {
                    endpoints.extend(process.flow_nodes.iter().map(|node| node.id.clone()));
                }
            }

            let mut flows = std::mem::take(&mut collaboration.message_flows);
            flows.retain(|flow| {
                for reference in [&flow.source_ref, &flow.target_ref] {
                    if !endpoints.contains(reference) {
                        self.warnings.push(ImportWarning::UnresolvedReference {
                            element: flow.id.clone(),
                            reference: reference.clone(),
                        });
                        return false;
                    }
                }
                true
            });
            collaboration.message_flows = flows;
        }
    }
}

fn name_of(element: &XmlElement) -> Option<String> {
    element
        .attr("name")
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}
