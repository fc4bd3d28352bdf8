//! BPMN (Business Process Model and Notation) model structures
//!
//! The semantic part of a BPMN 2.0 document that layout needs: containers,
//! flow nodes and the flows between them. Everything else stays in the XML
//! tree untouched.

use serde::{Deserialize, Serialize};

/// BPMN 2.0 model namespace
pub const BPMN_MODEL_NS: &str = "http://www.omg.org/spec/BPMN/20100524/MODEL";
/// BPMN 2.0 diagram interchange namespace
pub const BPMN_DI_NS: &str = "http://www.omg.org/spec/BPMN/20100524/DI";
/// OMG Diagram Common namespace (bounds)
pub const DC_NS: &str = "http://www.omg.org/spec/DD/20100524/DC";
/// OMG Diagram Interchange namespace (waypoints)
pub const DI_NS: &str = "http://www.omg.org/spec/DD/20100524/DI";

/// Flow node categories, each with its own default shape size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlowNodeKind {
    /// Any task variant or call activity
    Task,
    SubProcess,
    StartEvent,
    EndEvent,
    IntermediateEvent,
    BoundaryEvent,
    Gateway,
}

impl FlowNodeKind {
    /// Classify a BPMN element local name.
    ///
    /// Returns `None` for elements that are not flow nodes.
    pub fn from_local_name(local_name: &str) -> Option<Self> {
        let kind = match local_name {
            "task" | "userTask" | "serviceTask" | "sendTask" | "receiveTask" | "manualTask"
            | "businessRuleTask" | "scriptTask" | "callActivity" => FlowNodeKind::Task,
            "subProcess" | "transaction" | "adHocSubProcess" => FlowNodeKind::SubProcess,
            "startEvent" => FlowNodeKind::StartEvent,
            "endEvent" => FlowNodeKind::EndEvent,
            "intermediateCatchEvent" | "intermediateThrowEvent" => FlowNodeKind::IntermediateEvent,
            "boundaryEvent" => FlowNodeKind::BoundaryEvent,
            "exclusiveGateway" | "parallelGateway" | "inclusiveGateway" | "eventBasedGateway"
            | "complexGateway" => FlowNodeKind::Gateway,
            _ => return None,
        };
        Some(kind)
    }

    /// Default `(width, height)` of the shape.
    pub fn size(self) -> (i32, i32) {
        match self {
            FlowNodeKind::Task | FlowNodeKind::SubProcess => (100, 80),
            FlowNodeKind::StartEvent
            | FlowNodeKind::EndEvent
            | FlowNodeKind::IntermediateEvent
            | FlowNodeKind::BoundaryEvent => (36, 36),
            FlowNodeKind::Gateway => (50, 50),
        }
    }

    pub fn is_event(self) -> bool {
        matches!(
            self,
            FlowNodeKind::StartEvent
                | FlowNodeKind::EndEvent
                | FlowNodeKind::IntermediateEvent
                | FlowNodeKind::BoundaryEvent
        )
    }

    pub fn is_activity(self) -> bool {
        matches!(self, FlowNodeKind::Task | FlowNodeKind::SubProcess)
    }

    /// Events and gateways carry their name in an external label.
    pub fn has_external_label(self) -> bool {
        self.is_event() || self == FlowNodeKind::Gateway
    }
}

/// Local names of sequence-flow elements and artifacts that are recognised
/// but not laid out.
pub const UNSUPPORTED_FLOW_ELEMENTS: &[&str] = &[
    "dataObject",
    "dataObjectReference",
    "dataStoreReference",
    "textAnnotation",
    "association",
    "group",
];

/// A flow node inside a process or sub-process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowNode {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: FlowNodeKind,
    /// Host activity of a boundary event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attached_to: Option<String>,
    /// Contents of a sub-process
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Box<FlowContainer>>,
}

/// A sequence flow between two flow nodes of the same container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SequenceFlow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source_ref: String,
    pub target_ref: String,
}

/// A lane of a process' top-level lane set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lane {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub flow_node_refs: Vec<String>,
}

/// Anything that owns flow nodes: a process or a sub-process.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlowContainer {
    pub id: String,
    pub flow_nodes: Vec<FlowNode>,
    pub sequence_flows: Vec<SequenceFlow>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lanes: Vec<Lane>,
}

impl FlowContainer {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn node(&self, id: &str) -> Option<&FlowNode> {
        self.flow_nodes.iter().find(|node| node.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.flow_nodes.is_empty()
    }
}

/// A pool in a collaboration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub process_ref: Option<String>,
}

/// A message flow between pools or their contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageFlow {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub source_ref: String,
    pub target_ref: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaboration {
    pub id: String,
    pub participants: Vec<Participant>,
    pub message_flows: Vec<MessageFlow>,
}

/// The `<definitions>` root of a BPMN document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Definitions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub collaborations: Vec<Collaboration>,
    pub processes: Vec<FlowContainer>,
    /// True when the document already carries a `BPMNDiagram`
    pub has_diagram: bool,
}

impl Definitions {
    pub fn process(&self, id: &str) -> Option<&FlowContainer> {
        self.processes.iter().find(|process| process.id == id)
    }
}
