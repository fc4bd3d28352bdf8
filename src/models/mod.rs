//! Models module
//!
//! Semantic BPMN structures extracted from a document and the diagram
//! interchange geometry computed for them.

pub mod bpmn;
pub mod di;

pub use bpmn::{
    BPMN_DI_NS, BPMN_MODEL_NS, Collaboration, DC_NS, DI_NS, Definitions, FlowContainer, FlowNode,
    FlowNodeKind, Lane, MessageFlow, Participant, SequenceFlow,
};
pub use di::{Bounds, DiDiagram, DiEdge, DiShape, Waypoint};
