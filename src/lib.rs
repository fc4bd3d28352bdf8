//! BPMN DI Layout - adds diagram interchange to BPMN 2.0 files
//!
//! Provides:
//! - A namespace-aware XML tree that round-trips unknown content
//! - BPMN import into a semantic model
//! - Grid layout with orthogonal edge routing
//! - Export of the document with `BPMNDiagram` sections added
//! - A two-phase [`Modeler`] API (`import_xml` / `save_xml`)

#[cfg(feature = "cli")]
pub mod cli;
pub mod export;
pub mod import;
pub mod layout;
pub mod modeler;
pub mod models;
pub mod validation;
pub mod xml;

// Re-export commonly used types
pub use export::{BPMNExporter, ExportError, SaveOptions};
pub use import::{BPMNImporter, ImportError, ImportOutcome, ImportWarning};
pub use layout::{ConfigError, LayoutConfig, LayoutEngine};
pub use modeler::Modeler;

// Re-export models
pub use models::bpmn::{Definitions, FlowContainer, FlowNode, FlowNodeKind};
pub use models::di::{Bounds, DiDiagram, DiEdge, DiShape, Waypoint};
