//! Export functionality
//!
//! Writes an imported BPMN document back to XML together with its diagram
//! interchange.

pub mod bpmn;

pub use bpmn::BPMNExporter;

/// Options for saving a document
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SaveOptions {
    /// Pretty-print with two-space indentation
    pub format: bool,
}

/// Error during export
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ExportError {
    #[error("no document has been imported")]
    NoDocument,
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
}
