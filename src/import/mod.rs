//! Import functionality
//!
//! Reads BPMN 2.0 XML into the document tree plus the semantic model the
//! layout engine works from.

pub mod bpmn;

pub use bpmn::BPMNImporter;

/// Result of a successful import.
///
/// Carries the non-fatal problems found while reading the document.
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
#[must_use = "import outcomes carry warnings that should be reported"]
pub struct ImportOutcome {
    /// Problems that did not stop the import
    pub warnings: Vec<ImportWarning>,
    /// Number of diagrams computed by the layout engine
    pub diagrams_created: usize,
    /// True when the document already had diagram interchange and it was kept
    pub existing_di_kept: bool,
}

/// Error during import. The document cannot be used.
#[derive(Debug, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ImportError {
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("failed to parse document as <bpmn:Definitions>: {0}")]
    NotDefinitions(String),
}

/// Non-fatal problem found during import.
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Serialize, serde::Deserialize)]
pub enum ImportWarning {
    #[error("duplicate ID <{0}>; later element ignored")]
    DuplicateId(String),

    #[error("<{0}> element without an id ignored")]
    MissingId(String),

    #[error("unresolved reference <{reference}> in <{element}>")]
    UnresolvedReference { element: String, reference: String },

    #[error("boundary event <{event}> is attached to <{host}>, which is not an activity in the same scope")]
    InvalidAttachment { event: String, host: String },

    #[error("participant <{participant}> references unknown process <{process}>")]
    UnknownProcess {
        participant: String,
        process: String,
    },

    #[error("<{kind}> element <{element}> is not laid out")]
    UnsupportedElement { element: String, kind: String },
}
