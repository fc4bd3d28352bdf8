//! Validation functionality
//!
//! Provides validation logic for:
//! - XML well-formedness of serialized output

pub mod xml;

pub use xml::validate_well_formed;
