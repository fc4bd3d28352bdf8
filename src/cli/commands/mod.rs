//! CLI command implementations

pub mod layout;
