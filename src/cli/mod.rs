//! Command-line interface

pub mod commands;
pub mod error;

pub use error::CliError;
