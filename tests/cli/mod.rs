//! CLI tests module

#[cfg(feature = "cli")]
pub mod binary_tests;
#[cfg(feature = "cli")]
pub mod layout_tests;
