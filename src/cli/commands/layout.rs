//! Layout command implementation

use crate::cli::error::CliError;
use crate::export::SaveOptions;
use crate::modeler::Modeler;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Arguments for the layout command
#[derive(Debug, Clone)]
pub struct LayoutArgs {
    pub input: PathBuf,
    pub output: PathBuf,
}

/// Handle the layout command: read, import, save, write.
pub fn handle_layout(args: &LayoutArgs) -> Result<(), CliError> {
    let content = std::fs::read_to_string(&args.input)
        .map_err(|e| CliError::FileReadError(args.input.clone(), e.to_string()))?;

    let mut modeler = Modeler::new();
    let outcome = modeler.import_xml(&content)?;
    info!(
        warnings = outcome.warnings.len(),
        diagrams = outcome.diagrams_created,
        existing_di_kept = outcome.existing_di_kept,
        "imported {}",
        args.input.display()
    );

    // Serialized output is checked for well-formedness by the exporter
    let xml = modeler.save_xml(&SaveOptions { format: true })?;

    write_output(&args.output, &xml)?;
    info!("wrote {}", args.output.display());
    Ok(())
}

/// Write `content` to `output_path` through a temporary file in the same
/// directory, so the destination is either untouched or complete.
pub fn write_output(output_path: &Path, content: &str) -> Result<(), CliError> {
    let write_error = |e: &dyn std::fmt::Display| {
        CliError::FileWriteError(output_path.to_path_buf(), e.to_string())
    };

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| write_error(&e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| write_error(&e))?;
    file.as_file().sync_all().map_err(|e| write_error(&e))?;
    file.persist(output_path).map_err(|e| write_error(&e.error))?;
    Ok(())
}
