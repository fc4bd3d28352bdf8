//! CLI binary entry point for bpmn-layout

#[cfg(feature = "cli")]
use bpmn_di_layout::cli::CliError;
#[cfg(feature = "cli")]
use bpmn_di_layout::cli::commands::layout::{LayoutArgs, handle_layout};
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use clap::error::ErrorKind;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "bpmn-layout")]
#[command(about = "Add diagram layout to a BPMN 2.0 file")]
#[command(version)]
struct Cli {
    /// BPMN file to read
    input: PathBuf,
    /// File to write the laid-out BPMN to
    output: PathBuf,
}

#[cfg(feature = "cli")]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("{}", CliError::Usage(e.render().to_string().trim_end().to_string()));
            std::process::exit(1);
        }
    };

    let args = LayoutArgs {
        input: cli.input,
        output: cli.output,
    };

    if let Err(e) = handle_layout(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature is not enabled. Build with --features cli");
    std::process::exit(1);
}
