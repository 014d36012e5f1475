//! Command-line interface for mspx
//!
//! Thin file-conversion wrapper around the codec: `export` turns a project
//! snapshot JSON file into an MSPDI document, `import` turns an MSPDI
//! document into flat record JSON. The codec itself stays I/O-free.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::domain::ProjectSnapshot;
use crate::mspdi;

#[derive(Parser)]
#[command(name = "mspx")]
#[command(author, version, about = "Gantt project data to MS Project XML and back")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Export a project snapshot (JSON) to an MSPDI XML document
    Export {
        /// Path to the project snapshot JSON file
        input: PathBuf,

        /// Output path (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Import an MSPDI XML document into flat project records (JSON)
    Import {
        /// Path to the MSPDI XML file
        input: PathBuf,

        /// Output path (defaults to stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// CLI entry point
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Export { input, output } => export(&input, output.as_deref()),
        Commands::Import { input, output } => import(&input, output.as_deref()),
    }
}

fn export(input: &Path, output: Option<&Path>) -> Result<()> {
    let json = fs::read_to_string(input)
        .with_context(|| format!("Failed to read snapshot: {}", input.display()))?;

    let snapshot: ProjectSnapshot = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse snapshot: {}", input.display()))?;

    let xml = mspdi::export_project(&snapshot).context("Failed to export project")?;
    write_output(output, &xml)
}

fn import(input: &Path, output: Option<&Path>) -> Result<()> {
    let xml = fs::read_to_string(input)
        .with_context(|| format!("Failed to read document: {}", input.display()))?;

    let project = mspdi::import_project(&xml)
        .with_context(|| format!("Failed to import document: {}", input.display()))?;

    let json = serde_json::to_string_pretty(&project).context("Failed to serialize result")?;
    write_output(output, &json)
}

fn write_output(output: Option<&Path>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, content)
                .with_context(|| format!("Failed to write output: {}", path.display()))?;
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
