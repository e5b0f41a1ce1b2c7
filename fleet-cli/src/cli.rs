//! CLI argument parsing for fleetcheck.
//!
//! Two subcommands:
//! - `check` - reconcile a registry snapshot against an inventory
//! - `snapshot` - convert device-table output into a registry snapshot

use std::path::{Path, PathBuf};

use clap::{ArgAction, ArgGroup, Parser, Subcommand, ValueEnum};
use thiserror::Error;

/// Path value meaning "read standard input".
pub const STDIN_PATH: &str = "-";

/// Errors from CLI argument validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("delimiter must not be alphanumeric, got '{0}'")]
    InvalidDelimiter(char),

    #[error("registry and inventory must be different files, both are {0}")]
    SameInput(PathBuf),

    #[error("--exec command must not be empty")]
    EmptyCommand,

    #[error("cannot write the snapshot over its own input {0}")]
    OutputIsInput(PathBuf),
}

/// Detect drift between a device registry snapshot and an inventory.
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "fleetcheck")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Reconcile a registry snapshot against an inventory.
    Check(CheckArgs),
    /// Build a registry snapshot from device-table output.
    Snapshot(SnapshotArgs),
}

/// Report formats.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OutputFormat {
    /// Plain-text report (report.txt).
    Text,
    /// HTML report (report.html).
    Html,
    /// Console table.
    Table,
    /// Machine-readable summary (summary.json).
    Json,
}

/// Arguments for the check command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct CheckArgs {
    /// Registry snapshot file (one server,cell,classification record per line).
    #[arg(short, long)]
    pub registry: PathBuf,

    /// Inventory YAML file.
    #[arg(short, long)]
    pub inventory: PathBuf,

    /// Optional YAML config overriding group names, patterns and the naming table.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Write reports to this directory instead of standard output.
    #[arg(short, long = "out-dir")]
    pub out_dir: Option<PathBuf>,

    /// Report formats to produce (comma-separated or repeated).
    /// Defaults to text,html,json with --out-dir and table otherwise.
    #[arg(short, long = "format", value_enum, value_delimiter = ',')]
    pub formats: Vec<OutputFormat>,

    /// Registry field delimiter, overriding the config.
    #[arg(short, long)]
    pub delimiter: Option<char>,

    /// Exit with a non-zero status when any discrepancy is found.
    #[arg(long)]
    pub fail_on_drift: bool,
}

impl CheckArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if let Some(delimiter) = self.delimiter {
            if delimiter.is_alphanumeric() {
                return Err(CliError::InvalidDelimiter(delimiter));
            }
        }
        if self.registry == self.inventory {
            return Err(CliError::SameInput(self.registry.clone()));
        }
        Ok(())
    }

    /// Requested formats, deduplicated, or the defaults for the output mode.
    pub fn effective_formats(&self) -> Vec<OutputFormat> {
        if self.formats.is_empty() {
            return match self.out_dir {
                Some(_) => vec![OutputFormat::Text, OutputFormat::Html, OutputFormat::Json],
                None => vec![OutputFormat::Table],
            };
        }
        let mut formats = self.formats.clone();
        formats.sort();
        formats.dedup();
        formats
    }
}

/// Where device-table text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotSource {
    File(PathBuf),
    Stdin,
    /// Shell command whose standard output is the table.
    Command(String),
}

/// Arguments for the snapshot command.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(group(ArgGroup::new("source").required(true).args(["table", "exec"])))]
pub struct SnapshotArgs {
    /// File holding device-table output, or `-` for standard input.
    #[arg(short, long)]
    pub table: Option<PathBuf>,

    /// Command that prints the device table.
    #[arg(short, long)]
    pub exec: Option<String>,

    /// Registry snapshot file to write.
    #[arg(short, long)]
    pub out: PathBuf,
}

impl SnapshotArgs {
    /// Validate the arguments.
    pub fn validate(&self) -> Result<(), CliError> {
        if let Some(command) = &self.exec {
            if command.trim().is_empty() {
                return Err(CliError::EmptyCommand);
            }
        }
        if self.table.as_deref() == Some(self.out.as_path()) {
            return Err(CliError::OutputIsInput(self.out.clone()));
        }
        Ok(())
    }

    pub fn source(&self) -> SnapshotSource {
        match (&self.table, &self.exec) {
            (_, Some(command)) => SnapshotSource::Command(command.clone()),
            (Some(path), None) if path == Path::new(STDIN_PATH) => SnapshotSource::Stdin,
            (Some(path), None) => SnapshotSource::File(path.clone()),
            (None, None) => SnapshotSource::Stdin,
        }
    }
}

/// Parse CLI arguments from an iterator (for testing).
pub fn parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
