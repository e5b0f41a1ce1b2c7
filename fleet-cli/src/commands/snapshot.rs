//! Snapshot command orchestration.
//!
//! Turns device-inventory display output into a registry snapshot file in the
//! default comma-separated layout.

use std::io::Read;
use std::path::PathBuf;
use std::process::Command;

use fleet_fs::{Filesystem, FsError};
use fleet_reconciler::registry::{parse_device_table, render_registry_csv, RegistrySnapshot};

use crate::cli::{SnapshotArgs, SnapshotSource};
use crate::logger::Logger;

use super::{CommandError, CommandResult};

/// Result of snapshot command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotResult {
    pub out_path: PathBuf,
    /// Rows written, one per (server, cell).
    pub records: usize,
    /// Unique servers among them.
    pub servers: usize,
}

/// Run a shell command and return its standard output.
fn run_table_command(command: &str) -> CommandResult<String> {
    let output = Command::new("sh")
        .arg("-c")
        .arg(command)
        .output()
        .map_err(|e| CommandError::SnapshotCommand(format!("failed to start '{command}': {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(CommandError::SnapshotCommand(format!(
            "'{command}' exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

fn read_table<F: Filesystem, R: Read>(
    source: &SnapshotSource,
    fs: &F,
    mut stdin: R,
) -> CommandResult<String> {
    match source {
        SnapshotSource::File(path) => Ok(fs.read_file(path)?),
        SnapshotSource::Stdin => {
            let mut text = String::new();
            stdin.read_to_string(&mut text).map_err(FsError::Io)?;
            Ok(text)
        }
        SnapshotSource::Command(command) => run_table_command(command),
    }
}

fn describe(source: &SnapshotSource) -> String {
    match source {
        SnapshotSource::File(path) => path.display().to_string(),
        SnapshotSource::Stdin => "<stdin>".to_string(),
        SnapshotSource::Command(command) => format!("output of '{command}'"),
    }
}

/// Execute the snapshot command.
///
/// `stdin` is only read when the table source is `-`.
pub fn execute_snapshot<F, R>(
    args: &SnapshotArgs,
    fs: &F,
    stdin: R,
    logger: &dyn Logger,
) -> CommandResult<SnapshotResult>
where
    F: Filesystem,
    R: Read,
{
    args.validate()?;

    let source = args.source();
    logger.verbose(&format!("reading device table from {}", describe(&source)));
    let text = read_table(&source, fs, stdin)?;

    let records = parse_device_table(&text);
    if records.is_empty() {
        return Err(CommandError::EmptyTable(describe(&source)));
    }
    let servers = RegistrySnapshot::from_records(records.iter().cloned()).len();

    fs.write_atomic(&args.out, render_registry_csv(&records).as_bytes())?;
    logger.info(&format!(
        "wrote {} records for {} servers to {}",
        records.len(),
        servers,
        args.out.display()
    ));

    Ok(SnapshotResult {
        out_path: args.out.clone(),
        records: records.len(),
        servers,
    })
}
