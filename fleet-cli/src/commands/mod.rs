//! Command orchestration for CLI subcommands.
//!
//! - `check` - reconcile a registry snapshot against an inventory
//! - `snapshot` - regenerate a registry snapshot from device-table output

pub mod check;
pub mod snapshot;

pub use check::{execute_check, CheckResult};
pub use snapshot::{execute_snapshot, SnapshotResult};

use fleet_fs::FsError;
use fleet_reconciler::ConfigError;
use thiserror::Error;

use crate::cli::CliError;
use crate::io::{InputError, OutputWriterError};

/// Errors from command execution.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("invalid argument: {0}")]
    InvalidArgument(#[from] CliError),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] FsError),

    #[error("{0}")]
    Input(#[from] InputError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("output error: {0}")]
    Output(#[from] OutputWriterError),

    #[error("device table command failed: {0}")]
    SnapshotCommand(String),

    #[error("device table {0} has no server rows")]
    EmptyTable(String),
}

/// Result of command execution.
pub type CommandResult<T> = Result<T, CommandError>;
