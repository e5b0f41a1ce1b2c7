//! fleetcheck CLI.
//!
//! Argument parsing, validation, input loading, output writing and exit-code
//! mapping for the `fleetcheck` binary. The reconciliation itself lives in
//! `fleet-reconciler`.

pub mod cli;
pub mod commands;
pub mod exit;
pub mod io;
pub mod logger;

pub use cli::{parse_from, CheckArgs, Cli, CliError, Command, OutputFormat, SnapshotArgs, SnapshotSource};
pub use commands::{
    execute_check, execute_snapshot, CheckResult, CommandError, CommandResult, SnapshotResult,
};
pub use logger::{init_tracing, Logger, MockLogger, NullLogger, TracingLogger, Verbosity};
