//! fleetcheck binary.
//!
//! Entry point for the `fleetcheck` command-line tool.

use std::process::ExitCode;

use clap::Parser;
use fleet_cli::exit::{codes, exit_code};
use fleet_cli::{
    execute_check, execute_snapshot, init_tracing, CheckArgs, Cli, Command, CommandError,
    SnapshotArgs, TracingLogger, Verbosity,
};
use fleet_fs::RealFilesystem;
use fleet_reconciler::SystemClock;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here, on stdout.
            let _ = e.print();
            let code = if e.use_stderr() {
                codes::INVALID_ARGS
            } else {
                codes::SUCCESS
            };
            return ExitCode::from(code as u8);
        }
    };
    init_tracing(Verbosity::from_count(cli.verbose));

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Snapshot(args) => run_snapshot(args),
    };

    match result {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::from(exit_code(&e) as u8)
        }
    }
}

/// Run the check command.
fn run_check(args: CheckArgs) -> Result<i32, CommandError> {
    let result = execute_check(&args, &RealFilesystem, &SystemClock, &TracingLogger)?;

    print!("{}", result.console);

    if result.should_fail() {
        Ok(codes::DRIFT_DETECTED)
    } else {
        Ok(codes::SUCCESS)
    }
}

/// Run the snapshot command.
fn run_snapshot(args: SnapshotArgs) -> Result<i32, CommandError> {
    let stdin = std::io::stdin();
    let result = execute_snapshot(&args, &RealFilesystem, stdin.lock(), &TracingLogger)?;

    println!(
        "Snapshot written: {} ({} records, {} servers)",
        result.out_path.display(),
        result.records,
        result.servers
    );
    Ok(codes::SUCCESS)
}
