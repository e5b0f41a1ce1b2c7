//! Exit codes for the fleetcheck CLI.

use crate::commands::CommandError;
use crate::io::InputError;

/// Exit code constants.
pub mod codes {
    /// Successful execution (and no drift, or drift without --fail-on-drift).
    pub const SUCCESS: i32 = 0;
    pub const INVALID_ARGS: i32 = 1;
    pub const IO_ERROR: i32 = 2;
    /// Inventory YAML could not be parsed.
    pub const INVENTORY_ERROR: i32 = 3;
    pub const CONFIG_ERROR: i32 = 4;
    /// Device table command failed or produced nothing.
    pub const SNAPSHOT_ERROR: i32 = 5;
    /// Registry snapshot held no valid records.
    pub const EMPTY_REGISTRY: i32 = 6;
    /// Discrepancies found and --fail-on-drift was given.
    pub const DRIFT_DETECTED: i32 = 10;
}

/// Map a CommandError to an exit code.
pub fn exit_code(error: &CommandError) -> i32 {
    match error {
        CommandError::InvalidArgument(_) => codes::INVALID_ARGS,
        CommandError::Filesystem(_) | CommandError::Output(_) => codes::IO_ERROR,
        CommandError::Input(InputError::Missing(_) | InputError::Read { .. }) => codes::IO_ERROR,
        CommandError::Input(InputError::Inventory { .. }) => codes::INVENTORY_ERROR,
        CommandError::Input(InputError::Config { .. }) | CommandError::Config(_) => {
            codes::CONFIG_ERROR
        }
        CommandError::Input(InputError::EmptyRegistry(_)) => codes::EMPTY_REGISTRY,
        CommandError::SnapshotCommand(_) | CommandError::EmptyTable(_) => codes::SNAPSHOT_ERROR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliError;
    use crate::io::OutputWriterError;
    use fleet_fs::FsError;
    use fleet_reconciler::ConfigError;
    use fleet_schema::InventoryError;
    use std::path::PathBuf;

    fn fs_error() -> FsError {
        FsError::Path("test".to_string())
    }

    #[test]
    fn test_exit_code_invalid_argument() {
        let error = CommandError::InvalidArgument(CliError::EmptyCommand);
        assert_eq!(exit_code(&error), codes::INVALID_ARGS);
    }

    #[test]
    fn test_exit_code_io() {
        assert_eq!(exit_code(&CommandError::Filesystem(fs_error())), codes::IO_ERROR);
        assert_eq!(
            exit_code(&CommandError::Output(OutputWriterError::CreateDir(fs_error()))),
            codes::IO_ERROR
        );
        let read = InputError::Read {
            path: PathBuf::from("reg.csv"),
            source: fs_error(),
        };
        assert_eq!(exit_code(&CommandError::Input(read)), codes::IO_ERROR);
        let missing = InputError::Missing(PathBuf::from("reg.csv"));
        assert_eq!(exit_code(&CommandError::Input(missing)), codes::IO_ERROR);
    }

    #[test]
    fn test_exit_code_inventory() {
        let error = CommandError::Input(InputError::Inventory {
            path: PathBuf::from("inv.yaml"),
            source: InventoryError::MissingRoot,
        });
        assert_eq!(exit_code(&error), codes::INVENTORY_ERROR);
    }

    #[test]
    fn test_exit_code_config() {
        let error = CommandError::Config(ConfigError::EmptyValue("dev_group"));
        assert_eq!(exit_code(&error), codes::CONFIG_ERROR);
    }

    #[test]
    fn test_exit_code_empty_registry() {
        let error = CommandError::Input(InputError::EmptyRegistry(PathBuf::from("reg.csv")));
        assert_eq!(exit_code(&error), codes::EMPTY_REGISTRY);
    }

    #[test]
    fn test_exit_code_snapshot() {
        assert_eq!(
            exit_code(&CommandError::SnapshotCommand("x".to_string())),
            codes::SNAPSHOT_ERROR
        );
        assert_eq!(
            exit_code(&CommandError::EmptyTable("x".to_string())),
            codes::SNAPSHOT_ERROR
        );
    }

    #[test]
    fn test_exit_codes_distinct() {
        let all = [
            codes::SUCCESS,
            codes::INVALID_ARGS,
            codes::IO_ERROR,
            codes::INVENTORY_ERROR,
            codes::CONFIG_ERROR,
            codes::SNAPSHOT_ERROR,
            codes::EMPTY_REGISTRY,
            codes::DRIFT_DETECTED,
        ];
        let unique: std::collections::HashSet<_> = all.iter().collect();
        assert_eq!(unique.len(), all.len());
    }
}
