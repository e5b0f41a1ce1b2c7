//! Input file loaders.
//!
//! Each loader reads through the `Filesystem` trait and attaches the path to
//! any error so the operator knows which input was at fault.

use std::path::{Path, PathBuf};

use fleet_fs::{Filesystem, FsError};
use fleet_reconciler::registry::{parse_registry, RegistryFormat, RegistrySnapshot};
use fleet_reconciler::{ConfigError, ReconcileConfig};
use fleet_schema::{InventoryDocument, InventoryError};
use thiserror::Error;

use crate::logger::Logger;

/// Errors from loading inputs.
#[derive(Debug, Error)]
pub enum InputError {
    #[error("input file {0} does not exist")]
    Missing(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: FsError,
    },

    #[error("failed to parse inventory {path}: {source}")]
    Inventory {
        path: PathBuf,
        #[source]
        source: InventoryError,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: ConfigError,
    },

    #[error("registry snapshot {0} contains no valid records")]
    EmptyRegistry(PathBuf),
}

fn read<F: Filesystem>(fs: &F, path: &Path) -> Result<String, InputError> {
    fs.read_file(path).map_err(|source| {
        if source.is_not_found() {
            InputError::Missing(path.to_path_buf())
        } else {
            InputError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

/// Load and parse a registry snapshot.
///
/// Malformed lines are skipped and logged at debug level. A snapshot with no
/// valid records is an error: reconciling against it would flag the whole
/// inventory.
pub fn load_registry<F: Filesystem>(
    fs: &F,
    path: &Path,
    format: &RegistryFormat,
    logger: &dyn Logger,
) -> Result<RegistrySnapshot, InputError> {
    let content = read(fs, path)?;
    let display = path.display().to_string();

    let snapshot = parse_registry(
        &content,
        format,
        Some(|location: &str, reason: &str| {
            logger.debug(&format!("skipping {display} {location}: {reason}"));
        }),
    );

    if snapshot.skipped_count() > 0 {
        logger.verbose(&format!(
            "skipped {} malformed registry line(s) in {display}",
            snapshot.skipped_count()
        ));
    }
    if snapshot.is_empty() {
        return Err(InputError::EmptyRegistry(path.to_path_buf()));
    }
    Ok(snapshot)
}

/// Load and parse an inventory document.
pub fn load_inventory<F: Filesystem>(fs: &F, path: &Path) -> Result<InventoryDocument, InputError> {
    let content = read(fs, path)?;
    InventoryDocument::from_yaml(&content).map_err(|source| InputError::Inventory {
        path: path.to_path_buf(),
        source,
    })
}

/// Load a config file.
pub fn load_config<F: Filesystem>(fs: &F, path: &Path) -> Result<ReconcileConfig, InputError> {
    let content = read(fs, path)?;
    ReconcileConfig::from_yaml(&content).map_err(|source| InputError::Config {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logger::{MockLogger, Verbosity};
    use fleet_fs::MockFilesystem;

    // ===========================================
    // Registry Loader Tests
    // ===========================================

    #[test]
    fn test_load_registry() {
        let fs = MockFilesystem::new();
        fs.add_file("/in/reg.csv", "s1,cell1,dev\ns1,cell2,dev\ns2,cell1,prod\n");
        let logger = MockLogger::new();

        let snapshot =
            load_registry(&fs, Path::new("/in/reg.csv"), &RegistryFormat::default(), &logger).unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(logger.count(), 0);
    }

    #[test]
    fn test_load_registry_logs_skipped_lines() {
        let fs = MockFilesystem::new();
        fs.add_file("/in/reg.csv", "s1,cell1,dev\ngarbage\n");
        let logger = MockLogger::new();

        let snapshot =
            load_registry(&fs, Path::new("/in/reg.csv"), &RegistryFormat::default(), &logger).unwrap();
        assert_eq!(snapshot.skipped_count(), 1);

        let debug = logger.messages_at_level(Verbosity::Debug);
        assert_eq!(debug.len(), 1);
        assert!(debug[0].contains("line:2"));
        assert!(logger.contains("skipped 1 malformed"));
    }

    #[test]
    fn test_load_registry_empty_is_error() {
        let fs = MockFilesystem::new();
        fs.add_file("/in/reg.csv", "# nothing here\n");
        let err = load_registry(&fs, Path::new("/in/reg.csv"), &RegistryFormat::default(), &MockLogger::new())
            .unwrap_err();
        assert!(matches!(err, InputError::EmptyRegistry(_)));
    }

    #[test]
    fn test_load_registry_missing_file() {
        let fs = MockFilesystem::new();
        let err = load_registry(&fs, Path::new("/nope.csv"), &RegistryFormat::default(), &MockLogger::new())
            .unwrap_err();
        assert!(matches!(err, InputError::Missing(_)));
        assert!(err.to_string().contains("/nope.csv"));
    }

    #[test]
    fn test_load_inventory_unreadable_file() {
        let fs = MockFilesystem::new();
        fs.add_file("/in/inv.yaml", vec![0xff, 0xfe]);
        let err = load_inventory(&fs, Path::new("/in/inv.yaml")).unwrap_err();
        assert!(matches!(err, InputError::Read { .. }));
    }

    // ===========================================
    // Inventory Loader Tests
    // ===========================================

    #[test]
    fn test_load_inventory() {
        let fs = MockFilesystem::new();
        fs.add_file("/in/inv.yaml", "all:\n  children:\n    l_aja_sgsg01:\n      hosts:\n        h1:\n");
        let doc = load_inventory(&fs, Path::new("/in/inv.yaml")).unwrap();
        assert!(doc.root.children.contains_key("l_aja_sgsg01"));
    }

    #[test]
    fn test_load_inventory_malformed() {
        let fs = MockFilesystem::new();
        fs.add_file("/in/inv.yaml", "all: [");
        let err = load_inventory(&fs, Path::new("/in/inv.yaml")).unwrap_err();
        assert!(matches!(err, InputError::Inventory { .. }));
    }

    // ===========================================
    // Config Loader Tests
    // ===========================================

    #[test]
    fn test_load_config() {
        let fs = MockFilesystem::new();
        fs.add_file("/etc/fleet.yaml", "dev_group: dev_hosts\n");
        let config = load_config(&fs, Path::new("/etc/fleet.yaml")).unwrap();
        assert_eq!(config.dev_group, "dev_hosts");
    }

    #[test]
    fn test_load_config_invalid() {
        let fs = MockFilesystem::new();
        fs.add_file("/etc/fleet.yaml", "region_group_pattern: '('\n");
        let err = load_config(&fs, Path::new("/etc/fleet.yaml")).unwrap_err();
        assert!(matches!(err, InputError::Config { .. }));
    }
}
