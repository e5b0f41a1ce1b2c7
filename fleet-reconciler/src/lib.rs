//! Fleet Reconciler Core
//!
//! Compares a device registry snapshot against a configuration-management
//! inventory and produces:
//! - an ordered list of `Discrepancy` records (`engine`)
//! - operator reports in text, HTML and console-table form (`report`)
//! - `summary.json` - machine-readable summary for comparisons across runs
//!
//! Checks performed:
//! - PRESENCE: servers known to only one of the two sources
//! - CELLS: registry and inventory cell sets must be equal
//! - PLACEMENT: region group must match the naming convention
//! - CLASSIFICATION: dev/prod group membership must match the registry
//! - HA BALANCE: dev and prod counts per control group and site must be equal

pub mod clock;
pub mod config;
pub mod engine;
pub mod inventory;
pub mod registry;
pub mod report;
pub mod resolver;
pub mod summary;

pub use clock::{Clock, MockClock, SystemClock};
pub use config::{ConfigError, ReconcileConfig};
pub use engine::{reconcile, Reconciliation};
pub use inventory::{flatten, FlattenedInventory};
pub use registry::{RegistryFormat, RegistrySnapshot};
pub use report::{HtmlRenderer, ReportContext, ReportRenderer, TableRenderer, TextRenderer};
pub use resolver::{ExpectedGroup, GroupPatternTable, PatternRule};
pub use summary::{Summary, SummaryBuilder};
