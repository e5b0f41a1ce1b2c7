//! Discrepancy records produced by reconciliation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::server::{CellSet, Classification};

/// Group suggestion used when no naming convention applies to a server.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// One detected difference between registry and inventory, or one violated
/// inventory invariant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Discrepancy {
    /// In the registry, not placed in any region group of the inventory.
    MissingInInventory {
        server: String,
        cells: CellSet,
        /// Region group implied by the naming convention, or `Unknown`.
        suggested_group: String,
    },

    /// In a region group of the inventory, unknown to the registry.
    MissingInRegistry {
        server: String,
        group: Option<String>,
    },

    /// Cell sets differ between registry (`expected`) and inventory (`actual`).
    CellMismatch {
        server: String,
        group: Option<String>,
        expected: CellSet,
        actual: CellSet,
        missing: CellSet,
        extra: CellSet,
    },

    /// Placed in a region group other than the one its name implies.
    GroupPlacementMismatch {
        server: String,
        found: Option<String>,
        expected: String,
    },

    /// Dev/prod group membership disagrees with the registry classification.
    ClassificationMismatch {
        server: String,
        classification: Classification,
        found: Option<String>,
        expected: String,
    },

    /// Dev and prod counts differ for one control group at one site.
    ControlGroupImbalance {
        site: String,
        control_group: String,
        dev_count: usize,
        prod_count: usize,
        dev_servers: Vec<String>,
        prod_servers: Vec<String>,
    },

    /// Dev and prod totals differ across all control groups.
    ControlGroupTotalImbalance { dev_count: usize, prod_count: usize },

    /// Registry servers that belong to no control group.
    UnassignedServers {
        expected_total: usize,
        assigned_total: usize,
        servers: Vec<String>,
    },
}

/// Discriminant of a `Discrepancy`, used for counting and section grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscrepancyKind {
    MissingInInventory,
    MissingInRegistry,
    CellMismatch,
    GroupPlacementMismatch,
    ClassificationMismatch,
    ControlGroupImbalance,
    ControlGroupTotalImbalance,
    UnassignedServers,
}

impl DiscrepancyKind {
    /// All kinds, in reporting order.
    pub const ALL: [DiscrepancyKind; 8] = [
        DiscrepancyKind::MissingInInventory,
        DiscrepancyKind::MissingInRegistry,
        DiscrepancyKind::CellMismatch,
        DiscrepancyKind::GroupPlacementMismatch,
        DiscrepancyKind::ClassificationMismatch,
        DiscrepancyKind::ControlGroupImbalance,
        DiscrepancyKind::ControlGroupTotalImbalance,
        DiscrepancyKind::UnassignedServers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiscrepancyKind::MissingInInventory => "missing_in_inventory",
            DiscrepancyKind::MissingInRegistry => "missing_in_registry",
            DiscrepancyKind::CellMismatch => "cell_mismatch",
            DiscrepancyKind::GroupPlacementMismatch => "group_placement_mismatch",
            DiscrepancyKind::ClassificationMismatch => "classification_mismatch",
            DiscrepancyKind::ControlGroupImbalance => "control_group_imbalance",
            DiscrepancyKind::ControlGroupTotalImbalance => "control_group_total_imbalance",
            DiscrepancyKind::UnassignedServers => "unassigned_servers",
        }
    }
}

impl fmt::Display for DiscrepancyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Discrepancy {
    pub fn kind(&self) -> DiscrepancyKind {
        match self {
            Discrepancy::MissingInInventory { .. } => DiscrepancyKind::MissingInInventory,
            Discrepancy::MissingInRegistry { .. } => DiscrepancyKind::MissingInRegistry,
            Discrepancy::CellMismatch { .. } => DiscrepancyKind::CellMismatch,
            Discrepancy::GroupPlacementMismatch { .. } => DiscrepancyKind::GroupPlacementMismatch,
            Discrepancy::ClassificationMismatch { .. } => DiscrepancyKind::ClassificationMismatch,
            Discrepancy::ControlGroupImbalance { .. } => DiscrepancyKind::ControlGroupImbalance,
            Discrepancy::ControlGroupTotalImbalance { .. } => {
                DiscrepancyKind::ControlGroupTotalImbalance
            }
            Discrepancy::UnassignedServers { .. } => DiscrepancyKind::UnassignedServers,
        }
    }

    /// The server this record is about, for per-server records.
    pub fn server(&self) -> Option<&str> {
        match self {
            Discrepancy::MissingInInventory { server, .. }
            | Discrepancy::MissingInRegistry { server, .. }
            | Discrepancy::CellMismatch { server, .. }
            | Discrepancy::GroupPlacementMismatch { server, .. }
            | Discrepancy::ClassificationMismatch { server, .. } => Some(server),
            Discrepancy::ControlGroupImbalance { .. }
            | Discrepancy::ControlGroupTotalImbalance { .. }
            | Discrepancy::UnassignedServers { .. } => None,
        }
    }

    /// Serialize to a single-line JSON string.
    pub fn to_json(&self) -> String {
        // Only strings, integers and collections of them.
        serde_json::to_string(self).expect("Discrepancy serialization cannot fail")
    }
}
