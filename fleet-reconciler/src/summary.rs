//! Machine-readable summary output (summary.json).
//!
//! Versioned and deterministic so runs can be compared over time.

use std::collections::BTreeMap;

use fleet_schema::{Discrepancy, DiscrepancyKind};
use serde::{Deserialize, Serialize};

use crate::inventory::FlattenedInventory;
use crate::registry::RegistrySnapshot;
use crate::report::ReportContext;

/// Current summary schema version.
pub const SUMMARY_VERSION: u32 = 1;

/// Registry input statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    pub path: String,
    pub servers: usize,
    pub records: usize,
    pub skipped_records: usize,
}

/// Inventory input statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryStats {
    pub path: String,
    pub servers: usize,
    pub region_groups: usize,
    pub control_groups: usize,
    pub duplicate_placements: usize,
}

/// Machine-readable summary of one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub summary_version: u32,
    /// RFC 3339 generation time.
    pub generated_at: String,
    pub registry: RegistryStats,
    pub inventory: InventoryStats,
    /// Count per discrepancy kind, zeros included.
    pub counts: BTreeMap<DiscrepancyKind, usize>,
    pub clean: bool,
    pub discrepancies: Vec<Discrepancy>,
}

impl Summary {
    /// Serialize to pretty JSON.
    pub fn to_json(&self) -> String {
        // Only strings, integers, bools and maps with string keys.
        serde_json::to_string_pretty(self).expect("Summary serialization cannot fail")
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn total(&self) -> usize {
        self.discrepancies.len()
    }
}

/// Builder for `Summary`.
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    generated_at: String,
    registry: RegistryStats,
    inventory: InventoryStats,
    counts: BTreeMap<DiscrepancyKind, usize>,
    discrepancies: Vec<Discrepancy>,
}

impl SummaryBuilder {
    /// Start from a report context (results and timestamp).
    pub fn new(ctx: &ReportContext<'_>) -> Self {
        Self {
            generated_at: ctx.timestamp(),
            registry: RegistryStats {
                path: ctx.registry_label.clone(),
                servers: ctx.reconciliation.registry_servers(),
                ..RegistryStats::default()
            },
            inventory: InventoryStats {
                path: ctx.inventory_label.clone(),
                servers: ctx.reconciliation.inventory_servers(),
                ..InventoryStats::default()
            },
            counts: ctx.reconciliation.counts(),
            discrepancies: ctx.reconciliation.discrepancies().to_vec(),
        }
    }

    /// Add record-level registry statistics.
    pub fn with_registry(mut self, registry: &RegistrySnapshot) -> Self {
        self.registry.servers = registry.len();
        self.registry.records = registry.record_count();
        self.registry.skipped_records = registry.skipped_count();
        self
    }

    /// Add group-level inventory statistics.
    pub fn with_inventory(mut self, inventory: &FlattenedInventory) -> Self {
        self.inventory.servers = inventory.host_count();
        self.inventory.region_groups = inventory.region_groups.len();
        self.inventory.control_groups = inventory.control_groups.len();
        self.inventory.duplicate_placements = inventory.duplicate_placements.len();
        self
    }

    pub fn build(self) -> Summary {
        Summary {
            summary_version: SUMMARY_VERSION,
            generated_at: self.generated_at,
            registry: self.registry,
            inventory: self.inventory,
            counts: self.counts,
            clean: self.discrepancies.is_empty(),
            discrepancies: self.discrepancies,
        }
    }
}

/// Shorthand for a summary with no extra statistics.
pub fn summarize(ctx: &ReportContext<'_>) -> Summary {
    SummaryBuilder::new(ctx).build()
}
