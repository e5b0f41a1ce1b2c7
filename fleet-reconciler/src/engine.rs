//! Reconciliation engine.
//!
//! Phases run in a fixed order and each phase walks servers in lexical order,
//! so identical inputs always produce the identical record list.

use std::collections::{BTreeMap, BTreeSet};

use fleet_schema::{CellSet, Classification, Discrepancy, DiscrepancyKind};

use crate::config::ReconcileConfig;
use crate::inventory::FlattenedInventory;
use crate::registry::RegistrySnapshot;
use crate::resolver::ExpectedGroup;

/// Everything a reconciliation run reads.
#[derive(Debug, Clone, Copy)]
pub struct ReconcileInput<'a> {
    pub registry: &'a RegistrySnapshot,
    pub inventory: &'a FlattenedInventory,
    pub config: &'a ReconcileConfig,
}

impl<'a> ReconcileInput<'a> {
    pub fn new(
        registry: &'a RegistrySnapshot,
        inventory: &'a FlattenedInventory,
        config: &'a ReconcileConfig,
    ) -> Self {
        Self {
            registry,
            inventory,
            config,
        }
    }
}

/// Ordered result of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconciliation {
    discrepancies: Vec<Discrepancy>,
    registry_servers: usize,
    inventory_servers: usize,
}

impl Reconciliation {
    pub fn discrepancies(&self) -> &[Discrepancy] {
        &self.discrepancies
    }

    pub fn into_discrepancies(self) -> Vec<Discrepancy> {
        self.discrepancies
    }

    pub fn is_clean(&self) -> bool {
        self.discrepancies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.discrepancies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discrepancies.is_empty()
    }

    pub fn of_kind(&self, kind: DiscrepancyKind) -> impl Iterator<Item = &Discrepancy> {
        self.discrepancies.iter().filter(move |d| d.kind() == kind)
    }

    pub fn count(&self, kind: DiscrepancyKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Count for every kind, including zeros.
    pub fn counts(&self) -> BTreeMap<DiscrepancyKind, usize> {
        DiscrepancyKind::ALL
            .iter()
            .map(|&kind| (kind, self.count(kind)))
            .collect()
    }

    /// Unique servers in the registry snapshot.
    pub fn registry_servers(&self) -> usize {
        self.registry_servers
    }

    /// Hosts placed in a region group of the inventory.
    pub fn inventory_servers(&self) -> usize {
        self.inventory_servers
    }
}

/// Run every check and collect the findings.
pub fn reconcile(input: &ReconcileInput<'_>) -> Reconciliation {
    let mut discrepancies = presence_diff(input);
    discrepancies.extend(cell_mismatches(input));
    discrepancies.extend(placement_mismatches(input));
    discrepancies.extend(classification_mismatches(input));
    discrepancies.extend(control_group_balance(input));

    Reconciliation {
        discrepancies,
        registry_servers: input.registry.len(),
        inventory_servers: input.inventory.host_count(),
    }
}

/// Names only in `left` and names only in `right`, each sorted.
pub fn split_presence<'a, L, R>(left: L, right: R) -> (Vec<&'a str>, Vec<&'a str>)
where
    L: IntoIterator<Item = &'a str>,
    R: IntoIterator<Item = &'a str>,
{
    let left: BTreeSet<&str> = left.into_iter().collect();
    let right: BTreeSet<&str> = right.into_iter().collect();
    (
        left.difference(&right).copied().collect(),
        right.difference(&left).copied().collect(),
    )
}

/// Phase 1: servers known to only one side.
pub fn presence_diff(input: &ReconcileInput<'_>) -> Vec<Discrepancy> {
    let (registry_only, inventory_only) =
        split_presence(input.registry.names(), input.inventory.hosts());

    let missing_in_inventory = registry_only.into_iter().filter_map(|name| {
        let server = input.registry.get(name)?;
        Some(Discrepancy::MissingInInventory {
            server: name.to_string(),
            cells: server.cells.clone(),
            suggested_group: input.config.pattern_table.resolve(name).to_string(),
        })
    });

    let missing_in_registry = inventory_only.into_iter().map(|name| Discrepancy::MissingInRegistry {
        server: name.to_string(),
        group: input.inventory.group_of(name).map(str::to_string),
    });

    missing_in_inventory.chain(missing_in_registry).collect()
}

/// Servers present on both sides, with their registry and inventory cells.
fn common_servers<'a>(
    input: &ReconcileInput<'a>,
) -> impl Iterator<Item = (&'a str, &'a CellSet, &'a CellSet)> + 'a {
    let inventory = input.inventory;
    input.registry.servers().iter().filter_map(move |(name, server)| {
        inventory
            .cells
            .get(name)
            .map(|actual| (name.as_str(), &server.cells, actual))
    })
}

/// Phase 2: cell sets must be equal.
pub fn cell_mismatches(input: &ReconcileInput<'_>) -> Vec<Discrepancy> {
    common_servers(input)
        .filter(|(_, expected, actual)| expected != actual)
        .map(|(name, expected, actual)| Discrepancy::CellMismatch {
            server: name.to_string(),
            group: input.inventory.group_of(name).map(str::to_string),
            expected: expected.clone(),
            actual: actual.clone(),
            missing: expected.difference(actual).cloned().collect(),
            extra: actual.difference(expected).cloned().collect(),
        })
        .collect()
}

/// Phase 3: region group must match the naming convention, when one applies.
pub fn placement_mismatches(input: &ReconcileInput<'_>) -> Vec<Discrepancy> {
    common_servers(input)
        .filter_map(|(name, _, _)| {
            let ExpectedGroup::Matched(expected) = input.config.pattern_table.resolve(name) else {
                return None;
            };
            let found = input.inventory.group_of(name);
            (found != Some(expected)).then(|| Discrepancy::GroupPlacementMismatch {
                server: name.to_string(),
                found: found.map(str::to_string),
                expected: expected.to_string(),
            })
        })
        .collect()
}

/// Phase 4: dev/prod group membership must match the registry.
pub fn classification_mismatches(input: &ReconcileInput<'_>) -> Vec<Discrepancy> {
    let config = input.config;
    let inventory = input.inventory;

    input
        .registry
        .servers()
        .values()
        .filter(|server| inventory.mentions(&server.name))
        .filter_map(|server| {
            let in_dev = inventory.dev_hosts.contains(&server.name);
            let in_prod = inventory.prod_hosts.contains(&server.name);

            let (in_own, in_other, expected, other_group) = match &server.classification {
                Classification::Dev => (in_dev, in_prod, &config.dev_group, &config.prod_group),
                Classification::Prod => (in_prod, in_dev, &config.prod_group, &config.dev_group),
                Classification::Other(_) => return None,
            };
            if in_own && !in_other {
                return None;
            }

            let found = if in_other {
                Some(other_group.clone())
            } else {
                None
            };
            Some(Discrepancy::ClassificationMismatch {
                server: server.name.clone(),
                classification: server.classification.clone(),
                found,
                expected: expected.clone(),
            })
        })
        .collect()
}

#[derive(Default)]
struct SiteTally {
    dev: Vec<String>,
    prod: Vec<String>,
}

/// Phase 5: control-group HA balance and coverage.
///
/// A server listed in several control groups counts only in the first one by
/// name (`controlgroup_a` before `controlgroup_b`).
pub fn control_group_balance(input: &ReconcileInput<'_>) -> Vec<Discrepancy> {
    let mut tallies: BTreeMap<(&str, &str), SiteTally> = BTreeMap::new();
    let mut assigned: BTreeSet<&str> = BTreeSet::new();
    let mut dev_total = 0;
    let mut prod_total = 0;

    for (group, hosts) in &input.inventory.control_groups {
        for host in hosts {
            let Some(server) = input.registry.get(host) else {
                continue;
            };
            if !assigned.insert(server.name.as_str()) {
                continue;
            }

            match server.classification {
                Classification::Dev => dev_total += 1,
                Classification::Prod => prod_total += 1,
                Classification::Other(_) => continue,
            }
            for site in &server.cells {
                let tally = tallies.entry((site.as_str(), group.as_str())).or_default();
                match server.classification {
                    Classification::Dev => tally.dev.push(server.name.clone()),
                    _ => tally.prod.push(server.name.clone()),
                }
            }
        }
    }

    let mut out: Vec<Discrepancy> = tallies
        .into_iter()
        .filter(|(_, tally)| tally.dev.len() != tally.prod.len())
        .map(|((site, group), tally)| Discrepancy::ControlGroupImbalance {
            site: site.to_string(),
            control_group: group.to_string(),
            dev_count: tally.dev.len(),
            prod_count: tally.prod.len(),
            dev_servers: tally.dev,
            prod_servers: tally.prod,
        })
        .collect();

    if dev_total != prod_total {
        out.push(Discrepancy::ControlGroupTotalImbalance {
            dev_count: dev_total,
            prod_count: prod_total,
        });
    }

    let unassigned: Vec<String> = input
        .registry
        .names()
        .filter(|name| !assigned.contains(name))
        .map(str::to_string)
        .collect();
    if !unassigned.is_empty() {
        out.push(Discrepancy::UnassignedServers {
            expected_total: input.registry.len(),
            assigned_total: assigned.len(),
            servers: unassigned,
        });
    }

    out
}
