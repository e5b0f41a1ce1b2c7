//! Inventory tree flattening.
//!
//! The group tree is walked by pure recursive descent: each call returns the
//! partial view of its own subtree and the parent merges them. Children are
//! visited in document order.

use std::collections::{BTreeMap, BTreeSet};

use fleet_schema::{CellSet, GroupClassification, InventoryDocument, InventoryError, InventoryNode, ROOT_GROUP};

use crate::config::ReconcileConfig;

/// Parse an inventory document from YAML.
pub fn parse_inventory(yaml: &str) -> Result<InventoryDocument, InventoryError> {
    InventoryDocument::from_yaml(yaml)
}

/// Role of a group under the given configuration.
///
/// The literal dev/prod names take precedence over the control prefix, which
/// takes precedence over the region pattern.
pub fn classify_group(name: &str, config: &ReconcileConfig) -> GroupClassification {
    if name == config.dev_group {
        GroupClassification::DevType
    } else if name == config.prod_group {
        GroupClassification::ProdType
    } else if let Some(label) = config.control_group_label(name) {
        GroupClassification::Control {
            label: label.to_string(),
        }
    } else if config.is_region_group(name) {
        GroupClassification::Region
    } else {
        GroupClassification::Other
    }
}

/// A host found under more than one region group. Its cells are the union of
/// every listing; only the placement is replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePlacement {
    pub host: String,
    /// Placement that was replaced.
    pub replaced_group: String,
    /// Placement that was kept (the later visit).
    pub kept_group: String,
}

/// Flat view of the inventory used by the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlattenedInventory {
    /// Cells declared for each host placed in a region group, unioned over
    /// every region group listing the host.
    pub cells: BTreeMap<String, CellSet>,
    /// Region group owning each host.
    pub placement: BTreeMap<String, String>,
    pub dev_hosts: BTreeSet<String>,
    pub prod_hosts: BTreeSet<String>,
    /// Members of each control group.
    pub control_groups: BTreeMap<String, BTreeSet<String>>,
    /// Every region group visited, including empty ones.
    pub region_groups: BTreeSet<String>,
    pub duplicate_placements: Vec<DuplicatePlacement>,
}

impl FlattenedInventory {
    /// Hosts placed in a region group, in lexical order.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.cells.keys().map(String::as_str)
    }

    pub fn contains_host(&self, host: &str) -> bool {
        self.cells.contains_key(host)
    }

    /// True when the host is named by any region, type or control group.
    pub fn mentions(&self, host: &str) -> bool {
        self.cells.contains_key(host)
            || self.dev_hosts.contains(host)
            || self.prod_hosts.contains(host)
            || self.control_groups.values().any(|hosts| hosts.contains(host))
    }

    pub fn group_of(&self, host: &str) -> Option<&str> {
        self.placement.get(host).map(String::as_str)
    }

    pub fn host_count(&self) -> usize {
        self.cells.len()
    }

    /// Merge the view of a later-visited subtree into this one.
    fn absorb(&mut self, later: FlattenedInventory) {
        for (host, group) in later.placement {
            if let Some(previous) = self.placement.insert(host.clone(), group.clone()) {
                if previous != group {
                    self.duplicate_placements.push(DuplicatePlacement {
                        host,
                        replaced_group: previous,
                        kept_group: group,
                    });
                }
            }
        }
        for (host, cells) in later.cells {
            self.cells.entry(host).or_default().extend(cells);
        }
        self.dev_hosts.extend(later.dev_hosts);
        self.prod_hosts.extend(later.prod_hosts);
        for (group, hosts) in later.control_groups {
            self.control_groups.entry(group).or_default().extend(hosts);
        }
        self.region_groups.extend(later.region_groups);
        self.duplicate_placements.extend(later.duplicate_placements);
    }
}

/// Flatten the tree rooted at `root` (the `all` group).
pub fn flatten(root: &InventoryNode, config: &ReconcileConfig) -> FlattenedInventory {
    flatten_group(ROOT_GROUP, root, config)
}

fn flatten_group(name: &str, node: &InventoryNode, config: &ReconcileConfig) -> FlattenedInventory {
    let mut flat = FlattenedInventory::default();

    match classify_group(name, config) {
        GroupClassification::Region => {
            flat.region_groups.insert(name.to_string());
            for (host, vars) in &node.hosts {
                flat.cells.insert(host.clone(), vars.cells.clone());
                flat.placement.insert(host.clone(), name.to_string());
            }
        }
        GroupClassification::DevType => flat.dev_hosts.extend(node.hosts.keys().cloned()),
        GroupClassification::ProdType => flat.prod_hosts.extend(node.hosts.keys().cloned()),
        GroupClassification::Control { .. } => {
            flat.control_groups
                .insert(name.to_string(), node.hosts.keys().cloned().collect());
        }
        GroupClassification::Other => {}
    }

    for (child_name, child) in &node.children {
        flat.absorb(flatten_group(child_name, child, config));
    }

    flat
}
