//! Inventory group tree as read from the configuration-management YAML.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::server::CellSet;

/// Name of the single top-level key of an inventory document.
pub const ROOT_GROUP: &str = "all";

/// Name-keyed entries kept in document order.
///
/// Group and host order in the inventory decides which region group wins when
/// a host is listed twice, so the parsed tree must not re-sort names. A name
/// may appear only once per mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

fn entry_refs<V>(entry: &(String, V)) -> (&String, &V) {
    (&entry.0, &entry.1)
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace; a replaced entry keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, value: V) {
        let name = name.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&V> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &V)> {
        self.entries.iter().map(entry_refs)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.iter().map(|(key, _)| key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Index<&str> for OrderedMap<V> {
    type Output = V;

    fn index(&self, name: &str) -> &V {
        match self.get(name) {
            Some(value) => value,
            None => panic!("no entry named '{name}'"),
        }
    }
}

impl<'a, V> IntoIterator for &'a OrderedMap<V> {
    type Item = (&'a String, &'a V);
    type IntoIter =
        std::iter::Map<std::slice::Iter<'a, (String, V)>, fn(&'a (String, V)) -> (&'a String, &'a V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries
            .iter()
            .map(entry_refs as fn(&'a (String, V)) -> (&'a String, &'a V))
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a mapping keyed by name")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = OrderedMap::new();
                while let Some((name, value)) = access.next_entry::<String, V>()? {
                    if map.contains_key(&name) {
                        return Err(de::Error::custom(format!("duplicate entry '{name}'")));
                    }
                    map.entries.push((name, value));
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}

/// Attributes declared for one host inside a group.
///
/// Only `cells` is interpreted; other host variables are ignored. A host
/// declared with no value (`host01:`) reads as an empty attribute map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HostVars {
    pub cells: CellSet,
}

impl<'de> Deserialize<'de> for HostVars {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default, deserialize_with = "null_as_default")]
            cells: Vec<String>,
        }

        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(raw
            .map(|raw| HostVars {
                cells: raw.cells.iter().map(|c| c.trim().to_string()).collect(),
            })
            .unwrap_or_default())
    }
}

/// One group of the inventory tree.
///
/// Hosts and child groups keep their document order. `null` group bodies
/// read as empty groups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InventoryNode {
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub hosts: OrderedMap<HostVars>,
    #[serde(skip_serializing_if = "OrderedMap::is_empty")]
    pub children: OrderedMap<InventoryNode>,
}

impl<'de> Deserialize<'de> for InventoryNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        struct Raw {
            #[serde(default, deserialize_with = "null_as_default")]
            hosts: OrderedMap<HostVars>,
            #[serde(default, deserialize_with = "null_as_default")]
            children: OrderedMap<InventoryNode>,
        }

        let raw = Option::<Raw>::deserialize(deserializer)?;
        Ok(raw
            .map(|raw| InventoryNode {
                hosts: raw.hosts,
                children: raw.children,
            })
            .unwrap_or_default())
    }
}

impl InventoryNode {
    /// Builder: add a host with the given cells.
    pub fn with_host<I, S>(mut self, host: impl Into<String>, cells: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hosts.insert(
            host.into(),
            HostVars {
                cells: cells.into_iter().map(Into::into).collect(),
            },
        );
        self
    }

    /// Builder: add a child group.
    pub fn with_child(mut self, name: impl Into<String>, child: InventoryNode) -> Self {
        self.children.insert(name.into(), child);
        self
    }
}

/// A parsed inventory document: the `all` group and everything below it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryDocument {
    pub root: InventoryNode,
}

impl InventoryDocument {
    pub fn new(root: InventoryNode) -> Self {
        Self { root }
    }

    /// Parse an inventory document from YAML.
    ///
    /// The whole document is rejected when it is not valid YAML, has no `all`
    /// key, or when any group, host or `cells` entry has the wrong shape.
    pub fn from_yaml(yaml: &str) -> Result<Self, InventoryError> {
        let document: serde_yaml::Value = serde_yaml::from_str(yaml)?;
        let root = document.get(ROOT_GROUP).ok_or(InventoryError::MissingRoot)?;
        let root: InventoryNode = serde_yaml::from_value(root.clone())?;
        Ok(Self { root })
    }
}

/// Errors from inventory parsing. Any of these aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("invalid inventory YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("inventory has no top-level 'all' group")]
    MissingRoot,
}

/// Role of a group, derived from its name alone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum GroupClassification {
    /// Geographic/site deployment group (e.g. `l_aja_cnhk01`).
    Region,
    /// The group listing all dev-classified hosts.
    DevType,
    /// The group listing all prod-classified hosts.
    ProdType,
    /// One half of a high-availability pairing; `label` is the name suffix.
    Control { label: String },
    Other,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
