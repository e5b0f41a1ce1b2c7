//! Server entity and dev/prod classification.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Ordered set of cell identifiers. Ordering keeps every rendering deterministic.
pub type CellSet = BTreeSet<String>;

/// Environment classification of a server.
///
/// Only `dev` and `prod` take part in placement and balance checks. Any other
/// value is preserved verbatim so it can be shown to an operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Classification {
    Dev,
    Prod,
    Other(String),
}

impl Classification {
    /// Normalize a raw registry value. `dev`/`prod` match case-insensitively.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("dev") {
            Classification::Dev
        } else if trimmed.eq_ignore_ascii_case("prod") {
            Classification::Prod
        } else {
            Classification::Other(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Classification::Dev => "dev",
            Classification::Prod => "prod",
            Classification::Other(raw) => raw,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Classification::Other(_) => 0,
            Classification::Dev => 1,
            Classification::Prod => 2,
        }
    }

    /// Pick between two conflicting declarations for the same server.
    ///
    /// `prod > dev > other`, and among unknown values the lexically greatest.
    /// Symmetric in its arguments so merging never depends on record order.
    pub fn prevailing(self, other: Self) -> Self {
        match self.rank().cmp(&other.rank()) {
            std::cmp::Ordering::Greater => self,
            std::cmp::Ordering::Less => other,
            std::cmp::Ordering::Equal => {
                if other.as_str() > self.as_str() {
                    other
                } else {
                    self
                }
            }
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Classification {
    fn from(raw: String) -> Self {
        Classification::parse(&raw)
    }
}

impl From<Classification> for String {
    fn from(classification: Classification) -> Self {
        classification.as_str().to_string()
    }
}

/// A server as declared by the device registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub name: String,
    pub cells: CellSet,
    pub classification: Classification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fqdn: Option<String>,
}

impl Server {
    /// Create a server with no cells.
    pub fn new(name: impl Into<String>, classification: Classification) -> Self {
        Self {
            name: name.into(),
            cells: CellSet::new(),
            classification,
            fqdn: None,
        }
    }

    /// Builder: add a cell.
    pub fn with_cell(mut self, cell: impl Into<String>) -> Self {
        self.cells.insert(cell.into());
        self
    }

    /// Builder: set the fully-qualified name.
    pub fn with_fqdn(mut self, fqdn: impl Into<String>) -> Self {
        self.fqdn = Some(fqdn.into());
        self
    }

    /// Merge another record for the same server into this one.
    ///
    /// Cells are unioned, classification follows `Classification::prevailing`
    /// and the lexically smallest non-empty FQDN is kept, so the result is the
    /// same whichever record arrives first.
    pub fn merge(&mut self, other: Server) {
        debug_assert_eq!(self.name, other.name);

        self.cells.extend(other.cells);

        let current = std::mem::replace(&mut self.classification, Classification::Dev);
        self.classification = current.prevailing(other.classification);

        self.fqdn = [self.fqdn.take(), other.fqdn]
            .into_iter()
            .flatten()
            .filter(|fqdn| !fqdn.is_empty())
            .min();
    }
}
