//! Device registry snapshot parsing.
//!
//! A snapshot is delimited text, one `(server, cell, classification)` record
//! per line. A server in several cells appears once per cell; records for the
//! same name are merged into one `Server`.

use std::collections::BTreeMap;

use fleet_schema::{Classification, Server};
use serde::{Deserialize, Serialize};

/// Default field delimiter.
pub const DEFAULT_DELIMITER: char = ',';

/// Number of fields every record must carry (name, cell, classification).
pub const REQUIRED_FIELDS: usize = 3;

/// Column layout of a registry snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryFormat {
    pub delimiter: char,
    pub name_field: usize,
    pub cell_field: usize,
    pub classification_field: usize,
    pub fqdn_field: Option<usize>,
}

impl Default for RegistryFormat {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            name_field: 0,
            cell_field: 1,
            classification_field: 2,
            fqdn_field: Some(3),
        }
    }
}

impl RegistryFormat {
    /// Tab-separated export with the default column order.
    pub fn tab() -> Self {
        Self {
            delimiter: '\t',
            ..Self::default()
        }
    }

    /// Builder: set delimiter.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Builder: set the fqdn column (or none).
    pub fn with_fqdn_field(mut self, field: Option<usize>) -> Self {
        self.fqdn_field = field;
        self
    }

    /// Fields a line must have to be accepted.
    pub fn min_fields(&self) -> usize {
        let highest = self
            .name_field
            .max(self.cell_field)
            .max(self.classification_field);
        (highest + 1).max(REQUIRED_FIELDS)
    }

    /// Check that the required columns are distinct.
    pub fn validate(&self) -> Result<(), String> {
        let required = [self.name_field, self.cell_field, self.classification_field];
        if required[0] == required[1] || required[0] == required[2] || required[1] == required[2] {
            return Err(format!(
                "name, cell and classification fields must be distinct (got {}, {}, {})",
                required[0], required[1], required[2]
            ));
        }
        if let Some(fqdn) = self.fqdn_field {
            if required.contains(&fqdn) {
                return Err(format!("fqdn field {fqdn} overlaps a required field"));
            }
        }
        if self.delimiter.is_alphanumeric() {
            return Err(format!("delimiter '{}' must not be alphanumeric", self.delimiter));
        }
        Ok(())
    }
}

/// Why a registry line was skipped.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("expected at least {required} fields, found {found}")]
    TooFewFields { found: usize, required: usize },

    #[error("empty {0} field")]
    EmptyField(&'static str),
}

/// One parsed registry line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryRecord {
    pub name: String,
    pub cell: String,
    pub classification: Classification,
    pub fqdn: Option<String>,
}

impl RegistryRecord {
    pub fn new(
        name: impl Into<String>,
        cell: impl Into<String>,
        classification: Classification,
    ) -> Self {
        Self {
            name: name.into(),
            cell: cell.into(),
            classification,
            fqdn: None,
        }
    }

    pub fn into_server(self) -> Server {
        let mut server = Server::new(self.name, self.classification).with_cell(self.cell);
        server.fqdn = self.fqdn.filter(|fqdn| !fqdn.is_empty());
        server
    }
}

/// Parse a single registry line.
pub fn parse_record(line: &str, format: &RegistryFormat) -> Result<RegistryRecord, RecordError> {
    let fields: Vec<&str> = line.split(format.delimiter).map(str::trim).collect();

    let required = format.min_fields();
    if fields.len() < required {
        return Err(RecordError::TooFewFields {
            found: fields.len(),
            required,
        });
    }

    let name = fields[format.name_field];
    if name.is_empty() {
        return Err(RecordError::EmptyField("name"));
    }
    let cell = fields[format.cell_field];
    if cell.is_empty() {
        return Err(RecordError::EmptyField("cell"));
    }

    Ok(RegistryRecord {
        name: name.to_string(),
        cell: cell.to_string(),
        classification: Classification::parse(fields[format.classification_field]),
        fqdn: format
            .fqdn_field
            .and_then(|i| fields.get(i))
            .filter(|fqdn| !fqdn.is_empty())
            .map(|fqdn| fqdn.to_string()),
    })
}

/// Servers declared by a registry snapshot, keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrySnapshot {
    servers: BTreeMap<String, Server>,
    record_count: usize,
    skipped_count: usize,
}

impl RegistrySnapshot {
    /// Build a snapshot by merging records in any order.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = RegistryRecord>,
    {
        let mut snapshot = Self::default();
        for record in records {
            snapshot.insert(record.into_server());
        }
        snapshot
    }

    /// Add a server, merging with an existing entry of the same name.
    pub fn insert(&mut self, server: Server) {
        self.record_count += 1;
        match self.servers.get_mut(&server.name) {
            Some(existing) => existing.merge(server),
            None => {
                self.servers.insert(server.name.clone(), server);
            }
        }
    }

    pub fn servers(&self) -> &BTreeMap<String, Server> {
        &self.servers
    }

    pub fn get(&self, name: &str) -> Option<&Server> {
        self.servers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    /// Server names in lexical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    /// Number of unique servers.
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Accepted records, before merging.
    pub fn record_count(&self) -> usize {
        self.record_count
    }

    /// Malformed lines that were skipped.
    pub fn skipped_count(&self) -> usize {
        self.skipped_count
    }
}

/// Parse a registry snapshot, skipping malformed lines.
///
/// Blank lines and `#` comments are ignored silently. Each malformed line is
/// counted and, if `warn_fn` is provided, reported as `("line:N", reason)`.
pub fn parse_registry<F>(content: &str, format: &RegistryFormat, mut warn_fn: Option<F>) -> RegistrySnapshot
where
    F: FnMut(&str, &str),
{
    let mut snapshot = RegistrySnapshot::default();

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        match parse_record(line, format) {
            Ok(record) => snapshot.insert(record.into_server()),
            Err(e) => {
                snapshot.skipped_count += 1;
                if let Some(ref mut warn) = warn_fn {
                    let location = format!("line:{}", line_num + 1);
                    warn(&location, &e.to_string());
                }
            }
        }
    }

    snapshot
}

/// Convert device-inventory display output into registry records.
///
/// Everything up to and including the first line starting with `=` is
/// header. Each following row is whitespace-separated
/// `cell server classification [...]`; shorter rows are dropped. Without a
/// separator line there are no rows.
pub fn parse_device_table(text: &str) -> Vec<RegistryRecord> {
    text.lines()
        .skip_while(|line| !line.starts_with('='))
        .skip(1)
        .filter_map(|line| {
            let mut columns = line.split_whitespace();
            let cell = columns.next()?;
            let name = columns.next()?;
            let classification = columns.next()?;
            Some(RegistryRecord::new(name, cell, Classification::parse(classification)))
        })
        .collect()
}

/// Render records in the default comma-separated layout.
pub fn render_registry_csv(records: &[RegistryRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.name);
        out.push(DEFAULT_DELIMITER);
        out.push_str(&record.cell);
        out.push(DEFAULT_DELIMITER);
        out.push_str(record.classification.as_str());
        if let Some(fqdn) = &record.fqdn {
            out.push(DEFAULT_DELIMITER);
            out.push_str(fqdn);
        }
        out.push('\n');
    }
    out
}
