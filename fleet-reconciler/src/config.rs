//! Reconciliation configuration.
//!
//! Defaults describe the production inventory layout; every value can be
//! overridden through the builder or an optional YAML config file.

use regex::Regex;
use serde::Deserialize;

use crate::registry::RegistryFormat;
use crate::resolver::{GroupPatternTable, PatternRule};

/// Default name of the group listing dev hosts.
pub const DEFAULT_DEV_GROUP: &str = "servertype_dev";

/// Default name of the group listing prod hosts.
pub const DEFAULT_PROD_GROUP: &str = "servertype_prod";

/// Default prefix of high-availability control groups.
pub const DEFAULT_CONTROL_GROUP_PREFIX: &str = "controlgroup_";

/// Default pattern identifying region (site) groups.
pub const DEFAULT_REGION_GROUP_PATTERN: &str = r"^l_[A-Za-z0-9_-]+_[A-Za-z0-9]+";

/// Errors from building a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid region group pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid registry format: {0}")]
    InvalidRegistryFormat(String),

    #[error("{0} must not be empty")]
    EmptyValue(&'static str),
}

/// Settings for one reconciliation run.
#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    pub dev_group: String,
    pub prod_group: String,
    pub control_group_prefix: String,
    region_group_pattern: Regex,
    pub registry_format: RegistryFormat,
    pub pattern_table: GroupPatternTable,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            dev_group: DEFAULT_DEV_GROUP.to_string(),
            prod_group: DEFAULT_PROD_GROUP.to_string(),
            control_group_prefix: DEFAULT_CONTROL_GROUP_PREFIX.to_string(),
            region_group_pattern: default_region_pattern(),
            registry_format: RegistryFormat::default(),
            pattern_table: GroupPatternTable::default(),
        }
    }
}

fn default_region_pattern() -> Regex {
    // Constant pattern, covered by test_default_region_pattern_compiles.
    Regex::new(DEFAULT_REGION_GROUP_PATTERN).expect("default region pattern is valid")
}

impl ReconcileConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set dev group name.
    pub fn with_dev_group(mut self, name: impl Into<String>) -> Self {
        self.dev_group = name.into();
        self
    }

    /// Builder: set prod group name.
    pub fn with_prod_group(mut self, name: impl Into<String>) -> Self {
        self.prod_group = name.into();
        self
    }

    /// Builder: set control group prefix.
    pub fn with_control_group_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.control_group_prefix = prefix.into();
        self
    }

    /// Builder: set region group pattern.
    pub fn with_region_group_pattern(mut self, pattern: &str) -> Result<Self, ConfigError> {
        self.region_group_pattern =
            Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;
        Ok(self)
    }

    /// Builder: set registry format.
    pub fn with_registry_format(mut self, format: RegistryFormat) -> Self {
        self.registry_format = format;
        self
    }

    /// Builder: set naming table.
    pub fn with_pattern_table(mut self, table: GroupPatternTable) -> Self {
        self.pattern_table = table;
        self
    }

    pub fn region_group_pattern(&self) -> &str {
        self.region_group_pattern.as_str()
    }

    pub fn is_region_group(&self, name: &str) -> bool {
        self.region_group_pattern.is_match(name)
    }

    /// Control-group label (`a` for `controlgroup_a`), if the name is one.
    pub fn control_group_label<'a>(&self, name: &'a str) -> Option<&'a str> {
        name.strip_prefix(self.control_group_prefix.as_str())
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dev_group.is_empty() {
            return Err(ConfigError::EmptyValue("dev_group"));
        }
        if self.prod_group.is_empty() {
            return Err(ConfigError::EmptyValue("prod_group"));
        }
        if self.control_group_prefix.is_empty() {
            return Err(ConfigError::EmptyValue("control_group_prefix"));
        }
        self.registry_format
            .validate()
            .map_err(ConfigError::InvalidRegistryFormat)
    }

    /// Parse a YAML config file; absent keys keep their defaults.
    ///
    /// ```yaml
    /// dev_group: servertype_dev
    /// prod_group: servertype_prod
    /// control_group_prefix: controlgroup_
    /// region_group_pattern: '^l_[A-Za-z0-9_-]+_[A-Za-z0-9]+'
    /// registry:
    ///   delimiter: "\t"
    ///   fqdn_field: ~
    /// naming_table:
    ///   - prefix: lcnhk01efs
    ///     group: l_aja_cnhk01
    /// ```
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let file: ConfigFile = serde_yaml::from_str(yaml)?;
        file.apply(Self::default())
    }
}

/// On-disk shape of the config file.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    dev_group: Option<String>,
    prod_group: Option<String>,
    control_group_prefix: Option<String>,
    region_group_pattern: Option<String>,
    registry: Option<RegistryFormat>,
    naming_table: Option<Vec<PatternRule>>,
}

impl ConfigFile {
    fn apply(self, mut config: ReconcileConfig) -> Result<ReconcileConfig, ConfigError> {
        if let Some(name) = self.dev_group {
            config = config.with_dev_group(name);
        }
        if let Some(name) = self.prod_group {
            config = config.with_prod_group(name);
        }
        if let Some(prefix) = self.control_group_prefix {
            config = config.with_control_group_prefix(prefix);
        }
        if let Some(pattern) = self.region_group_pattern {
            config = config.with_region_group_pattern(&pattern)?;
        }
        if let Some(format) = self.registry {
            config = config.with_registry_format(format);
        }
        if let Some(rules) = self.naming_table {
            config = config.with_pattern_table(GroupPatternTable::new(rules));
        }
        config.validate()?;
        Ok(config)
    }
}
