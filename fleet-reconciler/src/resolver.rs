//! Naming-convention resolver: server name -> expected region group.

use std::fmt;

use fleet_schema::UNKNOWN_GROUP;
use serde::{Deserialize, Serialize};

/// Production naming convention, in match order.
const DEFAULT_RULES: &[(&str, &str)] = &[
    ("lauau2pefs", "l_aja_ausy01sr1"),
    ("lauau1cefs", "l_aja_ausy02sr1"),
    ("lcnhk01efs", "l_aja_cnhk01"),
    ("lcnhk02efs", "l_aja_cnhk02"),
    ("linch07efs", "l_aja_inch07sr1"),
    ("linin0cefs", "l_aja_inmu02sr1"),
    ("linin8pefs", "l_aja_inmu01sr1"),
    ("linmu08efs", "l_aja_inmu08sr1"),
    ("ljpsa01efs", "l_aja_jpsa01"),
    ("ljpnz01efs", "l_aja_jpnz01"),
    ("ljptk01efs", "l_aja_jptk01"),
    ("lkrkr0pefs", "l_aja_kray01sr1"),
    ("lkrkr0cefs", "l_aja_krse01sr2"),
    ("lsgsg01efs", "l_aja_sgsg01"),
    ("lsgsg02efs", "l_aja_sgsg02"),
    ("ltwtp04efs", "l_aja_twtp04"),
    ("ltwtw0pefs", "l_aja_twty01sr1"),
    ("lukcm01efs", "l_emea_ukcm01"),
    ("lukwg01efs", "l_emea_ukwg01"),
    ("lusaz01efs", "l_amrs_usaz01"),
    ("lusaz07efs", "l_amrs_usaz07"),
    ("lusil05efs", "l_amrs_usil05"),
    ("luspa01efs", "l_amrs_uspa01"),
    ("lustx02efs", "l_amrs_ustx02"),
    ("lusva01efs", "l_amrs_usva01"),
];

/// One naming rule: servers whose name starts with `prefix` belong in `group`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternRule {
    pub prefix: String,
    pub group: String,
}

impl PatternRule {
    pub fn new(prefix: impl Into<String>, group: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            group: group.into(),
        }
    }

    pub fn matches(&self, name: &str) -> bool {
        name.starts_with(&self.prefix)
    }
}

/// Result of resolving a server name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedGroup<'a> {
    Matched(&'a str),
    Unknown,
}

impl<'a> ExpectedGroup<'a> {
    pub fn group(&self) -> Option<&'a str> {
        match *self {
            ExpectedGroup::Matched(group) => Some(group),
            ExpectedGroup::Unknown => None,
        }
    }

    /// Group name, or the `Unknown` sentinel.
    pub fn as_str(&self) -> &'a str {
        self.group().unwrap_or(UNKNOWN_GROUP)
    }
}

impl fmt::Display for ExpectedGroup<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered first-match naming table.
///
/// Rules are tried in insertion order and the first matching prefix wins, so
/// more specific prefixes must come before broader ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupPatternTable {
    rules: Vec<PatternRule>,
}

impl GroupPatternTable {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    /// A table that resolves every name to `Unknown`.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Builder: append a rule after all existing ones.
    pub fn with_rule(mut self, prefix: impl Into<String>, group: impl Into<String>) -> Self {
        self.rules.push(PatternRule::new(prefix, group));
        self
    }

    pub fn resolve(&self, name: &str) -> ExpectedGroup<'_> {
        self.rules
            .iter()
            .find(|rule| rule.matches(name))
            .map(|rule| ExpectedGroup::Matched(rule.group.as_str()))
            .unwrap_or(ExpectedGroup::Unknown)
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for GroupPatternTable {
    fn default() -> Self {
        Self::new(
            DEFAULT_RULES
                .iter()
                .map(|(prefix, group)| PatternRule::new(*prefix, *group))
                .collect(),
        )
    }
}
