//! Operator-facing reports.
//!
//! Discrepancies are grouped into fixed sections once (`sections`); each
//! `ReportRenderer` only decides how those sections look.

mod html;
mod table;
mod text;

use chrono::{DateTime, SecondsFormat, Utc};
use fleet_schema::{CellSet, Discrepancy, DiscrepancyKind};

use crate::engine::Reconciliation;

pub use html::HtmlRenderer;
pub use table::TableRenderer;
pub use text::TextRenderer;

/// Title shared by every rendering.
pub const REPORT_TITLE: &str = "Fleet Inventory Validation Report";

/// Inputs to a rendering.
#[derive(Debug, Clone)]
pub struct ReportContext<'a> {
    pub reconciliation: &'a Reconciliation,
    /// How the registry input is named in the report (usually its path).
    pub registry_label: String,
    pub inventory_label: String,
    pub generated_at: DateTime<Utc>,
}

impl<'a> ReportContext<'a> {
    pub fn new(
        reconciliation: &'a Reconciliation,
        registry_label: impl Into<String>,
        inventory_label: impl Into<String>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            reconciliation,
            registry_label: registry_label.into(),
            inventory_label: inventory_label.into(),
            generated_at,
        }
    }

    pub fn timestamp(&self) -> String {
        self.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// One-line verdict.
    pub fn verdict(&self) -> String {
        match self.reconciliation.len() {
            0 => "CLEAN: no discrepancies found".to_string(),
            1 => "DRIFT: 1 discrepancy found".to_string(),
            n => format!("DRIFT: {n} discrepancies found"),
        }
    }
}

/// A report output format.
pub trait ReportRenderer {
    /// Short format name (`text`, `html`, `table`).
    fn name(&self) -> &'static str;

    /// File name used when the rendering is written to an output directory.
    fn file_name(&self) -> &'static str;

    fn render(&self, ctx: &ReportContext<'_>) -> String;
}

/// One report section: a title and one entry per finding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: &'static str,
    /// Entries may span several lines.
    pub entries: Vec<String>,
    /// Shown instead of entries when there are none.
    pub clean_message: &'static str,
}

impl Section {
    pub fn is_clean(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, or the clean message.
    pub fn body(&self) -> Vec<String> {
        if self.entries.is_empty() {
            vec![self.clean_message.to_string()]
        } else {
            self.entries.clone()
        }
    }
}

struct SectionLayout {
    title: &'static str,
    clean_message: &'static str,
    kinds: &'static [DiscrepancyKind],
}

const SECTIONS: &[SectionLayout] = &[
    SectionLayout {
        title: "Missing servers in inventory",
        clean_message: "All registry servers are present in the inventory.",
        kinds: &[DiscrepancyKind::MissingInInventory],
    },
    SectionLayout {
        title: "Extra servers in inventory",
        clean_message: "No extra servers found in the inventory.",
        kinds: &[DiscrepancyKind::MissingInRegistry],
    },
    SectionLayout {
        title: "Cell names",
        clean_message: "All cell names match.",
        kinds: &[DiscrepancyKind::CellMismatch],
    },
    SectionLayout {
        title: "Region group placement",
        clean_message: "All servers are in their expected region groups.",
        kinds: &[DiscrepancyKind::GroupPlacementMismatch],
    },
    SectionLayout {
        title: "Server type groups",
        clean_message: "All servers are in the correct server type groups.",
        kinds: &[DiscrepancyKind::ClassificationMismatch],
    },
    SectionLayout {
        title: "Control groups",
        clean_message: "Control groups are balanced for high availability.",
        kinds: &[
            DiscrepancyKind::ControlGroupImbalance,
            DiscrepancyKind::ControlGroupTotalImbalance,
            DiscrepancyKind::UnassignedServers,
        ],
    },
];

/// Group discrepancies into the fixed report sections, in order.
pub fn sections(reconciliation: &Reconciliation) -> Vec<Section> {
    SECTIONS
        .iter()
        .map(|layout| Section {
            title: layout.title,
            entries: reconciliation
                .discrepancies()
                .iter()
                .filter(|d| layout.kinds.contains(&d.kind()))
                .map(describe)
                .collect(),
            clean_message: layout.clean_message,
        })
        .collect()
}

fn join_cells(cells: &CellSet) -> String {
    if cells.is_empty() {
        "(none)".to_string()
    } else {
        cells.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
    }
}

fn or_none(group: &Option<String>) -> &str {
    group.as_deref().unwrap_or("no group")
}

/// Human-readable description of one discrepancy.
pub fn describe(discrepancy: &Discrepancy) -> String {
    match discrepancy {
        Discrepancy::MissingInInventory {
            server,
            cells,
            suggested_group,
        } => format!(
            "{server} (new server, should be under group: {suggested_group}; cells: {})",
            join_cells(cells)
        ),
        Discrepancy::MissingInRegistry { server, group } => {
            format!("{server} (group: {})", or_none(group))
        }
        Discrepancy::CellMismatch {
            server,
            group,
            expected,
            actual,
            missing,
            extra,
        } => {
            let mut out = format!(
                "Server: {server} (group: {})\n  Registry cells: {}\n  Inventory cells: {}",
                or_none(group),
                join_cells(expected),
                join_cells(actual)
            );
            if !missing.is_empty() {
                out.push_str(&format!("\n  Missing cells: {}", join_cells(missing)));
            }
            if !extra.is_empty() {
                out.push_str(&format!("\n  Extra cells: {}", join_cells(extra)));
            }
            out
        }
        Discrepancy::GroupPlacementMismatch {
            server,
            found,
            expected,
        } => format!(
            "{server}: found in {}, expected in {expected}",
            or_none(found)
        ),
        Discrepancy::ClassificationMismatch {
            server,
            classification,
            found,
            expected,
        } => match found {
            Some(found) => format!("{server} ({classification}): in {found}, should be in {expected}"),
            None => format!("{server} ({classification}): in no server type group, should be in {expected}"),
        },
        Discrepancy::ControlGroupImbalance {
            site,
            control_group,
            dev_count,
            prod_count,
            dev_servers,
            prod_servers,
        } => format!(
            "{control_group} at {site}: {dev_count} dev ({}) vs {prod_count} prod ({})",
            dev_servers.join(", "),
            prod_servers.join(", ")
        ),
        Discrepancy::ControlGroupTotalImbalance {
            dev_count,
            prod_count,
        } => format!(
            "Total dev servers ({dev_count}) do not match total prod servers ({prod_count}) across control groups"
        ),
        Discrepancy::UnassignedServers {
            expected_total,
            assigned_total,
            servers,
        } => format!(
            "{assigned_total} of {expected_total} registry servers are in a control group; unassigned: {}",
            servers.join(", ")
        ),
    }
}
