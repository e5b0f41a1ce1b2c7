//! Check command orchestration.
//!
//! Loads both inputs, reconciles them and renders the selected reports either
//! into the output directory or into a string for standard output.

use std::collections::BTreeMap;
use std::path::PathBuf;

use fleet_fs::Filesystem;
use fleet_reconciler::engine::{reconcile, ReconcileInput};
use fleet_reconciler::inventory::{flatten, FlattenedInventory};
use fleet_reconciler::report::{ReportContext, ReportRenderer};
use fleet_reconciler::{
    Clock, HtmlRenderer, ReconcileConfig, SummaryBuilder, TableRenderer, TextRenderer,
};
use fleet_schema::DiscrepancyKind;

use crate::cli::{CheckArgs, OutputFormat};
use crate::io::{load_config, load_inventory, load_registry, OutputWriter};
use crate::logger::Logger;

use super::CommandResult;

/// Result of check command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub registry_servers: usize,
    pub inventory_servers: usize,
    pub discrepancy_count: usize,
    pub counts: BTreeMap<DiscrepancyKind, usize>,
    /// Files written to the output directory.
    pub written: Vec<PathBuf>,
    /// Renderings destined for standard output.
    pub console: String,
    pub fail_on_drift: bool,
}

impl CheckResult {
    pub fn is_clean(&self) -> bool {
        self.discrepancy_count == 0
    }

    /// True when drift should turn into a failing exit status.
    pub fn should_fail(&self) -> bool {
        self.fail_on_drift && !self.is_clean()
    }
}

fn renderer_for(format: OutputFormat) -> Option<&'static dyn ReportRenderer> {
    match format {
        OutputFormat::Text => Some(&TextRenderer),
        OutputFormat::Html => Some(&HtmlRenderer),
        OutputFormat::Table => Some(&TableRenderer),
        OutputFormat::Json => None,
    }
}

/// Build the effective config: file (or defaults), then CLI overrides.
fn build_config<F: Filesystem>(args: &CheckArgs, fs: &F) -> CommandResult<ReconcileConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(fs, path)?,
        None => ReconcileConfig::default(),
    };
    if let Some(delimiter) = args.delimiter {
        let format = config.registry_format.clone().with_delimiter(delimiter);
        config = config.with_registry_format(format);
    }
    config.validate()?;
    Ok(config)
}

fn warn_duplicates(inventory: &FlattenedInventory, logger: &dyn Logger) {
    for dup in &inventory.duplicate_placements {
        logger.warn(&format!(
            "host {} is listed in region groups {} and {}; using {}",
            dup.host, dup.replaced_group, dup.kept_group, dup.kept_group
        ));
    }
}

/// Execute the check command.
pub fn execute_check<F, C>(
    args: &CheckArgs,
    fs: &F,
    clock: &C,
    logger: &dyn Logger,
) -> CommandResult<CheckResult>
where
    F: Filesystem,
    C: Clock,
{
    args.validate()?;
    let config = build_config(args, fs)?;

    let registry = load_registry(fs, &args.registry, &config.registry_format, logger)?;
    logger.verbose(&format!(
        "registry: {} servers from {} records",
        registry.len(),
        registry.record_count()
    ));

    let document = load_inventory(fs, &args.inventory)?;
    let inventory = flatten(&document.root, &config);
    warn_duplicates(&inventory, logger);
    logger.verbose(&format!(
        "inventory: {} hosts in {} region groups, {} control groups",
        inventory.host_count(),
        inventory.region_groups.len(),
        inventory.control_groups.len()
    ));

    let reconciliation = reconcile(&ReconcileInput::new(&registry, &inventory, &config));
    for (kind, count) in reconciliation.counts() {
        if count > 0 {
            logger.debug(&format!("{kind}: {count}"));
        }
    }

    let ctx = ReportContext::new(
        &reconciliation,
        args.registry.display().to_string(),
        args.inventory.display().to_string(),
        clock.now(),
    );
    let summary = SummaryBuilder::new(&ctx)
        .with_registry(&registry)
        .with_inventory(&inventory)
        .build();

    let formats = args.effective_formats();
    let renderers: Vec<&dyn ReportRenderer> =
        formats.iter().filter_map(|&format| renderer_for(format)).collect();
    let with_summary = formats.contains(&OutputFormat::Json);

    let mut written = Vec::new();
    let mut console = String::new();
    match &args.out_dir {
        Some(out_dir) => {
            let writer = OutputWriter::new(fs, out_dir);
            written = writer
                .write_all(&ctx, &renderers, with_summary.then_some(&summary))?
                .paths;
            for path in &written {
                logger.info(&format!("wrote {}", path.display()));
            }
        }
        None => {
            for renderer in &renderers {
                console.push_str(&renderer.render(&ctx));
            }
            if with_summary {
                console.push_str(&summary.to_json());
                console.push('\n');
            }
        }
    }

    logger.info(&ctx.verdict());

    Ok(CheckResult {
        registry_servers: reconciliation.registry_servers(),
        inventory_servers: reconciliation.inventory_servers(),
        discrepancy_count: reconciliation.len(),
        counts: reconciliation.counts(),
        written,
        console,
        fail_on_drift: args.fail_on_drift,
    })
}
