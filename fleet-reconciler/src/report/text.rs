//! Plain-text report (report.txt).

use super::{sections, ReportContext, ReportRenderer, REPORT_TITLE};

const RULE_WIDTH: usize = 56;

/// Sectioned plain-text report.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl ReportRenderer for TextRenderer {
    fn name(&self) -> &'static str {
        "text"
    }

    fn file_name(&self) -> &'static str {
        "report.txt"
    }

    fn render(&self, ctx: &ReportContext<'_>) -> String {
        let rule = "=".repeat(RULE_WIDTH);
        let mut report = String::new();

        report.push_str(REPORT_TITLE);
        report.push('\n');
        report.push_str(&rule);
        report.push('\n');
        report.push_str(&format!("Generated: {}\n", ctx.timestamp()));
        report.push_str(&format!("Registry:  {}\n", ctx.registry_label));
        report.push_str(&format!("Inventory: {}\n", ctx.inventory_label));
        report.push_str(&format!(
            "Servers:   {} in registry, {} in inventory\n\n",
            ctx.reconciliation.registry_servers(),
            ctx.reconciliation.inventory_servers()
        ));

        for section in sections(ctx.reconciliation) {
            report.push_str(&format!("{}:\n", section.title));
            report.push_str(&rule);
            report.push('\n');
            for entry in section.body() {
                report.push_str(&entry);
                report.push('\n');
            }
            report.push('\n');
        }

        report.push_str(&ctx.verdict());
        report.push('\n');
        report
    }
}
