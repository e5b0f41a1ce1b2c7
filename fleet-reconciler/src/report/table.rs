//! Console table rendering.

use super::{sections, ReportContext, ReportRenderer, REPORT_TITLE};

const HEADERS: [&str; 2] = ["Validation", "Details"];

/// Two-column `Validation | Details` table for terminals.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableRenderer;

fn border(widths: [usize; 2]) -> String {
    format!("+{}+{}+\n", "-".repeat(widths[0] + 2), "-".repeat(widths[1] + 2))
}

fn row(widths: [usize; 2], left: &str, right: &str) -> String {
    format!(
        "| {left:<w0$} | {right:<w1$} |\n",
        w0 = widths[0],
        w1 = widths[1]
    )
}

impl ReportRenderer for TableRenderer {
    fn name(&self) -> &'static str {
        "table"
    }

    fn file_name(&self) -> &'static str {
        "report.table.txt"
    }

    fn render(&self, ctx: &ReportContext<'_>) -> String {
        // Each cell line becomes one physical row; the title only on the first.
        let rows: Vec<(&'static str, Vec<String>)> = sections(ctx.reconciliation)
            .into_iter()
            .map(|section| {
                let lines = section
                    .body()
                    .iter()
                    .flat_map(|entry| entry.lines().map(str::to_string).collect::<Vec<_>>())
                    .collect();
                (section.title, lines)
            })
            .collect();

        let left = rows
            .iter()
            .map(|(title, _)| title.chars().count())
            .chain([HEADERS[0].len()])
            .max()
            .unwrap_or(0);
        let right = rows
            .iter()
            .flat_map(|(_, lines)| lines.iter().map(|l| l.chars().count()))
            .chain([HEADERS[1].len()])
            .max()
            .unwrap_or(0);
        let widths = [left, right];

        let mut out = String::new();
        out.push_str(REPORT_TITLE);
        out.push('\n');
        out.push_str(&border(widths));
        out.push_str(&row(widths, HEADERS[0], HEADERS[1]));
        out.push_str(&border(widths).replace('-', "="));
        for (title, lines) in &rows {
            for (i, line) in lines.iter().enumerate() {
                let label = if i == 0 { *title } else { "" };
                out.push_str(&row(widths, label, line));
            }
            out.push_str(&border(widths));
        }
        out.push_str(&ctx.verdict());
        out.push('\n');
        out
    }
}
