//! HTML report (report.html).

use super::{sections, ReportContext, ReportRenderer, REPORT_TITLE};

const STYLE: &str = "\
body { font-family: Arial, sans-serif; margin: 20px; }
table { width: 100%; border-collapse: collapse; }
th, td { border: 1px solid #ddd; padding: 8px; text-align: left; vertical-align: top; }
th { background-color: #f2f2f2; }
td.clean { color: #2e7d32; }
td.drift { color: #c62828; }
pre { margin: 0; white-space: pre-wrap; }";

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Single-page HTML report with a validations/details table.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlRenderer;

impl ReportRenderer for HtmlRenderer {
    fn name(&self) -> &'static str {
        "html"
    }

    fn file_name(&self) -> &'static str {
        "report.html"
    }

    fn render(&self, ctx: &ReportContext<'_>) -> String {
        let mut html = String::new();

        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        html.push_str(&format!("<title>{REPORT_TITLE}</title>\n"));
        html.push_str(&format!("<style>\n{STYLE}\n</style>\n</head>\n<body>\n"));
        html.push_str(&format!("<h1>{REPORT_TITLE}</h1>\n"));
        html.push_str(&format!(
            "<p>Generated {} from <code>{}</code> and <code>{}</code>.</p>\n",
            escape_html(&ctx.timestamp()),
            escape_html(&ctx.registry_label),
            escape_html(&ctx.inventory_label)
        ));
        html.push_str(&format!(
            "<p><strong>{}</strong></p>\n",
            escape_html(&ctx.verdict())
        ));

        html.push_str("<table>\n<tr><th>Validation</th><th>Details</th></tr>\n");
        for section in sections(ctx.reconciliation) {
            let class = if section.is_clean() { "clean" } else { "drift" };
            let details = section
                .body()
                .iter()
                .map(|entry| escape_html(entry))
                .collect::<Vec<_>>()
                .join("\n");
            html.push_str(&format!(
                "<tr><td>{}</td><td class=\"{class}\"><pre>{details}</pre></td></tr>\n",
                escape_html(section.title)
            ));
        }
        html.push_str("</table>\n</body>\n</html>\n");

        html
    }
}
