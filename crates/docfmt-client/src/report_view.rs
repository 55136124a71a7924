//! Check reports grouped by category, rendered as HTML or text

use std::fmt::Write;

use docfmt_types::{CheckItem, CheckReport};
use html_escape::encode_text;

/// Items of one category, in report order
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub items: Vec<&'a CheckItem>,
}

impl CategoryGroup<'_> {
    pub fn passed(&self) -> usize {
        self.items.iter().filter(|item| item.passed).count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.passed()
    }

    pub fn all_passed(&self) -> bool {
        self.items.iter().all(|item| item.passed)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportView<'a> {
    pub report: &'a CheckReport,
    /// Categories in the order they first appear
    pub groups: Vec<CategoryGroup<'a>>,
}

impl<'a> ReportView<'a> {
    pub fn new(report: &'a CheckReport) -> Self {
        let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
        for item in &report.items {
            match groups.iter_mut().find(|g| g.category == item.category) {
                Some(group) => group.items.push(item),
                None => groups.push(CategoryGroup {
                    category: &item.category,
                    items: vec![item],
                }),
            }
        }
        Self { report, groups }
    }

    pub fn pass_rate(&self) -> f64 {
        self.report.pass_rate
    }

    /// Report fragment: summary followed by one section per category
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        let _ = writeln!(html, "<div class=\"check-report\">");
        let _ = writeln!(html, "  <div class=\"summary\">");
        let _ = writeln!(
            html,
            "    <p class=\"pass-rate\">{}%</p>",
            self.pass_rate()
        );
        let _ = writeln!(
            html,
            "    <p><span class=\"passed\">&#10003; {} passed</span> <span class=\"failed\">&#10005; {} failed</span></p>",
            self.report.passed_items, self.report.failed_items
        );
        let _ = writeln!(html, "  </div>");

        for group in &self.groups {
            let status = if group.all_passed() { "ok" } else { "fail" };
            let _ = writeln!(html, "  <details class=\"category\">");
            let _ = writeln!(
                html,
                "    <summary>{} <span class=\"badge {}\">{}/{}</span></summary>",
                encode_text(group.category),
                status,
                group.passed(),
                group.items.len()
            );
            let _ = writeln!(html, "    <ul>");
            for item in &group.items {
                render_item_html(&mut html, item);
            }
            let _ = writeln!(html, "    </ul>");
            let _ = writeln!(html, "  </details>");
        }

        let _ = writeln!(html, "</div>");
        html
    }

    /// Standalone page wrapping [`render_html`](Self::render_html)
    pub fn render_html_document(&self, title: &str) -> String {
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
            encode_text(title),
            self.render_html()
        )
    }

    pub fn render_text(&self) -> String {
        let mut text = String::new();
        let _ = writeln!(
            text,
            "Pass rate: {}% ({} passed, {} failed)",
            self.pass_rate(),
            self.report.passed_items,
            self.report.failed_items
        );

        for group in &self.groups {
            let _ = writeln!(
                text,
                "\n{} [{}/{}]",
                group.category,
                group.passed(),
                group.items.len()
            );
            for item in &group.items {
                if item.passed {
                    let _ = writeln!(text, "  + {}", item.name);
                    continue;
                }
                let _ = writeln!(
                    text,
                    "  x {}: current {} -> expected {}",
                    item.name, item.current, item.expected
                );
                if let Some(suggestion) = item.suggestion() {
                    let _ = writeln!(text, "      hint: {}", suggestion);
                }
            }
        }
        text
    }
}

fn render_item_html(html: &mut String, item: &CheckItem) {
    if item.passed {
        let _ = writeln!(
            html,
            "      <li class=\"passed\">&#10003; {}</li>",
            encode_text(&item.name)
        );
        return;
    }

    let _ = writeln!(html, "      <li class=\"failed\">&#10005; {}", encode_text(&item.name));
    let _ = writeln!(
        html,
        "        <p>Current: <code>{}</code> &rarr; Expected: <code>{}</code></p>",
        encode_text(&item.current),
        encode_text(&item.expected)
    );
    if let Some(suggestion) = item.suggestion() {
        let _ = writeln!(
            html,
            "        <p class=\"suggestion\">{}</p>",
            encode_text(suggestion)
        );
    }
    let _ = writeln!(html, "      </li>");
}
