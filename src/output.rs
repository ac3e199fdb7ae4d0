//! Plain-text report rendering
//!
//! Turns assembled report rows into the per-environment blocks printed on
//! stdout. All layout decisions live here; the report module only produces
//! data.

use crate::parser::types::Warnings;
use crate::report::{ReportRow, VersionStatus};
use crate::version::Version;

const PACKAGE_WIDTH: usize = 20;
const VERSION_WIDTH: usize = 8;
const DATE_WIDTH: usize = 15;

/// Render one environment's report block.
pub fn render_environment(name: &str, rows: &[ReportRow], warnings: &Warnings) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {name} ===\n\n"));
    out.push_str("Version summary\n\n");
    out.push_str(&format!(
        "  {:<PACKAGE_WIDTH$}  {:<VERSION_WIDTH$}  {:<DATE_WIDTH$}  {:<VERSION_WIDTH$}  {:<DATE_WIDTH$}  {}\n",
        "Package", "Required", "Required (date)", "Policy", "Policy (date)", "Status"
    ));
    for row in rows {
        out.push_str(&format!(
            "  {:<PACKAGE_WIDTH$}  {:<VERSION_WIDTH$}  {:<DATE_WIDTH$}  {:<VERSION_WIDTH$}  {:<DATE_WIDTH$}  {}\n",
            row.package,
            version_cell(row.required_version.as_ref()),
            date_cell(row.required_date),
            row.policy_version.to_string(),
            date_cell(row.policy_date),
            status_cell(row),
        ));
    }

    if warnings.values().any(|messages| !messages.is_empty()) {
        out.push_str("\nWarnings\n\n");
        for (package, messages) in warnings {
            let mut package_cell = package.as_str();
            for message in messages {
                out.push_str(&format!("  {package_cell:<PACKAGE_WIDTH$}  {message}\n"));
                package_cell = "";
            }
        }
    }

    out.push('\n');
    out
}

fn version_cell(version: Option<&Version>) -> String {
    version.map(Version::to_string).unwrap_or_default()
}

fn date_cell(date: Option<chrono::NaiveDate>) -> String {
    date.map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// An `>` on an ignored package is a tolerated violation; say so instead of
/// leaving the symbol looking like a failure.
fn status_cell(row: &ReportRow) -> String {
    if row.status == VersionStatus::Above && row.ignored {
        format!("{} (ignored)", row.status.symbol())
    } else {
        row.status.symbol().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use indexmap::IndexMap;

    fn row(package: &str, required: Option<&str>, status: VersionStatus) -> ReportRow {
        ReportRow {
            package: package.to_string(),
            required_version: required.map(|v| v.parse().unwrap()),
            required_date: required
                .map(|_| NaiveDate::from_ymd_opt(2023, 12, 5).unwrap()),
            policy_version: "1.23".parse().unwrap(),
            policy_date: Some(NaiveDate::from_ymd_opt(2023, 6, 9).unwrap()),
            status,
            ignored: false,
        }
    }

    /// Collapse runs of spaces so assertions do not depend on column widths.
    fn squeeze(text: &str) -> String {
        let mut squeezed = String::with_capacity(text.len());
        let mut last_was_space = false;
        for c in text.chars() {
            if c == ' ' {
                if !last_was_space {
                    squeezed.push(c);
                }
                last_was_space = true;
            } else {
                squeezed.push(c);
                last_was_space = false;
            }
        }
        squeezed
    }

    #[test]
    fn renders_one_line_per_row_under_the_header() {
        let rows = vec![
            row("numpy", Some("1.24"), VersionStatus::Above),
            row("pandas", None, VersionStatus::Unpinned),
        ];

        let rendered = squeeze(&render_environment("default", &rows, &IndexMap::new()));

        assert!(rendered.starts_with("=== default ===\n"));
        assert!(rendered.contains(
            "Package Required Required (date) Policy Policy (date) Status"
        ));
        assert!(rendered.contains("numpy 1.24 2023-12-05 1.23 2023-06-09 >"));
        // Unpinned rows leave the required columns empty.
        assert!(rendered.contains("pandas 1.23 2023-06-09 !"));
        assert!(!rendered.contains("Warnings"));
    }

    #[test]
    fn ignored_above_status_is_labelled() {
        let mut ignored_row = row("numpy", Some("1.24"), VersionStatus::Above);
        ignored_row.ignored = true;

        let rendered = render_environment("default", &[ignored_row], &IndexMap::new());

        assert!(rendered.contains("> (ignored)"));
    }

    #[test]
    fn warnings_are_grouped_by_package() {
        let warnings = IndexMap::from([
            (
                "numpy".to_string(),
                vec!["first warning".to_string(), "second warning".to_string()],
            ),
            ("scipy".to_string(), Vec::new()),
        ]);

        let rendered = render_environment("default", &[], &warnings);

        assert!(rendered.contains("Warnings"));
        assert!(squeeze(&rendered).contains("numpy first warning"));
        // Follow-up messages leave the package column blank.
        assert!(rendered.contains("  second warning\n"));
        // Packages without warnings do not get a row.
        assert!(!rendered.contains("scipy"));
    }

    #[test]
    fn warnings_section_is_omitted_when_empty() {
        let warnings = IndexMap::from([("numpy".to_string(), Vec::new())]);
        let rendered = render_environment("default", &[], &warnings);
        assert!(!rendered.contains("Warnings"));
    }
}
