use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::SecondsFormat;

use crate::aggregate::StatusReport;
use crate::obs::emit_report_written;

/// Placeholder cell for a package absent from a distribution.
const ABSENT_CELL: &str = "-";

/// Write the status report as pretty JSON.
pub fn write_report_json(path: &Path, report: &StatusReport) -> Result<()> {
    let content = serde_json::to_string_pretty(report).context("serialize status report")?;
    std::fs::write(path, content).with_context(|| format!("write {:?}", path))?;
    emit_report_written(path, report.packages.len());
    Ok(())
}

/// Render the markdown overview: class totals, a package x distribution
/// table, then merge conflicts if there were any.
pub fn render_summary_md(report: &StatusReport) -> String {
    let mut out = String::new();
    out.push_str("# Release Status\n\n");
    let _ = writeln!(
        out,
        "Generated: {}\n",
        report.generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );

    out.push_str("## Summary\n");
    let _ = writeln!(out, "- packages: {}", report.packages.len());
    for (class, count) in report.class_counts() {
        let _ = writeln!(out, "- {class}: {count}");
    }
    out.push('\n');

    out.push_str("## Packages\n\n");
    let _ = writeln!(out, "| package | {} |", report.distros.join(" | "));
    let _ = writeln!(
        out,
        "| --- |{}",
        " --- |".repeat(report.distros.len())
    );
    for (name, package) in &report.packages {
        let cells: Vec<String> = report
            .distros
            .iter()
            .map(|distro| match package.status.get(distro) {
                Some(c) => format!("{} {}", c.class, c.version),
                None => ABSENT_CELL.to_string(),
            })
            .collect();
        let _ = writeln!(out, "| {} | {} |", name, cells.join(" | "));
    }

    if !report.conflicts.is_empty() {
        out.push_str("\n## Merge Conflicts\n");
        for conflict in &report.conflicts {
            let _ = writeln!(out, "- {conflict}");
        }
    }
    out
}

/// Write the markdown overview.
pub fn write_summary_md(path: &Path, report: &StatusReport) -> Result<()> {
    let md = render_summary_md(report);
    std::fs::write(path, md).with_context(|| format!("write {:?}", path))?;
    emit_report_written(path, report.packages.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::PackageReport;
    use crate::classify::{StatusClass, StatusClassification};
    use chrono::{DateTime, Utc};
    use rocks_model::{Maintainer, RepoRef};
    use serde_json::json;
    use snapshot_merge::MergeConflict;
    use std::collections::BTreeMap;

    fn report() -> StatusReport {
        let roscpp = PackageReport {
            maintainers: vec![Maintainer::new("Jane Doe", "jane@example.org")],
            repo: vec![RepoRef::new("https://github.com/ros/ros_comm", "ros_comm")],
            status: BTreeMap::from([
                (
                    "noetic".to_string(),
                    StatusClassification::new(StatusClass::Good, "released", "1.16.0"),
                ),
                (
                    "humble".to_string(),
                    StatusClassification::new(StatusClass::New, "waiting for new release", "1.17.0"),
                ),
            ]),
        };
        let rviz = PackageReport {
            maintainers: vec![],
            repo: vec![],
            status: BTreeMap::from([(
                "humble".to_string(),
                StatusClassification::new(StatusClass::Rerelease, "waiting for re-release", "11.2.5"),
            )]),
        };

        StatusReport {
            generated_at: DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                .expect("parse RFC3339")
                .with_timezone(&Utc),
            distros: vec!["noetic".to_string(), "humble".to_string()],
            packages: BTreeMap::from([("roscpp".to_string(), roscpp), ("rviz".to_string(), rviz)]),
            conflicts: vec![MergeConflict {
                package: "roscpp".to_string(),
                distro: "noetic".to_string(),
                channel: "testing".to_string(),
                os_name: "ubuntu".to_string(),
                os_code_name: "focal".to_string(),
                arch: "amd64".to_string(),
                stage: "main".to_string(),
                kept: Some("1.16.0-1focal".to_string()),
                rejected: Some("1.16.0-2focal".to_string()),
            }],
        }
    }

    #[test]
    fn report_json_has_expected_shape() {
        let raw = serde_json::to_value(report()).expect("serialize report");
        let obj = raw.as_object().expect("report object");
        assert!(obj.contains_key("generated_at"));
        assert!(obj.contains_key("distros"));
        assert!(obj.contains_key("packages"));
        assert!(obj.contains_key("conflicts"));

        let roscpp = &raw["packages"]["roscpp"];
        assert_eq!(roscpp["repo"][0]["name"], json!("ros_comm"));
        assert_eq!(roscpp["status"]["noetic"]["class"], json!("good"));
        assert_eq!(roscpp["status"]["humble"]["version"], json!("1.17.0"));
    }

    #[test]
    fn summary_markdown_render_is_stable() {
        let actual = render_summary_md(&report());
        let expected = "# Release Status\n\n\
Generated: 2026-01-01T00:00:00Z\n\n\
## Summary\n\
- packages: 2\n\
- good: 1\n\
- bad: 0\n\
- new: 1\n\
- rerelease: 1\n\
- multiple: 0\n\
- complicated: 0\n\n\
## Packages\n\n\
| package | noetic | humble |\n\
| --- | --- | --- |\n\
| roscpp | good 1.16.0 | new 1.17.0 |\n\
| rviz | - | rerelease 11.2.5 |\n\n\
## Merge Conflicts\n\
- roscpp [noetic] ubuntu/focal/amd64/main: kept 1.16.0-1focal over 1.16.0-2focal from channel testing\n";
        assert_eq!(actual, expected);
    }

    #[test]
    fn summary_markdown_omits_empty_conflicts() {
        let mut report = report();
        report.conflicts.clear();
        assert!(!render_summary_md(&report).contains("Merge Conflicts"));
    }

    #[test]
    fn writers_create_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let json_path = dir.path().join("status.json");
        let md_path = dir.path().join("status.md");

        write_report_json(&json_path, &report()).expect("write json");
        write_summary_md(&md_path, &report()).expect("write md");

        let parsed: StatusReport =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(parsed, report());
        assert!(std::fs::read_to_string(&md_path).unwrap().starts_with("# Release Status"));
    }
}
