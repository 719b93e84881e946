use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::core::TestReport;

/// File name of the harness-side snapshot written by `save_snapshot`.
pub const SNAPSHOT_FILE_NAME: &str = "test-report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Html,
    Json,
}

impl ReportFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            other => Err(format!("invalid report format: {other} (expected html|json)")),
        }
    }
}

pub fn format_date(date: Date) -> String {
    let fmt = time::macros::format_description!("[year]-[month]-[day]");
    date.format(&fmt).unwrap_or_else(|_| {
        format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    })
}

pub fn report_file_name(format: ReportFormat, date: Date) -> String {
    format!(
        "todo-app-test-report-{}.{}",
        format_date(date),
        format.extension()
    )
}

/// Renders `report` and writes it into `dir` under the dated file name,
/// replacing any file of the same name.
pub fn export_report(
    dir: &Path,
    report: &TestReport,
    format: ReportFormat,
    now: OffsetDateTime,
) -> Result<PathBuf> {
    let body = super::render(report, format)?;

    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory: {}", dir.display()))?;
    let path = dir.join(report_file_name(format, now.date()));
    std::fs::write(&path, body.as_bytes())
        .with_context(|| format!("failed to write report: {}", path.display()))?;

    tracing::info!(path = %path.display(), %format, total = report.summary.total, "exported report");
    Ok(path)
}

pub fn save_snapshot(dir: &Path, report: &TestReport) -> Result<PathBuf> {
    let body = super::render_json(report)?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create results directory: {}", dir.display()))?;
    let path = dir.join(SNAPSHOT_FILE_NAME);
    std::fs::write(&path, body.as_bytes())
        .with_context(|| format!("failed to write snapshot: {}", path.display()))?;
    Ok(path)
}
