//! Test run reporting: aggregation, the stored latest run, and rendering
//! to JSON or HTML files.

mod aggregate;
mod export;
mod render;
mod results;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub use aggregate::aggregate;
pub use export::{
    ReportFormat, SNAPSHOT_FILE_NAME, export_report, format_date, report_file_name,
    save_snapshot,
};
pub use render::{render, render_html, render_json};
pub use results::{ResultsStore, sample_outcomes};

/// RFC 3339 in UTC with millisecond precision, the shape harnesses emit.
pub fn format_timestamp(at: OffsetDateTime) -> String {
    let at = at.to_offset(time::UtcOffset::UTC);
    let at = at
        .replace_nanosecond(u32::from(at.millisecond()) * 1_000_000)
        .unwrap_or(at);
    at.format(&Rfc3339).unwrap_or_else(|_| "unknown".to_string())
}
