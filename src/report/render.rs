use std::fmt::Write as _;

use anyhow::Result;

use super::ReportFormat;
use crate::core::{TestReport, TestStatus};

pub fn render(report: &TestReport, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Json => render_json(report),
        ReportFormat::Html => Ok(render_html(report)),
    }
}

/// Pretty JSON (two-space indent) of `{summary, details}`.
pub fn render_json(report: &TestReport) -> Result<String> {
    let mut s = serde_json::to_string_pretty(report)?;
    s.push('\n');
    Ok(s)
}

const STYLE: &str = r#"        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 20px; background-color: #f5f5f5; }
        .container { max-width: 1200px; margin: 0 auto; background: white; padding: 30px; border-radius: 10px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .header { text-align: center; margin-bottom: 30px; border-bottom: 2px solid #007bff; padding-bottom: 20px; }
        .summary-cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 20px; margin-bottom: 30px; }
        .card { padding: 20px; border-radius: 8px; text-align: center; color: white; }
        .card p { font-size: 2em; margin: 10px 0; }
        .card.total { background: linear-gradient(135deg, #007bff, #0056b3); }
        .card.passed { background: linear-gradient(135deg, #28a745, #1e7e34); }
        .card.failed { background: linear-gradient(135deg, #dc3545, #c82333); }
        .card.duration { background: linear-gradient(135deg, #ffc107, #e0a800); color: #212529; }
        .test-case { border: 1px solid #ddd; margin: 15px 0; padding: 20px; border-radius: 8px; border-left: 5px solid #ddd; }
        .test-case.passed { background-color: #d4edda; border-left-color: #28a745; }
        .test-case.failed { background-color: #f8d7da; border-left-color: #dc3545; }
        .status.passed { color: #28a745; font-weight: bold; }
        .status.failed { color: #dc3545; font-weight: bold; }
        .screenshot { max-width: 100%; max-height: 400px; margin: 10px 0; border: 1px solid #ddd; border-radius: 4px; }
        .timestamp { color: #6c757d; font-size: 0.9em; }
        .error-message { background: #fff5f5; border: 1px solid #f5c6cb; padding: 10px; border-radius: 4px; margin: 10px 0; font-family: 'Courier New', monospace; }
"#;

/// Standalone HTML page: summary cards, then one block per test. Error and
/// screenshot sections only appear for records that carry them.
pub fn render_html(report: &TestReport) -> String {
    let mut out = String::new();
    let summary = &report.summary;

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html lang=\"en\">");
    let _ = writeln!(out, "<head>");
    let _ = writeln!(out, "    <meta charset=\"UTF-8\">");
    let _ = writeln!(
        out,
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">"
    );
    let _ = writeln!(out, "    <title>Todo App Test Execution Report</title>");
    let _ = writeln!(out, "    <style>");
    out.push_str(STYLE);
    let _ = writeln!(out, "    </style>");
    let _ = writeln!(out, "</head>");
    let _ = writeln!(out, "<body>");
    let _ = writeln!(out, "    <div class=\"container\">");
    let _ = writeln!(out, "        <div class=\"header\">");
    let _ = writeln!(out, "            <h1>Todo App Test Execution Report</h1>");
    let _ = writeln!(
        out,
        "            <p class=\"timestamp\">Generated on: {}</p>",
        escape_html(&summary.timestamp)
    );
    let _ = writeln!(out, "        </div>");

    let _ = writeln!(out, "        <div class=\"summary-cards\">");
    write_card(&mut out, "total", "Total Tests", &summary.total.to_string());
    write_card(&mut out, "passed", "Passed", &summary.passed.to_string());
    write_card(&mut out, "failed", "Failed", &summary.failed.to_string());
    write_card(
        &mut out,
        "duration",
        "Total Duration",
        &format!("{}ms", summary.duration),
    );
    let _ = writeln!(out, "        </div>");

    let _ = writeln!(out, "        <h2>Test Execution Details</h2>");
    if report.details.is_empty() {
        let _ = writeln!(out, "        <p>No test results recorded.</p>");
    }
    for test in &report.details {
        let status = test.status.as_str();
        let _ = writeln!(out, "        <div class=\"test-case {status}\">");
        let _ = writeln!(out, "            <h3>{}</h3>", escape_html(&test.title));
        let _ = writeln!(
            out,
            "            <p><strong>Status:</strong> <span class=\"status {status}\">{}</span></p>",
            status_label(test.status)
        );
        let _ = writeln!(
            out,
            "            <p><strong>Duration:</strong> {}ms</p>",
            test.duration_ms()
        );
        let _ = writeln!(
            out,
            "            <p class=\"timestamp\"><strong>Executed:</strong> {}</p>",
            escape_html(&test.timestamp)
        );
        if let Some(error) = test.error.as_deref() {
            let _ = writeln!(out, "            <div class=\"error-message\">");
            let _ = writeln!(out, "                <strong>Error Details:</strong><br>");
            let _ = writeln!(out, "                <code>{}</code>", escape_html(error));
            let _ = writeln!(out, "            </div>");
        }
        if let Some(path) = test.screenshot.as_deref() {
            let _ = writeln!(out, "            <div>");
            let _ = writeln!(out, "                <strong>Screenshot Evidence:</strong><br>");
            let _ = writeln!(
                out,
                "                <img src=\"file://{}\" alt=\"{}\" class=\"screenshot\">",
                escape_html(path),
                escape_html(&test.title)
            );
            let _ = writeln!(out, "            </div>");
        }
        let _ = writeln!(out, "        </div>");
    }

    let _ = writeln!(out, "    </div>");
    let _ = writeln!(out, "</body>");
    let _ = writeln!(out, "</html>");
    out
}

fn write_card(out: &mut String, class: &str, label: &str, value: &str) {
    let _ = writeln!(out, "            <div class=\"card {class}\">");
    let _ = writeln!(out, "                <h3>{label}</h3>");
    let _ = writeln!(out, "                <p>{value}</p>");
    let _ = writeln!(out, "            </div>");
}

fn status_label(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "PASSED",
        TestStatus::Failed => "FAILED",
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
