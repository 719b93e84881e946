use anyhow::Error;
use std::io::{self, Write};
use unicode_width::UnicodeWidthStr;

use crate::core::{TestReport, TestStatus, Todo, TodoFilter, TodoStats};

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub color: bool,
    pub quiet: bool,
    pub verbose: bool,
}

pub fn eprintln_error(err: &Error) {
    let mut stderr = io::stderr().lock();
    let _ = writeln!(stderr, "error:");
    let _ = writeln!(stderr, "  {err}");

    let mut causes = err.chain().skip(1).peekable();
    if causes.peek().is_some() {
        let _ = writeln!(stderr, "caused by:");
        for cause in causes {
            let _ = writeln!(stderr, "  - {cause}");
        }
    }

    let _ = writeln!(stderr, "next:");
    let _ = writeln!(
        stderr,
        "  - rerun with `--verbose` (or set TODOKIT_LOG=debug) for details"
    );
    let _ = writeln!(
        stderr,
        "  - see `todokit --help` for available commands and options"
    );
}

/// Prints the list with its completion counter, or the empty-state hint.
pub fn print_todo_list(username: &str, todos: &[Todo], filter: TodoFilter, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = out.write_all(format_todo_list(username, todos, filter, cfg.color).as_bytes());
}

/// The counter always covers the whole list; `filter` only picks the rows.
pub fn format_todo_list(
    username: &str,
    todos: &[Todo],
    filter: TodoFilter,
    color: bool,
) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let stats = TodoStats::of(todos);
    let _ = writeln!(out, "Hello, {username}");
    if todos.is_empty() {
        let _ = writeln!(out, "No tasks yet. Add a new one!");
        return out;
    }
    let _ = writeln!(out, "Completed: {}/{}", stats.completed, stats.total);
    if filter != TodoFilter::All {
        let _ = writeln!(out, "Showing: {filter}");
    }
    let _ = writeln!(out);

    let shown: Vec<&Todo> = todos.iter().filter(|t| filter.matches(t)).collect();
    if shown.is_empty() {
        let _ = writeln!(out, "No {filter} tasks.");
        return out;
    }
    let id_width = shown
        .iter()
        .map(|t| t.id.to_string().len())
        .max()
        .unwrap_or(1);
    for todo in shown {
        let _ = writeln!(out, "{}", format_todo_line(todo, id_width, color));
    }
    out
}

pub fn format_todo_line(todo: &Todo, id_width: usize, color: bool) -> String {
    let mark = if todo.completed { "[x]" } else { "[ ]" };
    let id = format!("#{:<id_width$}", todo.id.to_string());
    let line = format!("{mark} {id}  {}", todo.text);
    if color && todo.completed {
        paint(&line, "90")
    } else {
        line
    }
}

pub fn print_todo(todo: &Todo, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    println!("{}", format_todo_line(todo, 1, cfg.color));
}

/// Notes a request that left state unchanged.
pub fn print_unchanged(reason: &str, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    eprintln!("nothing changed: {reason}");
}

pub fn print_report(report: &TestReport, cfg: &UiConfig) {
    if cfg.quiet {
        return;
    }
    let mut out = io::stdout().lock();
    let _ = out.write_all(format_report(report, cfg.color, cfg.verbose).as_bytes());
}

pub fn format_report(report: &TestReport, color: bool, verbose: bool) -> String {
    use std::fmt::Write as _;

    let mut out = String::new();
    let s = &report.summary;
    let _ = writeln!(
        out,
        "Summary: total={} passed={} failed={} duration={}ms",
        s.total, s.passed, s.failed, s.duration
    );
    if report.details.is_empty() {
        let _ = writeln!(out, "No test results available. Run tests to see results here.");
        return out;
    }

    let title_width = report
        .details
        .iter()
        .map(|d| UnicodeWidthStr::width(d.title.as_str()))
        .max()
        .unwrap_or(0);

    let _ = writeln!(out);
    for d in &report.details {
        let status = format_status(d.status, color);
        let _ = writeln!(
            out,
            "- {}  {}  {:>6}ms  {}",
            pad_end_display(&d.title, title_width),
            status,
            d.duration_ms(),
            d.timestamp
        );
        if let Some(error) = d.error.as_deref() {
            let _ = writeln!(out, "    error: {error}");
        }
        if verbose {
            if let Some(path) = d.screenshot.as_deref() {
                let _ = writeln!(out, "    screenshot: {path}");
            }
        }
    }
    out
}

fn format_status(status: TestStatus, color: bool) -> String {
    let label = match status {
        TestStatus::Passed => "PASSED",
        TestStatus::Failed => "FAILED",
    };
    if !color {
        return label.to_string();
    }
    let code = match status {
        TestStatus::Passed => "32",
        TestStatus::Failed => "31",
    };
    paint(label, code)
}

fn paint(s: &str, code: &str) -> String {
    format!("\x1b[{code}m{s}\x1b[0m")
}

fn pad_end_display(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    if w >= width {
        return s.to_string();
    }
    format!("{s}{}", " ".repeat(width - w))
}
