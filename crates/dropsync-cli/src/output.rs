//! Terminal output helpers: format selection, report rendering, and the
//! resumable-transfer progress bar.

use std::io::Write;
use std::path::Path;

use dropsync_core::ports::ProgressFn;
use dropsync_sync::orchestrator::{UploadOutcome, UploadReport};

/// Output format selector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Human,
    Json,
}

/// Trait for formatting CLI output
pub trait OutputFormatter {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
    fn warn(&self, message: &str);
    fn info(&self, message: &str);
    fn print_json(&self, value: &serde_json::Value);
}

/// Human-readable output formatter with checkmarks and indentation
pub struct HumanFormatter;

impl OutputFormatter for HumanFormatter {
    fn success(&self, message: &str) {
        println!("\u{2713} {}", message);
    }
    fn error(&self, message: &str) {
        eprintln!("\u{2717} Error: {}", message);
    }
    fn warn(&self, message: &str) {
        eprintln!("\u{26a0} Warning: {}", message);
    }
    fn info(&self, message: &str) {
        println!("  {}", message);
    }
    fn print_json(&self, _value: &serde_json::Value) {
        // Human formatter doesn't print JSON
    }
}

/// JSON output formatter
pub struct JsonFormatter;

impl OutputFormatter for JsonFormatter {
    fn success(&self, message: &str) {
        println!(
            "{}",
            serde_json::json!({"success": true, "message": message})
        );
    }
    fn error(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"success": false, "error": message})
        );
    }
    fn warn(&self, message: &str) {
        eprintln!(
            "{}",
            serde_json::json!({"level": "warning", "message": message})
        );
    }
    fn info(&self, _message: &str) {}
    fn print_json(&self, value: &serde_json::Value) {
        println!(
            "{}",
            serde_json::to_string_pretty(value).unwrap_or_default()
        );
    }
}

pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonFormatter)
    } else {
        Box::new(HumanFormatter)
    }
}

// ============================================================================
// Report rendering
// ============================================================================

/// Prints one terminal report in the selected format
///
/// Human output renders the entry tree with one line per entry; JSON
/// output emits the whole report as a single document.
pub fn print_report(fmt: &dyn OutputFormatter, report: &UploadReport, format: OutputFormat) {
    if format == OutputFormat::Json {
        match serde_json::to_value(report) {
            Ok(value) => fmt.print_json(&value),
            Err(err) => fmt.error(&format!("cannot serialize report: {err}")),
        }
        return;
    }
    print_report_lines(fmt, report, 0);
}

fn print_report_lines(fmt: &dyn OutputFormatter, report: &UploadReport, depth: usize) {
    let indent = "  ".repeat(depth);
    let name = entry_label(&report.path);
    match &report.outcome {
        UploadOutcome::Uploaded {
            remote_id,
            strategy,
        } => {
            fmt.success(&format!("{indent}{name} uploaded ({strategy}, id {remote_id})"));
        }
        UploadOutcome::FolderCreated { folder, children } => {
            let failed: usize = children.iter().map(UploadReport::failure_count).sum();
            if failed == 0 {
                fmt.success(&format!(
                    "{indent}{name}/ mirrored as '{}' ({} entries)",
                    folder.name,
                    children.len()
                ));
            } else {
                fmt.warn(&format!(
                    "{indent}{name}/ mirrored as '{}' with {failed} failed entries",
                    folder.name
                ));
            }
            for child in children {
                print_report_lines(fmt, child, depth + 1);
            }
        }
        UploadOutcome::Failed { reason } => {
            fmt.error(&format!("{indent}{name}: {reason}"));
        }
    }
}

/// Last path component, falling back to the full path
fn entry_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// Progress bar
// ============================================================================

const PROGRESS_SLOTS: u64 = 20;

/// Renders the fixed-width bar segment, e.g. `[########------------]  42%`
fn render_bar(sent: u64, total: u64) -> String {
    let (filled, percent) = if total == 0 {
        (PROGRESS_SLOTS, 100)
    } else {
        (
            (sent.saturating_mul(PROGRESS_SLOTS) / total).min(PROGRESS_SLOTS),
            (sent.saturating_mul(100) / total).min(100),
        )
    };
    let empty = PROGRESS_SLOTS - filled;
    format!(
        "[{}{}] {percent:>3}%",
        "#".repeat(filled as usize),
        "-".repeat(empty as usize)
    )
}

/// Builds a progress callback that rewrites one console line per chunk
///
/// The line is terminated with a newline once the transfer reports its
/// final byte.
pub fn progress_printer(path: &Path) -> ProgressFn {
    let name = entry_label(path);
    Box::new(move |sent, total| {
        print!("\r{} {}", render_bar(sent, total), name);
        let _ = std::io::stdout().flush();
        if sent >= total {
            println!();
        }
    })
}

// ============================================================================
// Unit tests
// ============================================================================
