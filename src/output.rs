//! CLI output formatting for the build.
//!
//! # Output Format
//!
//! ```text
//! ==> Stage: Scan
//!     ok: 5 images, 1 with SP variant, 4 measured
//!     warning: could not read dimensions of images/broken.png: ...
//! ==> Stage: HTML
//!     ok: index.html: 3 head fragments, 2 of 3 images as <picture>
//! ==> Stage: CSS
//!     FAILED: CSS error: Unexpected token ...
//! ==> Stage: JS
//!     ok: script.min.js
//! ==> Stage: Images
//!     ok: 5 files copied, 3 converted to AVIF + WebP
//! ==> Stage: Favicon
//!     skipped: no src/images/favicon.png
//! ==> Build finished with 1 failed stage (CSS): dist
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout or stderr.
//! Format functions are pure: no I/O, no side effects.

use crate::pipeline::{BuildEvent, BuildReport, Stage, StageOutcome, StageReport};
use crate::types::Warning;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

pub fn format_stage_header(stage: Stage) -> String {
    format!("==> Stage: {stage}")
}

/// One line per warning, at the given depth.
pub fn format_warnings(warnings: &[Warning], depth: usize) -> Vec<String> {
    warnings
        .iter()
        .map(|w| format!("{}warning: {w}", indent(depth)))
        .collect()
}

/// Outcome line followed by the stage's warnings.
pub fn format_stage_report(report: &StageReport) -> Vec<String> {
    let outcome = match &report.outcome {
        StageOutcome::Ok(detail) => format!("ok: {detail}"),
        StageOutcome::Skipped(reason) => format!("skipped: {reason}"),
        StageOutcome::Failed(reason) => format!("FAILED: {reason}"),
    };
    let mut lines = vec![format!("{}{outcome}", indent(1))];
    lines.extend(format_warnings(&report.warnings, 1));
    lines
}

pub fn format_build_event(event: &BuildEvent) -> Vec<String> {
    match event {
        BuildEvent::StageStarted(stage) => vec![format_stage_header(*stage)],
        BuildEvent::StageFinished(report) => format_stage_report(report),
    }
}

/// Closing line of a build.
pub fn format_build_summary(report: &BuildReport) -> Vec<String> {
    let failed: Vec<String> = report.failed().map(|r| r.stage.to_string()).collect();
    let out = report.output_dir.display();
    if failed.is_empty() {
        return vec![format!("==> Build complete: {out}")];
    }
    let noun = if failed.len() == 1 { "stage" } else { "stages" };
    vec![format!(
        "==> Build finished with {} failed {noun} ({}): {out}",
        failed.len(),
        failed.join(", ")
    )]
}

/// Print a progress event to stdout.
pub fn print_build_event(event: &BuildEvent) {
    for line in format_build_event(event) {
        println!("{}", line);
    }
}

/// Print the build summary to stdout.
pub fn print_build_summary(report: &BuildReport) {
    for line in format_build_summary(report) {
        println!("{}", line);
    }
}

/// Print warnings to stderr, keeping stdout clean for piped output.
pub fn print_warnings(warnings: &[Warning]) {
    for line in format_warnings(warnings, 0) {
        eprintln!("{}", line);
    }
}
