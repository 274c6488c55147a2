//! CLI output formatting for runs and dry runs.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! Uploaded portrait.png
//!     Sent: UPLOADS/portrait_processed.jpg
//!     Attempts: 2
//!     Cleaned up: portrait.jpg, portrait_processed.jpg
//! ```
//!
//! ```text
//! Failed during uploading: gave up after 3 attempt(s): service returned status 503
//!     Image: portrait.png
//!     Attempts: 3
//! ```
//!
//! ## Check
//!
//! ```text
//! Candidates (newest first)
//! 001 fog.jpg (uploaded)
//! 002 harbour.png ← next
//! 003 lighthouse.jpg
//!
//! Caption: Song of Today: 2024-05-01
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::select::SurveyEntry;
use crate::types::{RunOutcome, RunReport};
use std::path::{Path, PathBuf};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn file_list(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| file_name(p))
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Run
// ============================================================================

/// Format the result of one run.
pub fn format_run_report(report: &RunReport) -> Vec<String> {
    let mut lines = Vec::new();
    match &report.outcome {
        RunOutcome::Succeeded { filename } => {
            lines.push(format!("Uploaded {filename}"));
            if let Some(path) = &report.upload_path {
                lines.push(format!("{}Sent: {}", indent(1), path.display()));
            }
            lines.push(format!("{}Attempts: {}", indent(1), report.attempts));
        }
        RunOutcome::Skipped(reason) => {
            lines.push(format!("Skipped: {reason}"));
        }
        RunOutcome::Failed { stage, reason } => {
            lines.push(format!("Failed during {stage}: {reason}"));
            if let Some(candidate) = &report.candidate {
                lines.push(format!("{}Image: {candidate}", indent(1)));
            }
            if report.attempts > 0 {
                lines.push(format!("{}Attempts: {}", indent(1), report.attempts));
            }
        }
    }
    if !report.removed_artifacts.is_empty() {
        lines.push(format!(
            "{}Cleaned up: {}",
            indent(1),
            file_list(&report.removed_artifacts)
        ));
    }
    lines
}

pub fn print_run_report(report: &RunReport) {
    for line in format_run_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check (dry run)
// ============================================================================

/// Format the candidate survey and the caption a run would use.
pub fn format_check_output(folder: &Path, entries: &[SurveyEntry], caption: &str) -> Vec<String> {
    let mut lines = Vec::new();
    if entries.is_empty() {
        lines.push(format!("No candidate images in {}", folder.display()));
    } else {
        lines.push("Candidates (newest first)".to_string());
        let next = entries.iter().position(|e| !e.uploaded);
        for (i, entry) in entries.iter().enumerate() {
            let marker = if entry.uploaded {
                " (uploaded)"
            } else if Some(i) == next {
                " ← next"
            } else {
                ""
            };
            lines.push(format!(
                "{} {}{}",
                format_index(i + 1),
                entry.candidate.filename,
                marker
            ));
        }
        if next.is_none() {
            lines.push(String::new());
            lines.push("Nothing new to upload".to_string());
        }
    }
    lines.push(String::new());
    lines.push(format!("Caption: {caption}"));
    lines
}

pub fn print_check_output(folder: &Path, entries: &[SurveyEntry], caption: &str) {
    for line in format_check_output(folder, entries, caption) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::select::Candidate;
    use crate::types::{SkipReason, Stage};
    use std::time::SystemTime;

    fn entry(name: &str, uploaded: bool) -> SurveyEntry {
        SurveyEntry {
            candidate: Candidate {
                filename: name.to_string(),
                path: PathBuf::from("UPLOADS").join(name),
                modified: SystemTime::UNIX_EPOCH,
                extension: "jpg".into(),
            },
            uploaded,
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn file_list_uses_bare_names() {
        let paths = vec![PathBuf::from("UPLOADS/a.jpg"), PathBuf::from("UPLOADS/a_processed.jpg")];
        assert_eq!(file_list(&paths), "a.jpg, a_processed.jpg");
    }

    // =========================================================================
    // Run report tests
    // =========================================================================

    #[test]
    fn success_report() {
        let report = RunReport {
            outcome: RunOutcome::Succeeded {
                filename: "portrait.png".into(),
            },
            candidate: Some("portrait.png".into()),
            upload_path: Some(PathBuf::from("UPLOADS/portrait_processed.jpg")),
            attempts: 2,
            removed_artifacts: vec![
                PathBuf::from("UPLOADS/portrait.jpg"),
                PathBuf::from("UPLOADS/portrait_processed.jpg"),
            ],
        };
        assert_eq!(
            format_run_report(&report),
            vec![
                "Uploaded portrait.png",
                "    Sent: UPLOADS/portrait_processed.jpg",
                "    Attempts: 2",
                "    Cleaned up: portrait.jpg, portrait_processed.jpg",
            ]
        );
    }

    #[test]
    fn skipped_report_is_one_line() {
        let report = RunReport::new(RunOutcome::Skipped(SkipReason::NothingToUpload));
        assert_eq!(format_run_report(&report), vec!["Skipped: nothing new to upload"]);
    }

    #[test]
    fn failure_report_names_stage() {
        let mut report = RunReport::new(RunOutcome::Failed {
            stage: Stage::Authenticating,
            reason: "authentication failed".into(),
        });
        report.candidate = Some("a.jpg".into());
        let lines = format_run_report(&report);
        assert_eq!(lines[0], "Failed during authenticating: authentication failed");
        assert_eq!(lines[1], "    Image: a.jpg");
        // No attempts line before uploading starts
        assert_eq!(lines.len(), 2);
    }

    // =========================================================================
    // Check output tests
    // =========================================================================

    #[test]
    fn check_marks_uploaded_and_next() {
        let entries = vec![
            entry("fog.jpg", true),
            entry("harbour.png", false),
            entry("lighthouse.jpg", false),
        ];
        let lines = format_check_output(Path::new("UPLOADS"), &entries, "Song of Today: 2024-05-01");
        assert_eq!(
            lines,
            vec![
                "Candidates (newest first)",
                "001 fog.jpg (uploaded)",
                "002 harbour.png ← next",
                "003 lighthouse.jpg",
                "",
                "Caption: Song of Today: 2024-05-01",
            ]
        );
    }

    #[test]
    fn check_all_uploaded() {
        let lines = format_check_output(Path::new("UPLOADS"), &[entry("a.jpg", true)], "c");
        assert!(lines.contains(&"Nothing new to upload".to_string()));
    }

    #[test]
    fn check_empty_folder() {
        let lines = format_check_output(Path::new("UPLOADS"), &[], "c");
        assert_eq!(lines[0], "No candidate images in UPLOADS");
    }
}
