use std::io::Write;
use std::path::Path;

use serde::Serialize;

use consistency_core::{EngineDiagnostics, Issue, Sentence};

use crate::types::{ExportFormat, Report};

/// Export a report to the given path in the chosen format.
pub fn export_report(report: &Report, format: ExportFormat, path: &Path) -> Result<(), String> {
    let content = match format {
        ExportFormat::Markdown => export_markdown(report),
        ExportFormat::Json => export_json(report),
        ExportFormat::Text => export_text(report),
    };

    let mut file =
        std::fs::File::create(path).map_err(|e| format!("Failed to create file: {}", e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| format!("Failed to write: {}", e))?;
    Ok(())
}

fn issue_heading(index: usize, issue: &Issue) -> String {
    format!(
        "{}. [{} | {}] {}",
        index + 1,
        issue.issue_type.label(),
        issue.severity.label(),
        issue.title
    )
}

/// Markdown report. Lines are newline-joined with no trailing newline.
pub fn export_markdown(report: &Report) -> String {
    let mut lines = vec![
        "# Consistency Check Report".to_string(),
        String::new(),
        format!("Generated at: {}", report.generated_at),
        format!("Engine source: {}", report.engine_source),
        format!("Total issues: {}", report.issues.len()),
        String::new(),
        "## Issue Details".to_string(),
    ];

    for (i, issue) in report.issues.iter().enumerate() {
        lines.push(issue_heading(i, issue));
        lines.push(format!("   - Sentence ID: {}", issue.sentence_id));
        lines.push(format!("   - Description: {}", issue.detail));
    }

    lines.push(String::new());
    lines.push("## Sentences".to_string());
    for sentence in &report.sentences {
        lines.push(format!("- {}: {}", sentence.id, sentence.text));
    }

    lines.join("\n")
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: &'a str,
    engine_source: &'a str,
    total_issues: usize,
    engine: &'a EngineDiagnostics,
    issues: &'a [Issue],
    sentences: &'a [Sentence],
}

/// Pretty-printed JSON with the same ordering as the Markdown report.
pub fn export_json(report: &Report) -> String {
    let doc = JsonReport {
        generated_at: &report.generated_at,
        engine_source: &report.engine_source,
        total_issues: report.issues.len(),
        engine: &report.diagnostics,
        issues: &report.issues,
        sentences: &report.sentences,
    };
    // Plain structs of strings and numbers always serialize.
    serde_json::to_string_pretty(&doc).unwrap_or_else(|_| "{}".to_string())
}

pub fn export_text(report: &Report) -> String {
    let mut out = String::new();
    out.push_str("Consistency Check Report\n");
    out.push_str(&"=".repeat(24));
    out.push('\n');
    out.push_str(&format!("Generated at:  {}\n", report.generated_at));
    out.push_str(&format!("Engine source: {}\n", report.engine_source));
    out.push_str(&format!("Total issues:  {}\n", report.issues.len()));

    out.push_str("\nIssues\n------\n");
    if report.issues.is_empty() {
        out.push_str("(none)\n");
    }
    for (i, issue) in report.issues.iter().enumerate() {
        out.push_str(&issue_heading(i, issue));
        out.push('\n');
        out.push_str(&format!("   Sentence: {}\n", issue.sentence_id));
        out.push_str(&format!("   {}\n", issue.detail));
    }

    out.push_str("\nSentences\n---------\n");
    for sentence in &report.sentences {
        out.push_str(&format!("[{}] {}\n", sentence.id, sentence.text));
    }
    out
}
