use std::fmt;
use std::str::FromStr;

use consistency_core::{EngineDiagnostics, Issue, RunState, Sentence};

/// Default file name for a Markdown export.
pub const REPORT_FILE_NAME: &str = "paper-consistency-report.md";

/// Export format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Markdown,
    Json,
    Text,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Markdown, ExportFormat::Json, ExportFormat::Text]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Json => "JSON",
            Self::Text => "Plain Text",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Json => "json",
            Self::Text => "txt",
        }
    }

    /// `paper-consistency-report.<ext>`
    pub fn default_file_name(self) -> String {
        format!("paper-consistency-report.{}", self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" | "markdown" => Ok(Self::Markdown),
            "json" => Ok(Self::Json),
            "txt" | "text" => Ok(Self::Text),
            other => Err(format!(
                "unknown format '{}' (expected md, json, or text)",
                other
            )),
        }
    }
}

/// Snapshot of a finished run, ready for export.
///
/// Always holds the full result set; the active filter never applies here.
#[derive(Debug, Clone)]
pub struct Report {
    pub generated_at: String,
    pub engine_source: String,
    pub diagnostics: EngineDiagnostics,
    pub sentences: Vec<Sentence>,
    pub issues: Vec<Issue>,
}

impl Report {
    /// Capture the current results, stamped with the local time.
    pub fn from_state(state: &RunState) -> Self {
        let now = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
        Self::with_timestamp(state, now)
    }

    pub fn with_timestamp(state: &RunState, generated_at: impl Into<String>) -> Self {
        Self {
            generated_at: generated_at.into(),
            engine_source: state.engine_source().to_string(),
            diagnostics: state.diagnostics().clone(),
            sentences: state.sentences().to_vec(),
            issues: state.issues().to_vec(),
        }
    }
}
