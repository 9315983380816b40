//! Pure projection of [`RunState`] into plain display data.
//!
//! Front ends (the terminal renderer in the CLI, or anything else) draw a
//! [`ViewModel`] and never read the state directly.

use serde::Serialize;

use crate::model::{EngineDiagnostics, Issue, IssueFilter, IssueType, Severity};
use crate::state::{RunState, RunStatus};

pub const EMPTY_PAPER_MESSAGE: &str = "No extracted sentences available.";
pub const EMPTY_ISSUES_MESSAGE: &str = "No issues under the current filter.";

/// Stable filter: keeps source order, `All` returns every issue.
pub fn filter_issues(issues: &[Issue], filter: IssueFilter) -> Vec<&Issue> {
    issues.iter().filter(|issue| filter.matches(issue)).collect()
}

/// Counts over the displayed (filtered) issues.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KpiCounts {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl KpiCounts {
    pub fn from_issues(issues: &[&Issue]) -> Self {
        let mut kpi = Self {
            total: issues.len(),
            ..Self::default()
        };
        for issue in issues {
            match issue.severity {
                Severity::High => kpi.high += 1,
                Severity::Medium => kpi.medium += 1,
                Severity::Low => kpi.low += 1,
            }
        }
        kpi
    }
}

pub fn issue_count_label(count: usize) -> String {
    format!("{} items", count)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceBlock {
    pub id: String,
    pub text: String,
    pub highlighted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaperView {
    Placeholder(&'static str),
    Sentences(Vec<SentenceBlock>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueEntry {
    pub id: String,
    pub issue_type: IssueType,
    pub type_label: &'static str,
    pub severity: Severity,
    pub severity_label: &'static str,
    pub title: String,
    pub detail: String,
    pub sentence_id: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueListView {
    Placeholder(&'static str),
    Entries(Vec<IssueEntry>),
}

impl IssueListView {
    pub fn entries(&self) -> &[IssueEntry] {
        match self {
            Self::Placeholder(_) => &[],
            Self::Entries(entries) => entries,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub paper: PaperView,
    pub issues: IssueListView,
    pub kpi: KpiCounts,
    pub issue_count_label: String,
    pub filter: IssueFilter,
    pub status: RunStatus,
    pub engine_summary: String,
    pub progress: u8,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// One-line description of which engine produced the results.
pub fn engine_summary(source: &str, diagnostics: &EngineDiagnostics) -> String {
    let mut line = format!(
        "Engine: {} | AI assist attempted: {} | used: {}",
        source,
        yes_no(diagnostics.ai_attempted),
        yes_no(diagnostics.ai_used),
    );
    if let Some(n) = diagnostics.ai_input_sentences {
        line.push_str(&format!(" | input sentences: {}", n));
    }
    if let Some(ref err) = diagnostics.ai_error {
        line.push_str(&format!(" | error: {}", err));
    }
    line
}

pub fn render(state: &RunState) -> ViewModel {
    let highlighted = state.highlighted_index();
    let paper = if state.sentences().is_empty() {
        PaperView::Placeholder(EMPTY_PAPER_MESSAGE)
    } else {
        PaperView::Sentences(
            state
                .sentences()
                .iter()
                .enumerate()
                .map(|(i, s)| SentenceBlock {
                    id: s.id.clone(),
                    text: s.text.clone(),
                    highlighted: highlighted == Some(i),
                })
                .collect(),
        )
    };

    let display = state.display_issues();
    let active = state.active_issue_id();
    let issues = if display.is_empty() {
        IssueListView::Placeholder(EMPTY_ISSUES_MESSAGE)
    } else {
        IssueListView::Entries(
            display
                .iter()
                .map(|issue| IssueEntry {
                    id: issue.id.clone(),
                    issue_type: issue.issue_type,
                    type_label: issue.issue_type.label(),
                    severity: issue.severity,
                    severity_label: issue.severity.label(),
                    title: issue.title.clone(),
                    detail: issue.detail.clone(),
                    sentence_id: issue.sentence_id.clone(),
                    active: active == Some(issue.id.as_str()),
                })
                .collect(),
        )
    };

    ViewModel {
        paper,
        issues,
        kpi: KpiCounts::from_issues(&display),
        issue_count_label: issue_count_label(display.len()),
        filter: state.filter(),
        status: state.status().clone(),
        engine_summary: engine_summary(state.engine_source(), state.diagnostics()),
        progress: state.progress(),
    }
}
