use crate::model::{EngineDiagnostics, Issue, IssueFilter, Sentence};
use crate::normalize::AnalysisPayload;
use crate::selection::{Highlighter, select_default};
use crate::view::filter_issues;

/// Engine label shown before any analysis has run, and for demo data.
pub const PREVIEW_SOURCE: &str = "preview";

/// Lifecycle phase of an analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    CheckingBackend,
    Uploading,
    Success,
    Failure,
}

impl Phase {
    /// Whether a run is in flight.
    pub fn is_pending(self) -> bool {
        matches!(self, Self::CheckingBackend | Self::Uploading)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CheckingBackend => "checking-backend",
            Self::Uploading => "uploading",
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

/// Status line shown to the user: a short badge plus a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStatus {
    pub phase: Phase,
    pub badge: String,
    pub message: String,
}

impl RunStatus {
    pub fn new(phase: Phase, badge: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            phase,
            badge: badge.into(),
            message: message.into(),
        }
    }

    pub fn idle() -> Self {
        Self::new(
            Phase::Idle,
            "Idle",
            "Choose a paper and run the consistency check.",
        )
    }

    pub fn is_success(&self) -> bool {
        self.phase == Phase::Success
    }
}

impl Default for RunStatus {
    fn default() -> Self {
        Self::idle()
    }
}

/// Everything the front end displays.
///
/// Results are replaced wholesale, never edited in place. The active issue is
/// always a member of the filtered issue list, or `None` when that list is
/// empty; at most one sentence is highlighted.
#[derive(Debug, Clone)]
pub struct RunState {
    sentences: Vec<Sentence>,
    issues: Vec<Issue>,
    filter: IssueFilter,
    active_issue_id: Option<String>,
    highlighter: Highlighter,
    engine_source: String,
    diagnostics: EngineDiagnostics,
    status: RunStatus,
    progress: u8,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            sentences: Vec::new(),
            issues: Vec::new(),
            filter: IssueFilter::All,
            active_issue_id: None,
            highlighter: Highlighter::default(),
            engine_source: PREVIEW_SOURCE.to_string(),
            diagnostics: EngineDiagnostics::default(),
            status: RunStatus::idle(),
            progress: 0,
        }
    }
}

impl RunState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn filter(&self) -> IssueFilter {
        self.filter
    }

    pub fn active_issue_id(&self) -> Option<&str> {
        self.active_issue_id.as_deref()
    }

    /// Id of the highlighted sentence.
    pub fn highlighted_sentence(&self) -> Option<&str> {
        self.highlighted_index()
            .and_then(|i| self.sentences.get(i))
            .map(|s| s.id.as_str())
    }

    /// Position of the highlighted sentence in [`RunState::sentences`].
    pub fn highlighted_index(&self) -> Option<usize> {
        self.highlighter.current()
    }

    pub fn engine_source(&self) -> &str {
        &self.engine_source
    }

    pub fn diagnostics(&self) -> &EngineDiagnostics {
        &self.diagnostics
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    /// Issues passing the active filter, in source order.
    pub fn display_issues(&self) -> Vec<&Issue> {
        filter_issues(&self.issues, self.filter)
    }

    /// Swap in a new result set. The filter survives; selection restarts from
    /// the first displayed issue.
    pub fn replace_results(&mut self, payload: AnalysisPayload) {
        self.sentences = payload.sentences;
        self.issues = payload.issues;
        self.engine_source = payload.source;
        self.diagnostics = payload.diagnostics;
        self.active_issue_id = None;
        self.sync_selection();
    }

    /// Change the filter. Always drops the active issue before re-selecting.
    pub fn set_filter(&mut self, filter: IssueFilter) {
        self.filter = filter;
        self.active_issue_id = None;
        self.sync_selection();
    }

    /// Activate an issue from the displayed list and highlight its sentence.
    ///
    /// Returns `false` (and changes nothing) when the id is not displayed.
    pub fn select_issue(&mut self, issue_id: &str) -> bool {
        let Some(sentence_id) = self
            .display_issues()
            .into_iter()
            .find(|issue| issue.id == issue_id)
            .map(|issue| issue.sentence_id.clone())
        else {
            return false;
        };
        self.active_issue_id = Some(issue_id.to_string());
        self.highlighter.highlight(&sentence_id, &self.sentences);
        true
    }

    /// Re-apply the default selection rule and the matching highlight.
    pub fn sync_selection(&mut self) {
        let display = filter_issues(&self.issues, self.filter);
        let chosen = select_default(&display, self.active_issue_id.as_deref());
        let anchor = chosen
            .as_deref()
            .and_then(|id| display.iter().find(|issue| issue.id == id))
            .map(|issue| issue.sentence_id.clone());

        match anchor {
            Some(sentence_id) => self.highlighter.highlight(&sentence_id, &self.sentences),
            None => self.highlighter.clear(),
        }
        self.active_issue_id = chosen;
    }

    pub fn set_status(&mut self, status: RunStatus) {
        self.status = status;
    }

    pub(crate) fn set_progress(&mut self, value: u8) {
        self.progress = value;
    }
}
