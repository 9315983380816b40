//! Analysis orchestration: health-check the backend, upload, and fold the response
//! into the run state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use crate::ConsistencyError;
use crate::backend::{AiProviderOverrides, AnalysisBackend, UploadFile};
use crate::demo;
use crate::model::IssueFilter;
use crate::normalize::{AnalysisPayload, normalize_payload, parse_body};
use crate::progress::{PROGRESS_TICK, ProgressMeter};
use crate::state::{Phase, RunState, RunStatus};
use crate::view::{ViewModel, render};

pub const DEFAULT_BACKEND_URL: &str = "https://paper-consistency-platform-api.onrender.com";
pub const DEFAULT_HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub const MISSING_FILE_MESSAGE: &str = "Please choose a file before running analysis.";

/// Everything one analysis run needs.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub file: Option<UploadFile>,
    pub ai: AiProviderOverrides,
}

/// Progress notifications emitted during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    Phase(Phase),
    Progress(u8),
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub source: String,
    pub issue_count: usize,
    pub sentence_count: usize,
}

/// Clears the in-flight flag on every exit path.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the single [`RunState`] and the backend it talks to.
///
/// Only one analysis may be in flight at a time; a second call while one is
/// pending is rejected with [`ConsistencyError::RunInProgress`]. The state
/// lock is never held across an await point.
pub struct Session {
    backend: Arc<dyn AnalysisBackend>,
    health_timeout: Duration,
    state: Mutex<RunState>,
    in_flight: AtomicBool,
}

impl Session {
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            health_timeout: DEFAULT_HEALTH_TIMEOUT,
            state: Mutex::new(RunState::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    pub fn backend_url(&self) -> &str {
        self.backend.base_url()
    }

    /// Whether a run is currently pending (the "Run" control is disabled).
    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn state(&self) -> MutexGuard<'_, RunState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> RunState {
        self.state().clone()
    }

    pub fn view(&self) -> ViewModel {
        render(&self.state())
    }

    pub fn set_filter(&self, filter: IssueFilter) {
        self.state().set_filter(filter);
    }

    pub fn select_issue(&self, issue_id: &str) -> bool {
        self.state().select_issue(issue_id)
    }

    /// Replace the results with a canned dataset. Unknown keys change nothing.
    pub fn load_demo(&self, key: &str) -> bool {
        let Some(payload) = demo::dataset(key) else {
            tracing::debug!(key, "unknown demo dataset");
            return false;
        };
        let issues = payload.issues.len();
        let mut state = self.state();
        state.replace_results(payload);
        state.set_status(RunStatus::new(
            Phase::Idle,
            "Preview",
            format!("Loaded {} demo dataset. {} issues found.", key, issues),
        ));
        true
    }

    /// Bounded liveness check against the backend.
    pub async fn check_health(&self) -> Result<(), ConsistencyError> {
        let url = self.backend.base_url().to_string();
        match tokio::time::timeout(self.health_timeout, self.backend.health()).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(cause)) => Err(ConsistencyError::BackendUnreachable { url, cause }),
            Err(_) => Err(ConsistencyError::BackendUnreachable {
                url,
                cause: format!(
                    "health check timed out after {}s",
                    self.health_timeout.as_secs_f64()
                ),
            }),
        }
    }

    fn enter(&self, status: RunStatus, on_event: &impl Fn(RunEvent)) {
        let phase = status.phase;
        self.state().set_status(status);
        on_event(RunEvent::Phase(phase));
    }

    async fn check_then_upload(
        &self,
        file: &UploadFile,
        ai: &AiProviderOverrides,
        on_event: &impl Fn(RunEvent),
    ) -> Result<AnalysisPayload, ConsistencyError> {
        self.check_health().await?;

        self.enter(
            RunStatus::new(
                Phase::Uploading,
                "Running",
                "Uploading file and running analysis...",
            ),
            on_event,
        );
        let response = self
            .backend
            .analyze(file, ai)
            .await
            .map_err(ConsistencyError::Transport)?;

        let body = parse_body(&response.body);
        if !response.is_success() {
            let message = body["detail"]
                .as_str()
                .filter(|s| !s.is_empty())
                .map(String::from)
                .unwrap_or_else(|| format!("Request failed with status {}.", response.status));
            return Err(ConsistencyError::RequestFailed {
                status: response.status,
                message,
            });
        }
        Ok(normalize_payload(&body))
    }

    /// Run one analysis end to end.
    ///
    /// On success the run state is replaced with the normalized response. On
    /// failure only the status changes; previous results stay visible.
    pub async fn run_analysis(
        &self,
        request: AnalysisRequest,
        on_event: impl Fn(RunEvent),
    ) -> Result<AnalysisSummary, ConsistencyError> {
        let Some(_guard) = InFlightGuard::acquire(&self.in_flight) else {
            tracing::debug!("analysis already in flight, ignoring request");
            return Err(ConsistencyError::RunInProgress);
        };

        let Some(file) = request.file.as_ref() else {
            self.state().set_status(RunStatus::new(
                Phase::Idle,
                "Missing File",
                MISSING_FILE_MESSAGE,
            ));
            return Err(ConsistencyError::MissingFile);
        };

        let mut meter = ProgressMeter::default();
        let start = meter.start();
        self.state().set_progress(start);
        on_event(RunEvent::Progress(start));
        self.enter(
            RunStatus::new(
                Phase::CheckingBackend,
                "Checking",
                format!("Checking backend at {}...", self.backend.base_url()),
            ),
            &on_event,
        );

        let work = self.check_then_upload(file, &request.ai, &on_event);
        tokio::pin!(work);
        let mut ticker = tokio::time::interval(PROGRESS_TICK);
        ticker.tick().await;

        let outcome = loop {
            tokio::select! {
                outcome = &mut work => break outcome,
                _ = ticker.tick() => {
                    let value = meter.tick();
                    self.state().set_progress(value);
                    on_event(RunEvent::Progress(value));
                }
            }
        };

        match outcome {
            Ok(payload) => {
                let summary = AnalysisSummary {
                    source: payload.source.clone(),
                    issue_count: payload.issues.len(),
                    sentence_count: payload.sentences.len(),
                };
                {
                    let mut state = self.state();
                    state.replace_results(payload);
                    state.set_progress(meter.complete());
                    state.set_status(RunStatus::new(
                        Phase::Success,
                        "Completed",
                        format!(
                            "Completed with {} engine. {} issues found.",
                            summary.source, summary.issue_count
                        ),
                    ));
                }
                on_event(RunEvent::Progress(100));
                on_event(RunEvent::Phase(Phase::Success));
                tracing::info!(
                    file = %file.file_name,
                    source = %summary.source,
                    issues = summary.issue_count,
                    sentences = summary.sentence_count,
                    "analysis complete"
                );
                Ok(summary)
            }
            Err(err) => {
                {
                    let mut state = self.state();
                    state.set_progress(meter.reset());
                    state.set_status(RunStatus::new(
                        Phase::Failure,
                        "Failed",
                        format!("Analysis failed: {}", err),
                    ));
                }
                on_event(RunEvent::Progress(0));
                on_event(RunEvent::Phase(Phase::Failure));
                tracing::warn!(file = %file.file_name, error = %err, "analysis failed");
                Err(err)
            }
        }
    }
}
