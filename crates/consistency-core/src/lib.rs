use thiserror::Error;

pub mod backend;
pub mod config_file;
pub mod demo;
pub mod model;
pub mod normalize;
pub mod progress;
pub mod selection;
pub mod session;
pub mod state;
pub mod view;

// Re-export for convenience
pub use backend::{AiProviderOverrides, AnalysisBackend, BackendResponse, HttpBackend, UploadFile};
pub use model::{EngineDiagnostics, Issue, IssueFilter, IssueType, Sentence, Severity};
pub use normalize::{AnalysisPayload, normalize_payload};
pub use session::{
    AnalysisRequest, AnalysisSummary, DEFAULT_BACKEND_URL, DEFAULT_HEALTH_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT, RunEvent, Session,
};
pub use state::{Phase, RunState, RunStatus};
pub use view::{KpiCounts, ViewModel, render};

#[derive(Error, Debug)]
pub enum ConsistencyError {
    #[error("no file selected")]
    MissingFile,
    #[error("an analysis is already running")]
    RunInProgress,
    #[error("backend at {url} is unreachable: {cause}")]
    BackendUnreachable { url: String, cause: String },
    #[error("{message}")]
    RequestFailed { status: u16, message: String },
    #[error("upload failed: {0}")]
    Transport(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
}

/// Resolved runtime settings for talking to the backend.
#[derive(Clone)]
pub struct Config {
    pub backend_url: String,
    pub health_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub ai: AiProviderOverrides,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("backend_url", &self.backend_url)
            .field("health_timeout_secs", &self.health_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("ai", &self.ai)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            health_timeout_secs: DEFAULT_HEALTH_TIMEOUT.as_secs(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT.as_secs(),
            ai: AiProviderOverrides::default(),
        }
    }
}

impl Config {
    /// Build a [`Session`] backed by the HTTP client.
    pub fn session(&self) -> Session {
        let backend = HttpBackend::new(
            &self.backend_url,
            std::time::Duration::from_secs(self.request_timeout_secs),
        );
        Session::new(std::sync::Arc::new(backend))
            .with_health_timeout(std::time::Duration::from_secs(self.health_timeout_secs))
    }
}
