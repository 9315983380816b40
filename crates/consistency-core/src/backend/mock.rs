//! Mock analysis backend for testing.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::Value;

use super::{AiProviderOverrides, AnalysisBackend, BackendResponse, UploadFile};

/// How the mock answers `/health`.
#[derive(Clone, Debug)]
pub enum MockHealth {
    Healthy,
    /// Fail immediately with the given cause.
    Unhealthy(String),
    /// Never answer within any reasonable timeout.
    Hang,
}

/// How the mock answers `/api/analyze`.
#[derive(Clone, Debug)]
pub enum MockAnalyze {
    /// Respond with a JSON body.
    Json { status: u16, body: Value },
    /// Respond with raw bytes (e.g. an HTML error page).
    Raw { status: u16, body: Vec<u8> },
    /// Simulate a transport failure.
    Error(String),
}

/// A hand-rolled mock implementing [`AnalysisBackend`] for tests.
///
/// Supports:
/// - A fixed analyze response, **or** a sequence (one per call, last repeated).
/// - Optional per-call latency on `analyze`.
/// - Call counting for both endpoints and capture of the last form fields.
pub struct MockBackend {
    base_url: String,
    health: MockHealth,
    responses: Mutex<Vec<MockAnalyze>>,
    fallback: MockAnalyze,
    delay: Option<Duration>,
    health_calls: AtomicUsize,
    analyze_calls: AtomicUsize,
    last_fields: Mutex<Vec<(String, String)>>,
}

impl MockBackend {
    pub fn new(health: MockHealth, response: MockAnalyze) -> Self {
        Self {
            base_url: "http://mock.backend".to_string(),
            health,
            responses: Mutex::new(Vec::new()),
            fallback: response,
            delay: None,
            health_calls: AtomicUsize::new(0),
            analyze_calls: AtomicUsize::new(0),
            last_fields: Mutex::new(Vec::new()),
        }
    }

    /// Healthy backend answering 200 with `body`.
    pub fn ok(body: Value) -> Self {
        Self::new(MockHealth::Healthy, MockAnalyze::Json { status: 200, body })
    }

    /// Return responses in order, repeating the last one.
    pub fn with_sequence(health: MockHealth, mut responses: Vec<MockAnalyze>) -> Self {
        assert!(
            !responses.is_empty(),
            "sequence must have at least one response"
        );
        responses.reverse();
        let fallback = responses[0].clone();
        let mut mock = Self::new(health, fallback);
        mock.responses = Mutex::new(responses);
        mock
    }

    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    /// Simulated latency for each analyze call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn health_calls(&self) -> usize {
        self.health_calls.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> usize {
        self.analyze_calls.load(Ordering::SeqCst)
    }

    /// Text fields sent with the most recent analyze call.
    pub fn last_fields(&self) -> Vec<(String, String)> {
        self.last_fields.lock().unwrap().clone()
    }

    fn next_response(&self) -> MockAnalyze {
        let mut seq = self.responses.lock().unwrap();
        seq.pop().unwrap_or_else(|| self.fallback.clone())
    }
}

impl AnalysisBackend for MockBackend {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    fn health<'a>(&'a self) -> Pin<Box<dyn Future<Output = Result<(), String>> + Send + 'a>> {
        self.health_calls.fetch_add(1, Ordering::SeqCst);
        let health = self.health.clone();
        Box::pin(async move {
            match health {
                MockHealth::Healthy => Ok(()),
                MockHealth::Unhealthy(cause) => Err(cause),
                MockHealth::Hang => {
                    tokio::time::sleep(Duration::from_secs(24 * 60 * 60)).await;
                    Ok(())
                }
            }
        })
    }

    fn analyze<'a>(
        &'a self,
        _file: &'a UploadFile,
        ai: &'a AiProviderOverrides,
    ) -> Pin<Box<dyn Future<Output = Result<BackendResponse, String>> + Send + 'a>> {
        self.analyze_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_fields.lock().unwrap() = ai
            .form_fields()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value))
            .collect();
        let response = self.next_response();
        let delay = self.delay;

        Box::pin(async move {
            if let Some(d) = delay {
                tokio::time::sleep(d).await;
            }
            match response {
                MockAnalyze::Json { status, body } => Ok(BackendResponse {
                    status,
                    body: serde_json::to_vec(&body).map_err(|e| e.to_string())?,
                }),
                MockAnalyze::Raw { status, body } => Ok(BackendResponse { status, body }),
                MockAnalyze::Error(msg) => Err(msg),
            }
        })
    }
}
