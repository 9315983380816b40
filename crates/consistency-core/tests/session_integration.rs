//! Integration tests for [`Session`].
//!
//! Every test runs against a [`MockBackend`] so that no HTTP requests are
//! made. Timeout tests run with a paused clock.

use std::sync::Arc;
use std::time::Duration;

use consistency_core::backend::mock::{MockAnalyze, MockBackend, MockHealth};
use consistency_core::view::{EMPTY_ISSUES_MESSAGE, IssueListView, PaperView};
use consistency_core::{
    AiProviderOverrides, AnalysisRequest, ConsistencyError, IssueFilter, IssueType, Phase,
    Session, UploadFile,
};
use serde_json::json;

fn paper() -> AnalysisRequest {
    AnalysisRequest {
        file: Some(UploadFile::new("paper.pdf", b"%PDF-1.4".to_vec())),
        ai: AiProviderOverrides::new("https://open.bigmodel.cn/api/paas/v4", "glm-4.6v", None),
    }
}

fn backend_body() -> serde_json::Value {
    json!({
        "sentences": [
            {"id": "s-1", "text": "Alpha is defined here."},
            {"id": "s-2", "text": "Beta contradicts alpha."},
            {"id": "s-3", "text": "Figure 9 is cited."}
        ],
        "issues": [
            {"id": "i-1", "type": "term", "severity": "low", "sentence_id": "s-1", "title": "T", "detail": "D"},
            {"id": "i-2", "type": "logic", "severity": "high", "sentenceId": "s-2", "title": "L", "detail": "D"},
            {"id": "i-3", "type": "citation_figure", "severity": "medium", "sentence_id": "s-3"}
        ],
        "source": "hybrid",
        "engine": {"glm_attempted": true, "glm_used": true, "glm_input_sentences": 3}
    })
}

#[tokio::test]
async fn pdf_demo_renders_one_medium_issue() {
    let session = Session::new(Arc::new(MockBackend::ok(json!({}))));
    assert!(session.load_demo("pdf"));

    let view = session.view();
    assert_eq!(view.kpi.total, 1);
    assert_eq!(view.kpi.medium, 1);
    assert_eq!(view.kpi.high, 0);
    assert_eq!(view.issue_count_label, "1 items");

    let entries = view.issues.entries();
    assert_eq!(entries.len(), 1);
    assert!(entries[0].active);
    match view.paper {
        PaperView::Sentences(blocks) => {
            assert_eq!(blocks.len(), 3);
            let lit: Vec<_> = blocks.iter().filter(|b| b.highlighted).collect();
            assert_eq!(lit.len(), 1);
            assert_eq!(lit[0].id, entries[0].sentence_id);
        }
        PaperView::Placeholder(_) => panic!("expected sentences"),
    }
}

#[tokio::test]
async fn successful_run_replaces_state() {
    let mock = Arc::new(MockBackend::ok(backend_body()));
    let session = Session::new(mock.clone());

    let summary = session.run_analysis(paper(), |_| {}).await.unwrap();
    assert_eq!(summary.source, "hybrid");
    assert_eq!(summary.issue_count, 3);
    assert_eq!(mock.health_calls(), 1);
    assert_eq!(mock.analyze_calls(), 1);

    let state = session.snapshot();
    assert_eq!(state.status().phase, Phase::Success);
    assert_eq!(state.status().badge, "Completed");
    assert_eq!(
        state.status().message,
        "Completed with hybrid engine. 3 issues found."
    );
    assert_eq!(state.issues()[1].sentence_id, "s-2");
    assert_eq!(state.issues()[2].title, "Detected Issue");
    assert!(state.diagnostics().ai_used);
    assert_eq!(state.active_issue_id(), Some("i-1"));
    assert!(!session.is_running());
}

#[tokio::test]
async fn missing_file_makes_no_network_calls() {
    let mock = Arc::new(MockBackend::ok(backend_body()));
    let session = Session::new(mock.clone());

    let err = session
        .run_analysis(AnalysisRequest::default(), |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, ConsistencyError::MissingFile));
    assert_eq!(mock.health_calls(), 0);
    assert_eq!(mock.analyze_calls(), 0);

    let status = session.snapshot().status().clone();
    assert_eq!(status.phase, Phase::Idle);
    assert_eq!(status.badge, "Missing File");
    assert_eq!(status.message, "Please choose a file before running analysis.");
}

#[tokio::test(start_paused = true)]
async fn health_timeout_names_backend_and_skips_upload() {
    let mock = Arc::new(
        MockBackend::new(MockHealth::Hang, MockAnalyze::Error("unused".into()))
            .with_base_url("https://slow.backend.example"),
    );
    let session = Session::new(mock.clone()).with_health_timeout(Duration::from_secs(10));

    let err = session.run_analysis(paper(), |_| {}).await.unwrap_err();
    assert!(matches!(err, ConsistencyError::BackendUnreachable { .. }));
    assert_eq!(mock.analyze_calls(), 0);

    let status = session.snapshot().status().clone();
    assert_eq!(status.phase, Phase::Failure);
    assert!(status.message.starts_with("Analysis failed: "));
    assert!(status.message.contains("https://slow.backend.example"));
}

#[tokio::test]
async fn unhealthy_backend_reports_cause() {
    let mock = Arc::new(MockBackend::new(
        MockHealth::Unhealthy("HTTP 503 Service Unavailable".into()),
        MockAnalyze::Error("unused".into()),
    ));
    let session = Session::new(mock.clone());

    let err = session.run_analysis(paper(), |_| {}).await.unwrap_err();
    assert!(err.to_string().contains("HTTP 503"));
    assert_eq!(mock.analyze_calls(), 0);
}

#[tokio::test]
async fn error_detail_is_shown_verbatim() {
    let mock = Arc::new(MockBackend::new(
        MockHealth::Healthy,
        MockAnalyze::Json {
            status: 400,
            body: json!({"detail": "Unsupported file type: .xlsx"}),
        },
    ));
    let session = Session::new(mock);

    let err = session.run_analysis(paper(), |_| {}).await.unwrap_err();
    assert!(matches!(err, ConsistencyError::RequestFailed { status: 400, .. }));
    assert_eq!(
        session.snapshot().status().message,
        "Analysis failed: Unsupported file type: .xlsx"
    );
}

#[tokio::test]
async fn non_json_error_body_uses_generic_message() {
    let mock = Arc::new(MockBackend::new(
        MockHealth::Healthy,
        MockAnalyze::Raw {
            status: 502,
            body: b"<html>Bad Gateway</html>".to_vec(),
        },
    ));
    let session = Session::new(mock);

    session.run_analysis(paper(), |_| {}).await.unwrap_err();
    assert_eq!(
        session.snapshot().status().message,
        "Analysis failed: Request failed with status 502."
    );
}

#[tokio::test]
async fn malformed_success_body_yields_empty_results() {
    let mock = Arc::new(MockBackend::new(
        MockHealth::Healthy,
        MockAnalyze::Raw {
            status: 200,
            body: b"not json".to_vec(),
        },
    ));
    let session = Session::new(mock);

    let summary = session.run_analysis(paper(), |_| {}).await.unwrap();
    assert_eq!(summary.source, "heuristic");
    assert_eq!(summary.issue_count, 0);

    let view = session.view();
    assert_eq!(view.kpi.total, 0);
    assert!(matches!(view.issues, IssueListView::Placeholder(m) if m == EMPTY_ISSUES_MESSAGE));
}

#[tokio::test]
async fn failure_keeps_previous_results() {
    let mock = Arc::new(MockBackend::with_sequence(
        MockHealth::Healthy,
        vec![
            MockAnalyze::Json {
                status: 200,
                body: backend_body(),
            },
            MockAnalyze::Error("connection reset".into()),
        ],
    ));
    let session = Session::new(mock);

    session.run_analysis(paper(), |_| {}).await.unwrap();
    let err = session.run_analysis(paper(), |_| {}).await.unwrap_err();
    assert!(matches!(err, ConsistencyError::Transport(_)));

    let state = session.snapshot();
    assert_eq!(state.issues().len(), 3);
    assert_eq!(state.engine_source(), "hybrid");
    assert_eq!(state.status().badge, "Failed");
}

#[tokio::test(start_paused = true)]
async fn concurrent_run_is_rejected() {
    let mock = Arc::new(MockBackend::ok(backend_body()).with_delay(Duration::from_secs(1)));
    let session = Session::new(mock.clone());

    let (first, second) = tokio::join!(
        session.run_analysis(paper(), |_| {}),
        async {
            tokio::task::yield_now().await;
            session.run_analysis(paper(), |_| {}).await
        }
    );
    assert!(first.is_ok());
    assert!(matches!(second, Err(ConsistencyError::RunInProgress)));
    assert_eq!(mock.analyze_calls(), 1);
    assert!(!session.is_running());
}

#[tokio::test]
async fn ai_overrides_are_forwarded() {
    let mock = Arc::new(MockBackend::ok(json!({})));
    let session = Session::new(mock.clone());

    let mut request = paper();
    request.ai = AiProviderOverrides::new("https://llm.example", "glm-4.6v", Some("key-1"));
    session.run_analysis(request, |_| {}).await.unwrap();

    let fields = mock.last_fields();
    assert_eq!(fields.len(), 3);
    assert_eq!(fields[2], ("api_key".to_string(), "key-1".to_string()));
}

#[tokio::test]
async fn filter_change_resets_selection() {
    let session = Session::new(Arc::new(MockBackend::ok(backend_body())));
    session.run_analysis(paper(), |_| {}).await.unwrap();

    assert!(session.select_issue("i-3"));
    session.set_filter(IssueFilter::Only(IssueType::Logic));
    let state = session.snapshot();
    assert_eq!(state.active_issue_id(), Some("i-2"));
    assert_eq!(state.highlighted_sentence(), Some("s-2"));

    session.set_filter(IssueFilter::All);
    assert_eq!(session.snapshot().active_issue_id(), Some("i-1"));
}

#[tokio::test]
async fn duplicate_sentence_ids_highlight_one_block() {
    let mock = Arc::new(MockBackend::ok(json!({
        "sentences": [{"id": "s-2", "text": "Alpha."}, "Beta."],
        "issues": [{"id": "i-1", "type": "term", "severity": "low", "sentence_id": "s-2"}]
    })));
    let session = Session::new(mock);
    session.run_analysis(paper(), |_| {}).await.unwrap();

    let PaperView::Sentences(blocks) = session.view().paper else {
        panic!("expected sentences");
    };
    let lit: Vec<(&str, &str)> = blocks
        .iter()
        .filter(|b| b.highlighted)
        .map(|b| (b.id.as_str(), b.text.as_str()))
        .collect();
    assert_eq!(lit, vec![("s-2", "Alpha.")]);
    assert_eq!(session.snapshot().highlighted_index(), Some(0));
}
