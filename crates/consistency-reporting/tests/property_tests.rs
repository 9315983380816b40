//! Property-based tests for report export.

use consistency_core::{
    AnalysisPayload, EngineDiagnostics, Issue, IssueFilter, IssueType, RunState, Sentence,
    Severity,
};
use consistency_reporting::{Report, export_json, export_markdown, export_text};
use proptest::prelude::*;

fn arb_sentence() -> impl Strategy<Value = Sentence> {
    ("s-[0-9]{1,2}", "[^\r\n]{1,20}").prop_map(|(id, text)| Sentence::new(id, text))
}

fn arb_issue() -> impl Strategy<Value = Issue> {
    (
        "i-[0-9]{1,2}",
        prop::sample::select(IssueType::ALL.to_vec()),
        prop::sample::select(vec![Severity::Low, Severity::Medium, Severity::High]),
        "s-[0-9]{1,2}",
        "[^\r\n]{1,20}",
        "[^\r\n]{1,20}",
    )
        .prop_map(|(id, issue_type, severity, sentence_id, title, detail)| Issue {
            id,
            issue_type,
            severity,
            sentence_id,
            title,
            detail,
        })
}

fn arb_filter() -> impl Strategy<Value = IssueFilter> {
    prop_oneof![
        Just(IssueFilter::All),
        prop::sample::select(IssueType::ALL.to_vec()).prop_map(IssueFilter::Only),
    ]
}

/// A run state holding generated results, with a display filter applied.
fn arb_state() -> impl Strategy<Value = RunState> {
    (
        prop::collection::vec(arb_sentence(), 0..6),
        prop::collection::vec(arb_issue(), 0..6),
        "[a-z]{0,8}",
        arb_filter(),
    )
        .prop_map(|(sentences, issues, source, filter)| {
            let mut state = RunState::new();
            state.replace_results(AnalysisPayload {
                sentences,
                issues,
                source,
                diagnostics: EngineDiagnostics::default(),
            });
            state.set_filter(filter);
            state
        })
}

/// Line indices at which two exports differ.
fn differing_lines(a: &str, b: &str) -> Vec<usize> {
    let a: Vec<&str> = a.split('\n').collect();
    let b: Vec<&str> = b.split('\n').collect();
    assert_eq!(a.len(), b.len());
    (0..a.len()).filter(|&i| a[i] != b[i]).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn markdown_differs_only_in_timestamp(state in arb_state()) {
        let first = Report::with_timestamp(&state, "2025-01-01 00:00:00");
        let again = Report::with_timestamp(&state, "2025-01-01 00:00:00");
        let later = Report::with_timestamp(&state, "2025-06-30 12:34:56");

        prop_assert_eq!(export_markdown(&first), export_markdown(&again));
        prop_assert_eq!(
            differing_lines(&export_markdown(&first), &export_markdown(&later)),
            vec![2]
        );
    }

    #[test]
    fn text_differs_only_in_timestamp(state in arb_state()) {
        let first = Report::with_timestamp(&state, "2025-01-01 00:00:00");
        let later = Report::with_timestamp(&state, "2025-06-30 12:34:56");

        prop_assert_eq!(export_text(&first), export_text(&first.clone()));
        let diff = differing_lines(&export_text(&first), &export_text(&later));
        prop_assert_eq!(diff.len(), 1);
    }

    #[test]
    fn json_differs_only_in_timestamp(state in arb_state()) {
        let first = Report::with_timestamp(&state, "2025-01-01 00:00:00");
        let later = Report::with_timestamp(&state, "2025-06-30 12:34:56");

        let mut a: serde_json::Value = serde_json::from_str(&export_json(&first)).unwrap();
        let mut b: serde_json::Value = serde_json::from_str(&export_json(&later)).unwrap();
        prop_assert_ne!(&a["generated_at"], &b["generated_at"]);
        a["generated_at"] = serde_json::Value::Null;
        b["generated_at"] = serde_json::Value::Null;
        prop_assert_eq!(a, b);
    }

    #[test]
    fn report_covers_full_result_set(state in arb_state()) {
        let report = Report::with_timestamp(&state, "2025-01-01 00:00:00");
        prop_assert_eq!(report.issues.as_slice(), state.issues());
        prop_assert_eq!(report.sentences.as_slice(), state.sentences());

        let md = export_markdown(&report);
        let total = format!("Total issues: {}", state.issues().len());
        prop_assert!(md.split('\n').any(|line| line == total));

        let json: serde_json::Value = serde_json::from_str(&export_json(&report)).unwrap();
        prop_assert_eq!(json["total_issues"].as_u64(), Some(state.issues().len() as u64));
    }
}
