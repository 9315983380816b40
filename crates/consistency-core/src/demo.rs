//! Canned datasets for previewing the front end without a backend.

use crate::model::{EngineDiagnostics, Issue, IssueType, Sentence, Severity};
use crate::normalize::AnalysisPayload;
use crate::state::PREVIEW_SOURCE;

/// Keys accepted by [`dataset`].
pub const DEMO_KEYS: [&str; 3] = ["pdf", "word", "latex"];

fn sentences(texts: &[&str]) -> Vec<Sentence> {
    texts
        .iter()
        .enumerate()
        .map(|(i, text)| Sentence::new(format!("s-{}", i + 1), *text))
        .collect()
}

fn issue(
    id: &str,
    issue_type: IssueType,
    severity: Severity,
    sentence_id: &str,
    title: &str,
    detail: &str,
) -> Issue {
    Issue {
        id: id.to_string(),
        issue_type,
        severity,
        sentence_id: sentence_id.to_string(),
        title: title.to_string(),
        detail: detail.to_string(),
    }
}

fn pdf() -> (Vec<Sentence>, Vec<Issue>) {
    (
        sentences(&[
            "We name this metric threshold voltage window and use it throughout the evaluation.",
            "Section 4 reports the threshold voltage window for all six device batches.",
            "Later, the same metric is called switching threshold bandwidth with a different definition.",
        ]),
        vec![issue(
            "demo-pdf-1",
            IssueType::Term,
            Severity::Medium,
            "s-3",
            "Terminology Drift",
            "The concept name changes from 'threshold voltage window' to 'switching threshold bandwidth'.",
        )],
    )
}

fn word() -> (Vec<Sentence>, Vec<Issue>) {
    (
        sentences(&[
            "The proposed coating is evaluated between 20 and 80 degrees Celsius.",
            "Section 2 states that higher temperature improves robustness of the coating.",
            "Section 3 concludes that higher temperature reduces robustness under the same load.",
            "Table 2 lists five coating variants, while the text refers to Table 3 for the same results.",
        ]),
        vec![
            issue(
                "demo-word-1",
                IssueType::Logic,
                Severity::High,
                "s-3",
                "Contradictory Conclusion",
                "Section 2 and Section 3 draw opposite conclusions about the effect of temperature on robustness.",
            ),
            issue(
                "demo-word-2",
                IssueType::CitationFigure,
                Severity::Low,
                "s-4",
                "Table Reference Mismatch",
                "The text cites Table 3 for results that appear in Table 2.",
            ),
        ],
    )
}

fn latex() -> (Vec<Sentence>, Vec<Issue>) {
    (
        sentences(&[
            "We denote the learning rate by eta and keep it fixed during training.",
            "In the ablation, the step size alpha is decayed every ten epochs.",
            "Our method converges in fewer iterations than the baseline.",
            "Section 5 shows the baseline converging first on every benchmark.",
            "Figure 4 in the main text claims improved robustness, but the caption says reduced robustness.",
        ]),
        vec![
            issue(
                "demo-latex-1",
                IssueType::Term,
                Severity::Low,
                "s-2",
                "Symbol Renamed",
                "The learning rate is introduced as 'eta' but later referred to as 'step size alpha'.",
            ),
            issue(
                "demo-latex-2",
                IssueType::Logic,
                Severity::Medium,
                "s-4",
                "Convergence Claim Conflict",
                "The convergence claim in the introduction is contradicted by the results in Section 5.",
            ),
            issue(
                "demo-latex-3",
                IssueType::CitationFigure,
                Severity::High,
                "s-5",
                "Figure Caption Conflict",
                "Figure 4 text and caption describe opposite robustness trends.",
            ),
        ],
    )
}

/// Look up a canned dataset. Unknown keys return `None`.
pub fn dataset(key: &str) -> Option<AnalysisPayload> {
    let (sentences, issues) = match key {
        "pdf" => pdf(),
        "word" => word(),
        "latex" => latex(),
        _ => return None,
    };
    Some(AnalysisPayload {
        sentences,
        issues,
        source: PREVIEW_SOURCE.to_string(),
        diagnostics: EngineDiagnostics::default(),
    })
}
