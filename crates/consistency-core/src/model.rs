//! Canonical shapes for sentences, issues, and engine diagnostics.

use serde::{Deserialize, Serialize};

/// An extracted unit of document text, addressable by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: String,
    pub text: String,
}

impl Sentence {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// Category of a detected inconsistency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    Term,
    #[default]
    Logic,
    CitationFigure,
}

impl IssueType {
    pub const ALL: [IssueType; 3] = [Self::Term, Self::Logic, Self::CitationFigure];

    /// Parse a wire code. Returns `None` for anything outside the closed set.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "term" => Some(Self::Term),
            "logic" => Some(Self::Logic),
            "citation_figure" => Some(Self::CitationFigure),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Term => "term",
            Self::Logic => "logic",
            Self::CitationFigure => "citation_figure",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Term => "Terminology",
            Self::Logic => "Logic",
            Self::CitationFigure => "Citation/Figure",
        }
    }
}

/// Risk level attached to an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
}

impl Severity {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::High => "High Risk",
            Self::Medium => "Medium Risk",
            Self::Low => "Low Risk",
        }
    }
}

/// A detected inconsistency anchored to a sentence.
///
/// `sentence_id` is a weak reference: it may name a sentence that is not in
/// the current set, in which case selecting the issue highlights nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    #[serde(rename = "type")]
    pub issue_type: IssueType,
    pub severity: Severity,
    pub sentence_id: String,
    pub title: String,
    pub detail: String,
}

/// Issue-type subset used to narrow the displayed issue list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IssueFilter {
    #[default]
    All,
    Only(IssueType),
}

impl IssueFilter {
    pub fn from_code(code: &str) -> Option<Self> {
        if code == "all" {
            Some(Self::All)
        } else {
            IssueType::from_code(code).map(Self::Only)
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Only(t) => t.code(),
        }
    }

    pub fn matches(self, issue: &Issue) -> bool {
        match self {
            Self::All => true,
            Self::Only(t) => issue.issue_type == t,
        }
    }
}

impl std::str::FromStr for IssueFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s.trim()).ok_or_else(|| {
            format!(
                "unknown filter '{}': expected one of all, term, logic, citation_figure",
                s
            )
        })
    }
}

/// Metadata about the optional AI-assisted review step on the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineDiagnostics {
    pub ai_attempted: bool,
    pub ai_used: bool,
    pub ai_error: Option<String>,
    pub ai_input_sentences: Option<u64>,
}
