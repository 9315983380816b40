//! Coerce raw backend payloads into the canonical model.
//!
//! Every function here is total: malformed input degrades to defaults rather
//! than failing. Field access goes through `serde_json::Value` indexing, which
//! yields `Null` for missing keys and for non-object values alike.

use serde_json::{Map, Value};

use crate::model::{EngineDiagnostics, Issue, IssueType, Sentence, Severity};

pub const DEFAULT_ISSUE_TITLE: &str = "Detected Issue";
pub const DEFAULT_ISSUE_DETAIL: &str = "No detailed explanation provided.";
pub const DEFAULT_ENGINE_SOURCE: &str = "heuristic";

/// A fully normalized analysis response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnalysisPayload {
    pub sentences: Vec<Sentence>,
    pub issues: Vec<Issue>,
    pub source: String,
    pub diagnostics: EngineDiagnostics,
}

/// Parse a response body as JSON. Bodies that are not valid JSON become `{}`.
pub fn parse_body(bytes: &[u8]) -> Value {
    match serde_json::from_slice(bytes) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, len = bytes.len(), "response body is not JSON, treating as empty");
            Value::Object(Map::new())
        }
    }
}

/// Identifier fields accept non-empty strings and numbers.
fn id_field(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn text_field(v: &Value) -> Option<&str> {
    v.as_str().filter(|s| !s.is_empty())
}

/// Normalize the `sentences` array of a response.
///
/// Strings get a positional `s-<n>` id; objects keep their own `id`/`text`
/// when present. Sentences whose text is empty or whitespace-only are
/// dropped, as is anything that is neither a string nor an object.
pub fn normalize_sentences(raw: &Value) -> Vec<Sentence> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| {
            let positional = || format!("s-{}", idx + 1);
            let sentence = match item {
                Value::String(text) => Sentence::new(positional(), text.clone()),
                Value::Object(_) => Sentence {
                    id: id_field(&item["id"]).unwrap_or_else(positional),
                    text: item["text"].as_str().unwrap_or("").to_string(),
                },
                _ => return None,
            };
            (!sentence.text.trim().is_empty()).then_some(sentence)
        })
        .collect()
}

/// Normalize the `issues` array of a response. Output length always equals
/// input length.
pub fn normalize_issues(raw: &Value) -> Vec<Issue> {
    let Some(items) = raw.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .map(|(idx, item)| normalize_issue(item, idx + 1))
        .collect()
}

fn normalize_issue(item: &Value, position: usize) -> Issue {
    Issue {
        id: id_field(&item["id"]).unwrap_or_else(|| format!("issue-{}", position)),
        issue_type: item["type"]
            .as_str()
            .and_then(IssueType::from_code)
            .unwrap_or_default(),
        severity: item["severity"]
            .as_str()
            .and_then(Severity::from_code)
            .unwrap_or_default(),
        sentence_id: id_field(&item["sentence_id"])
            .or_else(|| id_field(&item["sentenceId"]))
            .unwrap_or_else(|| format!("s-{}", position)),
        title: text_field(&item["title"])
            .unwrap_or(DEFAULT_ISSUE_TITLE)
            .to_string(),
        detail: text_field(&item["detail"])
            .unwrap_or(DEFAULT_ISSUE_DETAIL)
            .to_string(),
    }
}

/// Normalize the `engine` object of a response.
///
/// `ai_attempted` resolves from `glm_attempted`, then `glm_enabled`, then
/// `false`. Older backends only report `glm_enabled`.
pub fn normalize_diagnostics(engine: &Value) -> EngineDiagnostics {
    EngineDiagnostics {
        ai_attempted: engine["glm_attempted"]
            .as_bool()
            .or_else(|| engine["glm_enabled"].as_bool())
            .unwrap_or(false),
        ai_used: engine["glm_used"].as_bool().unwrap_or(false),
        ai_error: engine["glm_error"]
            .as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from),
        ai_input_sentences: engine["glm_input_sentences"].as_u64(),
    }
}

/// Normalize a whole `/api/analyze` response body.
pub fn normalize_payload(raw: &Value) -> AnalysisPayload {
    AnalysisPayload {
        sentences: normalize_sentences(&raw["sentences"]),
        issues: normalize_issues(&raw["issues"]),
        source: text_field(&raw["source"])
            .unwrap_or(DEFAULT_ENGINE_SOURCE)
            .to_string(),
        diagnostics: normalize_diagnostics(&raw["engine"]),
    }
}
