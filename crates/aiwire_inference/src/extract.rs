//! Recovering structured analysis from free-form model text.

use aiwire_core::{AnalysisResult, Section, MISSING_SECTION};
use serde_json::{Map, Value};
use tracing::debug;

use crate::engine::AnalysisFailure;

const FENCE: &str = "```";

fn is_indent(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Byte offsets of the fences that start a line in `text`, past any
/// indentation.
fn fence_lines(text: &str) -> impl Iterator<Item = usize> + '_ {
    std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .map(move |start| {
            let line = &text[start..];
            start + line.len() - line.trim_start_matches(is_indent).len()
        })
        .filter(move |&at| text[at..].starts_with(FENCE))
}

/// A bare language word such as `json`, `JSON` or `json5`.
fn is_language_word(info: &str) -> bool {
    let info = info.trim();
    !info.is_empty()
        && info
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Body of a fence, given the text right after its opening backticks.
///
/// A language word on the opening line is dropped. The body ends at the next
/// fence that starts a line, or at the end of the text when the fence is never
/// closed.
fn fence_body(after: &str) -> &str {
    let body = match after.split_once('\n') {
        Some((info, rest)) if info.trim().is_empty() || is_language_word(info) => rest,
        _ => after,
    };
    let end = fence_lines(body).next().unwrap_or(body.len());
    let body = body[..end].trim();
    // Single-line fences close on the same line.
    body.strip_suffix(FENCE).unwrap_or(body).trim()
}

fn is_json_tagged(after: &str) -> bool {
    matches!(after.split_once('\n'), Some((info, _)) if info.trim_end() == "json")
}

/// Remove at most one level of Markdown code fencing.
///
/// Only fences that start a line count. A ```` ```json ```` fence wins over an
/// untagged ```` ``` ```` fence; text with no fence is returned trimmed.
pub fn strip_fences(text: &str) -> &str {
    let openings: Vec<&str> = fence_lines(text)
        .map(|at| &text[at + FENCE.len()..])
        .collect();
    let chosen = openings
        .iter()
        .copied()
        .find(|after| is_json_tagged(after))
        .or_else(|| openings.first().copied());
    match chosen {
        Some(after) => fence_body(after),
        None => text.trim(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Strip fences and decode the remainder as a JSON object.
pub fn decode_object(text: &str) -> Result<Map<String, Value>, AnalysisFailure> {
    let body = strip_fences(text);
    if body.is_empty() {
        return Err(AnalysisFailure::Decode("empty response".to_string()));
    }
    let value: Value =
        serde_json::from_str(body).map_err(|e| AnalysisFailure::Decode(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(AnalysisFailure::Shape(format!(
            "expected a JSON object, got {}",
            kind(&other)
        ))),
    }
}

fn section_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Decode a model answer into a complete [`AnalysisResult`].
///
/// Sections in `expected` that the answer lacks, or leaves null or blank, are
/// filled with [`MISSING_SECTION`]; so is every section outside `expected`.
pub fn decode_analysis(
    text: &str,
    expected: &[Section],
) -> Result<AnalysisResult, AnalysisFailure> {
    let map = decode_object(text)?;
    Ok(AnalysisResult::from_fn(|section| {
        let resolved = expected
            .contains(&section)
            .then(|| section_text(map.get(section.key())))
            .flatten();
        resolved.unwrap_or_else(|| {
            debug!("📭 Model answer has no '{}' section", section.key());
            MISSING_SECTION.to_string()
        })
    }))
}
