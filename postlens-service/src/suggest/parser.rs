//! Reply parsing for the generative suggestion service.
//!
//! Two stages: first a raw text blob is pulled out of the reply JSON, whose
//! shape varies across SDK and API versions, by probing known shapes in
//! priority order. Then the blob is classified line by line into suggestions
//! and hashtags, with sentence splitting and last-line hashtag recovery as
//! fallbacks so a sloppy reply still yields a usable list.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

/// Upper bound on suggestions returned to the client
pub const MAX_SUGGESTIONS: usize = 8;

/// Plain (non-bulleted) lines are only accepted until this many suggestions
/// have been collected
const MAX_PLAIN_SUGGESTIONS: usize = 5;

/// Plain lines at or above this length (in characters) are dropped as
/// prose, not suggestions
const MAX_PLAIN_LINE_LEN: usize = 200;

/// At most this many hashtags go into the synthetic `Hashtags:` entry
const MAX_HASHTAGS: usize = 5;

static HASHTAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"#\w+").unwrap());
static BULLET_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(?:\d+[).\s-]|[-•])").unwrap());
static BULLET_STRIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+[).\s-]+|[-•]\s*)").unwrap());
static IDENTIFIER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{2,}$").unwrap());

/// Extract a single raw text blob from a reply of unknown shape.
///
/// Probes are tried in priority order until one yields non-empty text; the
/// final fallback serializes the whole reply so parsing always has input.
pub fn extract_reply_text(reply: &Value) -> String {
    const PROBES: &[fn(&Value) -> Option<String>] = &[
        probe_plain_string,
        probe_output_content,
        probe_candidate_parts,
        probe_candidate_output,
        probe_result_content,
        probe_text_field,
        probe_data_field,
    ];

    for probe in PROBES {
        if let Some(text) = probe(reply) {
            let text = text.trim().to_string();
            if !text.is_empty() {
                return text;
            }
        }
    }

    reply.to_string()
}

fn probe_plain_string(reply: &Value) -> Option<String> {
    reply.as_str().map(str::to_string)
}

/// `output[0].content` as a string or as an array of `{ text }` parts
fn probe_output_content(reply: &Value) -> Option<String> {
    let content = reply.get("output")?.get(0)?.get("content")?;
    match content {
        Value::String(s) => Some(s.clone()),
        Value::Array(parts) => Some(join_text_parts(parts)),
        _ => None,
    }
}

/// `candidates[0].content.parts[*].text` (generateContent REST shape)
fn probe_candidate_parts(reply: &Value) -> Option<String> {
    let parts = reply
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    Some(join_text_parts(parts))
}

/// `candidates[0].output`
fn probe_candidate_output(reply: &Value) -> Option<String> {
    reply
        .get("candidates")?
        .get(0)?
        .get("output")?
        .as_str()
        .map(str::to_string)
}

/// `results[0].content`
fn probe_result_content(reply: &Value) -> Option<String> {
    reply
        .get("results")?
        .get(0)?
        .get("content")?
        .as_str()
        .map(str::to_string)
}

/// Top-level `text` field
fn probe_text_field(reply: &Value) -> Option<String> {
    reply.get("text")?.as_str().map(str::to_string)
}

/// Top-level `data` field, serialized wholesale
fn probe_data_field(reply: &Value) -> Option<String> {
    reply.get("data").map(Value::to_string)
}

fn join_text_parts(parts: &[Value]) -> String {
    parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Classification of one trimmed, non-empty reply line
#[derive(Debug, PartialEq, Eq)]
enum LineClass {
    /// Contains `#word` tokens; contributes hashtags, no suggestion text
    Hashtags(Vec<String>),
    /// Leading numbering or bullet marker, stripped
    Bulleted(String),
    /// Short free-form line, usable as a suggestion
    Plain(String),
    /// Long prose, dropped
    Unclassified,
}

fn classify_line(line: &str) -> LineClass {
    let found: Vec<String> = HASHTAG_RE
        .find_iter(line)
        .map(|m| m.as_str().to_string())
        .collect();
    if !found.is_empty() {
        return LineClass::Hashtags(found);
    }

    if BULLET_RE.is_match(line) {
        let clean = BULLET_STRIP_RE.replace(line, "").trim().to_string();
        return LineClass::Bulleted(clean);
    }

    if line.chars().count() < MAX_PLAIN_LINE_LEN {
        return LineClass::Plain(line.to_string());
    }

    LineClass::Unclassified
}

/// Turn the raw reply blob into an ordered, bounded suggestion list.
pub fn parse_reply(raw: &str) -> Vec<String> {
    let lines: Vec<&str> = raw
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut suggestions: Vec<String> = Vec::new();
    let mut hashtags: Vec<String> = Vec::new();

    for line in &lines {
        match classify_line(line) {
            LineClass::Hashtags(found) => hashtags.extend(found),
            LineClass::Bulleted(clean) => {
                if !clean.is_empty() {
                    suggestions.push(clean);
                }
            }
            LineClass::Plain(text) => {
                if suggestions.len() < MAX_PLAIN_SUGGESTIONS {
                    suggestions.push(text);
                }
            }
            LineClass::Unclassified => {}
        }
    }

    // No line yielded a suggestion: fall back to sentence splitting
    if suggestions.is_empty() {
        suggestions.extend(
            split_sentences(raw)
                .into_iter()
                .take(MAX_PLAIN_SUGGESTIONS),
        );
    }

    // No hashtag line seen: the last line may carry comma-separated tags
    if hashtags.is_empty() {
        if let Some(last_line) = lines.last() {
            hashtags.extend(hashtags_from_trailing_line(last_line));
        }
    }

    if !hashtags.is_empty() {
        let joined = hashtags
            .iter()
            .take(MAX_HASHTAGS)
            .cloned()
            .collect::<Vec<_>>()
            .join(" ");
        suggestions.push(format!("Hashtags: {joined}"));
    }

    suggestions.truncate(MAX_SUGGESTIONS);
    suggestions
}

/// Split on sentence boundaries (`.`, `?`, `!` followed by whitespace)
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        current.push(c);
        if matches!(c, '.' | '?' | '!') && chars.peek().is_none_or(|n| n.is_whitespace()) {
            let sentence = current.trim();
            if !sentence.is_empty() {
                sentences.push(sentence.to_string());
            }
            current.clear();
        }
    }

    let rest = current.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

/// Recover hashtags from a trailing comma/semicolon-separated line. Tokens
/// that are already hashtag-shaped pass through; bare identifiers of length
/// ≥ 2 are normalized with a `#` prefix.
fn hashtags_from_trailing_line(line: &str) -> Vec<String> {
    line.split([',', ';'])
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| {
            if token.starts_with('#') {
                Some(token.to_string())
            } else if IDENTIFIER_RE.is_match(token) {
                Some(format!("#{token}"))
            } else {
                None
            }
        })
        .collect()
}
