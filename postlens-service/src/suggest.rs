//! Engagement suggestion generation.
//!
//! Extracted post text is sent to a generative service with a fixed
//! strategist prompt, and the free-text reply is parsed into a bounded
//! suggestion list. Without a configured credential, or whenever the call or
//! parse fails, a deterministic heuristic list takes over; a service outage
//! must never fail the upload request.

pub mod client;
pub mod parser;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::GenAiConfig;
use crate::error::{GenAiError, ServiceResult};
use client::GenAiClient;

/// Where a suggestion list came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuggestionSource {
    #[serde(rename = "genai")]
    GenAi,
    #[serde(rename = "fallback")]
    Fallback,
}

/// An ordered, bounded list of suggestions with its provenance
#[derive(Debug)]
pub struct SuggestionSet {
    pub items: Vec<String>,
    pub source: SuggestionSource,
}

/// Suggestion generator. Holds the generative client when a credential is
/// configured; otherwise runs in heuristic-only mode.
pub struct SuggestionGenerator {
    client: Option<GenAiClient>,
}

impl SuggestionGenerator {
    pub fn new(config: &GenAiConfig) -> ServiceResult<Self> {
        let client = match &config.api_key {
            Some(key) if !key.is_empty() => {
                info!(model = %config.model, "Generative suggestions enabled");
                Some(GenAiClient::new(config.clone(), key.clone())?)
            }
            _ => {
                info!("No generative service credential configured, using heuristic suggestions");
                None
            }
        };

        Ok(Self { client })
    }

    /// Generate suggestions for the given post text. Infallible: every
    /// failure path degrades to the heuristic list.
    pub async fn generate(&self, text: &str) -> SuggestionSet {
        if text.trim().is_empty() {
            return SuggestionSet {
                items: heuristic_suggestions(text),
                source: SuggestionSource::Fallback,
            };
        }

        if let Some(client) = &self.client {
            match self.try_model(client, text).await {
                Ok(items) if !items.is_empty() => {
                    return SuggestionSet {
                        items,
                        source: SuggestionSource::GenAi,
                    };
                }
                Ok(_) => {
                    warn!("Generative service reply parsed to nothing, using heuristics");
                }
                Err(e) => {
                    warn!(error = %e, "Generative service call failed, using heuristics");
                }
            }
        }

        SuggestionSet {
            items: heuristic_suggestions(text),
            source: SuggestionSource::Fallback,
        }
    }

    async fn try_model(&self, client: &GenAiClient, text: &str) -> Result<Vec<String>, GenAiError> {
        let prompt = build_prompt(text);
        let reply = client.generate_content(&prompt).await?;

        let raw = parser::extract_reply_text(&reply);
        if raw.is_empty() {
            return Err(GenAiError::EmptyReply);
        }

        Ok(parser::parse_reply(&raw))
    }
}

/// Fixed prompt template: strategist framing, bounded suggestion and hashtag
/// counts, and an explicit instruction not to rewrite the post.
fn build_prompt(text: &str) -> String {
    [
        "You are an expert social media strategist specialized in growing engagement \
         across Instagram, Facebook, LinkedIn, and X.",
        "Analyze the post text below and provide:",
        "1. Five concise, highly actionable suggestions to improve engagement. \
         Focus on clarity, emotion, hooks, and call-to-actions.",
        "2. Three optimized hashtags relevant to the post theme. \
         Output them comma-separated and avoid overly generic hashtags.",
        "Guidelines:",
        "- Keep suggestions short (max 12-15 words each).",
        "- Avoid repeating the same idea.",
        "- Do NOT rewrite the post; only give improvement suggestions.",
        "- Ensure the output is formatted cleanly and consistently.",
        "",
        "Post to analyze:",
        text,
    ]
    .join("\n\n")
}

/// Deterministic heuristic suggestions, in fixed order.
///
/// For empty text only the no-readable-text entry is emitted; otherwise the
/// applicable conditional tips are followed by the three fixed tips.
pub fn heuristic_suggestions(text: &str) -> Vec<String> {
    let mut suggestions = Vec::new();

    if text.trim().is_empty() {
        suggestions.push("No readable text found — try uploading a clearer scan or PDF.".to_string());
        return suggestions;
    }

    if text.chars().count() > 300 {
        suggestions.push(
            "Consider shortening the post; people engage more with shorter content.".to_string(),
        );
    }

    if !text.trim().ends_with(['.', '!', '?']) {
        suggestions.push("Add a question or CTA at the end to invite replies.".to_string());
    }

    suggestions.push("Use 2-3 trending hashtags relevant to your topic.".to_string());
    suggestions.push(
        "Break long paragraphs into short lines (1-2 sentences each) for easier reading."
            .to_string(),
    );
    suggestions.push("Add a clear CTA and 1-2 emojis to increase visibility.".to_string());

    suggestions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heuristics_for_long_text_ending_in_period() {
        let text = format!("{}.", "a".repeat(349));
        assert_eq!(
            heuristic_suggestions(&text),
            vec![
                "Consider shortening the post; people engage more with shorter content.",
                "Use 2-3 trending hashtags relevant to your topic.",
                "Break long paragraphs into short lines (1-2 sentences each) for easier reading.",
                "Add a clear CTA and 1-2 emojis to increase visibility.",
            ]
        );
    }

    #[test]
    fn test_length_tip_counts_chars_not_bytes() {
        // 251 characters but over 500 bytes: no shortening tip
        let text = format!("{}.", "é".repeat(250));
        let suggestions = heuristic_suggestions(&text);
        assert_eq!(
            suggestions[0],
            "Use 2-3 trending hashtags relevant to your topic."
        );
    }

    #[test]
    fn test_heuristics_for_short_text_without_terminator() {
        let suggestions = heuristic_suggestions("check out my new post");
        assert_eq!(
            suggestions[0],
            "Add a question or CTA at the end to invite replies."
        );
        assert_eq!(suggestions.len(), 4);
    }

    #[test]
    fn test_heuristics_empty_text_short_circuits() {
        assert_eq!(
            heuristic_suggestions("   "),
            vec!["No readable text found — try uploading a clearer scan or PDF."]
        );
    }

    #[test]
    fn test_heuristics_are_deterministic() {
        let text = "A short post!";
        assert_eq!(heuristic_suggestions(text), heuristic_suggestions(text));
    }

    #[tokio::test]
    async fn test_generate_without_credential_uses_fallback() {
        let generator = SuggestionGenerator::new(&crate::config::default_genai()).unwrap();
        let set = generator.generate("A short post without an ending").await;
        assert_eq!(set.source, SuggestionSource::Fallback);
        assert!(!set.items.is_empty());
    }

    #[tokio::test]
    async fn test_generate_empty_text_uses_fallback_entry_only() {
        let generator = SuggestionGenerator::new(&crate::config::default_genai()).unwrap();
        let set = generator.generate("").await;
        assert_eq!(set.source, SuggestionSource::Fallback);
        assert_eq!(set.items.len(), 1);
    }

    #[test]
    fn test_prompt_contains_post_text_and_guidelines() {
        let prompt = build_prompt("my post body");
        assert!(prompt.contains("my post body"));
        assert!(prompt.contains("Do NOT rewrite the post"));
    }

    #[test]
    fn test_suggestion_source_wire_names() {
        assert_eq!(
            serde_json::to_string(&SuggestionSource::GenAi).unwrap(),
            "\"genai\""
        );
        assert_eq!(
            serde_json::to_string(&SuggestionSource::Fallback).unwrap(),
            "\"fallback\""
        );
    }
}
