//! HTTP client for the generative suggestion service (Gemini REST API).

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use crate::config::GenAiConfig;
use crate::error::GenAiError;

/// Generative service client.
///
/// Built once at startup and passed into the suggestion generator; callers
/// that run without a credential never construct one.
pub struct GenAiClient {
    client: Client,
    config: GenAiConfig,
    api_key: String,
}

impl GenAiClient {
    pub fn new(config: GenAiConfig, api_key: String) -> Result<Self, GenAiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GenAiError::Connection {
                url: config.base_url.clone(),
                source: e,
            })?;

        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    /// Send one prompt and return the raw reply body.
    ///
    /// The body is kept as untyped JSON on purpose: the reply shape varies
    /// across service versions and the parser probes the known shapes in
    /// priority order.
    pub async fn generate_content(&self, prompt: &str) -> Result<Value, GenAiError> {
        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url, self.config.model
        );

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: self.config.max_output_tokens,
                temperature: self.config.temperature,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenAiError::Connection {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(GenAiError::Generation { status, message });
        }

        response
            .json()
            .await
            .map_err(|e| GenAiError::InvalidResponse { source: e })
    }
}

// Gemini generateContent request types

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    temperature: f32,
}
