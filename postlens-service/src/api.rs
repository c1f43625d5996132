//! HTTP API for the post analyzer service.
//!
//! One analysis endpoint: a multipart document upload comes in, extracted
//! text plus a suggestion list goes out. Persistence and UI concerns live in
//! other services; this boundary only speaks JSON.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::StaticConfig;
use crate::error::{ServiceError, ServiceResult};
use crate::extraction::{DocumentInput, DocumentSource, Extractor};
use crate::suggest::{SuggestionGenerator, SuggestionSource};

/// Application state
pub struct AppState {
    pub extractor: Extractor,
    pub suggester: SuggestionGenerator,
}

/// Build the API router
pub fn router(state: Arc<AppState>, config: &StaticConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let max_body_size = config.limits.max_upload_size_bytes as usize;

    let api_routes = Router::new().route(
        "/analyze",
        post(analyze_handler).layer(DefaultBodyLimit::max(max_body_size)),
    );

    Router::new()
        .route("/health", get(health_handler))
        .nest("/api", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Analysis response body
#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub text: String,
    pub words: usize,
    pub suggestions: Vec<String>,
    #[serde(rename = "suggestionSource")]
    pub suggestion_source: SuggestionSource,
}

/// Analyze an uploaded document: extract its text and generate suggestions
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> ServiceResult<Json<AnalyzeResponse>> {
    let mut upload: Option<DocumentInput> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InvalidRequest {
            message: e.to_string(),
        })?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original_filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ServiceError::InvalidRequest {
                message: e.to_string(),
            })?;

        upload = Some(DocumentInput {
            source: DocumentSource::Bytes(data.to_vec()),
            content_type,
            original_filename,
        });
    }

    let Some(input) = upload else {
        return Err(ServiceError::InvalidRequest {
            message: "No file uploaded".to_string(),
        });
    };

    let result = state.extractor.extract(&input).await?;

    if result.text.trim().is_empty() {
        info!(filename = %input.original_filename, "No readable text in upload");
        return Ok(Json(AnalyzeResponse {
            text: String::new(),
            words: 0,
            suggestions: vec!["No readable text found in the uploaded file.".to_string()],
            suggestion_source: SuggestionSource::Fallback,
        }));
    }

    let words = count_words(&result.text);
    let suggestions = state.suggester.generate(&result.text).await;

    info!(
        filename = %input.original_filename,
        method = ?result.method,
        words,
        source = ?suggestions.source,
        "Document analyzed"
    );

    Ok(Json(AnalyzeResponse {
        text: result.text,
        words,
        suggestions: suggestions.items,
        suggestion_source: suggestions.source,
    }))
}

/// Count whitespace-delimited non-empty tokens
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Health check response
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_router() -> Router {
        let state = Arc::new(AppState {
            extractor: Extractor::new(crate::config::default_extraction()),
            suggester: SuggestionGenerator::new(&crate::config::default_genai()).unwrap(),
        });
        let config = StaticConfig {
            server: crate::config::default_server(),
            limits: crate::config::default_limits(),
            extraction: crate::config::default_extraction(),
            genai: crate::config::default_genai(),
        };
        router(state, &config)
    }

    async fn error_message(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        body["error"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_malformed_multipart_reports_stream_error() {
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "multipart/form-data; boundary=xyz")
            .body(Body::from("no boundary in sight"))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // The stream error must surface, not the missing-file message
        let message = error_message(response).await;
        assert!(
            !message.contains("No file uploaded"),
            "stream error was masked: {message}"
        );
    }

    #[tokio::test]
    async fn test_upload_without_file_field_is_rejected() {
        let body = "--xyz\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhello\r\n--xyz--\r\n";
        let request = Request::builder()
            .method("POST")
            .uri("/api/analyze")
            .header("content-type", "multipart/form-data; boundary=xyz")
            .body(Body::from(body))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(error_message(response).await.contains("No file uploaded"));
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("   \n\t "), 0);
        assert_eq!(count_words("one"), 1);
        assert_eq!(count_words("  one   two\nthree\t"), 3);
    }

    #[test]
    fn test_empty_text_response_shape() {
        let response = AnalyzeResponse {
            text: String::new(),
            words: 0,
            suggestions: vec!["No readable text found in the uploaded file.".to_string()],
            suggestion_source: SuggestionSource::Fallback,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "text": "",
                "words": 0,
                "suggestions": ["No readable text found in the uploaded file."],
                "suggestionSource": "fallback",
            })
        );
    }
}
