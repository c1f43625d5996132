use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main service error type
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Text extraction failed")]
    Extraction(#[from] ExtractionError),

    #[error("{0}")]
    GenAi(#[from] GenAiError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// Extraction pipeline errors.
///
/// Direct text-layer parse failures are not represented here: they degrade
/// to an empty string and trigger the OCR fallback instead of failing the
/// request. Everything below is fatal for the request it occurs in.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error(
        "Failed to convert PDF pages to images for OCR. \
         Ensure Poppler (pdftoppm) is installed and in PATH"
    )]
    RasterizerMissing {
        #[source]
        source: std::io::Error,
    },

    #[error("PDF rasterization failed")]
    RasterizerFailed {
        status: Option<i32>,
        stderr: String,
    },

    #[error("PDF rasterization timed out after {secs}s")]
    RasterizerTimeout { secs: u64 },

    #[error("OCR engine not found. Ensure tesseract is installed and in PATH")]
    OcrMissing {
        #[source]
        source: std::io::Error,
    },

    #[error("OCR failed on page {page}")]
    OcrFailed {
        page: usize,
        status: Option<i32>,
        stderr: String,
    },

    #[error("OCR timed out on page {page} after {secs}s")]
    OcrTimeout { page: usize, secs: u64 },

    #[error("IO error during extraction")]
    Io(#[source] std::io::Error),
}

/// Generative suggestion service errors.
///
/// These never surface as request failures: the suggestion generator catches
/// them and falls back to heuristics. They exist so the fallback decision is
/// logged with a cause.
#[derive(Error, Debug)]
pub enum GenAiError {
    #[error("Connection failed to generative service at {url}")]
    Connection {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Generation failed (status {status}): {message}")]
    Generation { status: u16, message: String },

    #[error("Generative service returned an empty reply")]
    EmptyReply,

    #[error("Invalid response from generative service")]
    InvalidResponse {
        #[source]
        source: reqwest::Error,
    },
}

/// API error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ServiceError {
    fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            ServiceError::InvalidRequest { .. } => "invalid_request",
            ServiceError::Extraction(ExtractionError::RasterizerMissing { .. }) => {
                "rasterizer_missing"
            }
            ServiceError::Extraction(ExtractionError::RasterizerFailed { .. }) => {
                "rasterizer_failed"
            }
            ServiceError::Extraction(ExtractionError::RasterizerTimeout { .. }) => {
                "rasterizer_timeout"
            }
            ServiceError::Extraction(ExtractionError::OcrMissing { .. }) => "ocr_missing",
            ServiceError::Extraction(ExtractionError::OcrFailed { .. }) => "ocr_failed",
            ServiceError::Extraction(ExtractionError::OcrTimeout { .. }) => "ocr_timeout",
            ServiceError::Extraction(ExtractionError::Io(_)) => "io_error",
            ServiceError::GenAi(_) => "genai_error",
            ServiceError::Config { .. } => "config_error",
        }
    }

    /// Human-readable detail for the response body, beyond the display message
    fn details(&self) -> Option<String> {
        match self {
            ServiceError::Extraction(ExtractionError::RasterizerMissing { source })
            | ServiceError::Extraction(ExtractionError::OcrMissing { source }) => {
                Some(source.to_string())
            }
            ServiceError::Extraction(ExtractionError::RasterizerFailed { status, stderr })
            | ServiceError::Extraction(ExtractionError::OcrFailed { status, stderr, .. }) => {
                Some(match status {
                    Some(code) => format!("exit status {code}: {}", stderr.trim()),
                    None => format!("killed by signal: {}", stderr.trim()),
                })
            }
            ServiceError::Extraction(ExtractionError::Io(source)) => Some(source.to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code().to_string();

        let response = ErrorResponse {
            error: self.to_string(),
            details: self.details(),
            code: Some(code),
        };

        (status, Json(response)).into_response()
    }
}

/// Result type alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
