//! Static configuration loaded at startup.
//! Settings affect server binding or external tool invocation and require
//! a restart to change.

use serde::Deserialize;

/// Top-level service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StaticConfig {
    #[serde(default = "default_server")]
    pub server: ServerConfig,

    #[serde(default = "default_limits")]
    pub limits: LimitsConfig,

    #[serde(default = "default_extraction")]
    pub extraction: ExtractionConfig,

    #[serde(default = "default_genai")]
    pub genai: GenAiConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Upload limits
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    #[serde(default = "default_max_upload_size_bytes")]
    pub max_upload_size_bytes: u64,
}

/// External extraction tool configuration (pdftoppm and tesseract)
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractionConfig {
    /// DPI passed to pdftoppm when rendering pages
    #[serde(default = "default_rasterize_dpi")]
    pub rasterize_dpi: u32,

    #[serde(default = "default_rasterize_timeout_secs")]
    pub rasterize_timeout_secs: u64,

    /// Tesseract language code
    #[serde(default = "default_ocr_language")]
    pub ocr_language: String,

    /// Per-page recognition timeout
    #[serde(default = "default_ocr_timeout_secs")]
    pub ocr_timeout_secs: u64,
}

/// Generative suggestion service configuration.
///
/// The API key is optional: when absent the service runs in heuristic-only
/// mode rather than failing at startup.
#[derive(Debug, Clone, Deserialize)]
pub struct GenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_genai_base_url")]
    pub base_url: String,

    #[serde(default = "default_genai_model")]
    pub model: String,

    #[serde(default = "default_genai_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_genai_temperature")]
    pub temperature: f32,

    #[serde(default = "default_genai_timeout_secs")]
    pub request_timeout_secs: u64,
}

// ==================== Default Value Functions ====================

pub(crate) fn default_server() -> ServerConfig {
    ServerConfig {
        host: default_host(),
        port: default_port(),
    }
}

pub(crate) fn default_host() -> String {
    "0.0.0.0".to_string()
}

pub(crate) fn default_port() -> u16 {
    5000
}

pub(crate) fn default_limits() -> LimitsConfig {
    LimitsConfig {
        max_upload_size_bytes: default_max_upload_size_bytes(),
    }
}

pub(crate) fn default_max_upload_size_bytes() -> u64 {
    10 * 1024 * 1024
}

pub(crate) fn default_extraction() -> ExtractionConfig {
    ExtractionConfig {
        rasterize_dpi: default_rasterize_dpi(),
        rasterize_timeout_secs: default_rasterize_timeout_secs(),
        ocr_language: default_ocr_language(),
        ocr_timeout_secs: default_ocr_timeout_secs(),
    }
}

pub(crate) fn default_rasterize_dpi() -> u32 {
    150
}

pub(crate) fn default_rasterize_timeout_secs() -> u64 {
    120
}

pub(crate) fn default_ocr_language() -> String {
    "eng".to_string()
}

pub(crate) fn default_ocr_timeout_secs() -> u64 {
    120
}

pub(crate) fn default_genai() -> GenAiConfig {
    GenAiConfig {
        api_key: None,
        base_url: default_genai_base_url(),
        model: default_genai_model(),
        max_output_tokens: default_genai_max_output_tokens(),
        temperature: default_genai_temperature(),
        request_timeout_secs: default_genai_timeout_secs(),
    }
}

pub(crate) fn default_genai_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

pub(crate) fn default_genai_model() -> String {
    "gemini-2.5-flash".to_string()
}

pub(crate) fn default_genai_max_output_tokens() -> u32 {
    300
}

pub(crate) fn default_genai_temperature() -> f32 {
    0.7
}

pub(crate) fn default_genai_timeout_secs() -> u64 {
    60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_config() {
        let config: StaticConfig = ::config::Config::builder()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.limits.max_upload_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.extraction.ocr_language, "eng");
        assert!(config.genai.api_key.is_none());
        assert_eq!(config.genai.model, "gemini-2.5-flash");
    }
}
