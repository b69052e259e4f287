//! Environment configuration

use crate::client;

/// FHIR server queried when `FHIR_SERVER_URL` is not set
pub const DEFAULT_SERVER_URL: &str = "https://r4.smarthealthit.org";

/// Pipeline configuration loaded from environment variables
pub struct Config {
    pub anthropic_api_key: Option<String>,
    pub model: String,
    pub fhir_server_url: String,
    /// Applied by the caller when building its `reqwest::Client`; the
    /// pipeline itself imposes no timeout
    pub http_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
            model: std::env::var("FQUERY_MODEL")
                .unwrap_or_else(|_| client::DEFAULT_MODEL.to_string()),
            fhir_server_url: std::env::var("FHIR_SERVER_URL")
                .unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string()),
            http_timeout_secs: std::env::var("HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
        }
    }
}
