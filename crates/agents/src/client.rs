//! Claude API client for the Anthropic Messages API

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value as JsonValue, json};

use fquery_core::PipelineError;

use crate::backend::{GenerationBackend, ToolInvocation};

const API_URL: &str = "https://api.anthropic.com/v1/messages";
const API_VERSION: &str = "2023-06-01";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-5-20250929";

/// Client for the Anthropic Claude Messages API
#[derive(Clone)]
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub role: String,
    pub content: String,
}

/// Content block within a response message
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: JsonValue,
    },
}

/// Tool definition for Claude
#[derive(Debug, Clone, Serialize)]
pub struct Tool {
    pub name: String,
    pub description: String,
    pub input_schema: JsonValue,
}

/// Request body for the Messages API
#[derive(Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<JsonValue>,
}

/// Response from the Messages API
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    #[allow(dead_code)]
    pub id: String,
    pub content: Vec<ContentBlock>,
    pub stop_reason: String,
}

/// Error detail from the Messages API
#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

impl ClaudeClient {
    /// Create a new client with the given API key and the default model
    pub fn new(api_key: String) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL.to_string())
    }

    /// Create a new client with an explicit model id
    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }

    /// Send a request with messages, tools, and a tool_choice directive
    async fn send(
        &self,
        system: &str,
        messages: Vec<Message>,
        tools: Vec<Tool>,
        tool_choice: JsonValue,
    ) -> Result<ApiResponse, PipelineError> {
        let request = ApiRequest {
            model: self.model.clone(),
            max_tokens: 4096,
            system: Some(system.to_string()),
            messages,
            tools: Some(tools),
            tool_choice: Some(tool_choice),
        };

        let response = self
            .http
            .post(API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PipelineError::Timeout(format!("Claude API request timed out: {}", e))
                } else {
                    PipelineError::Backend(format!("HTTP request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if let Ok(api_err) = serde_json::from_str::<ApiError>(&body) {
                return Err(PipelineError::Backend(format!(
                    "Claude API error ({}): {}",
                    status, api_err.error.message
                )));
            }
            return Err(PipelineError::Backend(format!(
                "Claude API error ({}): {}",
                status, body
            )));
        }

        response
            .json::<ApiResponse>()
            .await
            .map_err(|e| PipelineError::Backend(format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl GenerationBackend for ClaudeClient {
    /// Run one forced-tool-use generation and return the invoked tool.
    ///
    /// `tool_choice: any` makes the model pick exactly one of the supplied
    /// tools, which is how the mutually-exclusive success/error output
    /// contract is enforced at the API level.
    async fn generate(
        &self,
        system: &str,
        input: &str,
        tools: &[Tool],
    ) -> Result<ToolInvocation, PipelineError> {
        let messages = vec![Message {
            role: "user".to_string(),
            content: input.to_string(),
        }];

        let response = self
            .send(system, messages, tools.to_vec(), json!({"type": "any"}))
            .await?;

        tracing::debug!(stop_reason = %response.stop_reason, "Claude response received");

        for block in response.content {
            if let ContentBlock::ToolUse { name, input, .. } = block {
                return Ok(ToolInvocation { name, input });
            }
        }

        Err(PipelineError::Backend(
            "no tool_use block in model response".to_string(),
        ))
    }
}
