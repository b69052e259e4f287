//! Pluggable generation backend behind the agent stages.

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use fquery_core::PipelineError;

use crate::client::Tool;

/// A single structured tool invocation returned by the model
#[derive(Debug, Clone)]
pub struct ToolInvocation {
    pub name: String,
    pub input: JsonValue,
}

/// Narrow interface over the generative call.
///
/// Given a system prompt, the user's free text, and the tools describing the
/// stage's output contract, an implementation must return exactly one
/// invocation of one of those tools. [`crate::ClaudeClient`] is the
/// production implementation; tests substitute deterministic doubles that
/// replay canned invocations.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        input: &str,
        tools: &[Tool],
    ) -> Result<ToolInvocation, PipelineError>;
}
