//! Response types: canonical results and provider response bodies.

use super::common::{StopReason, UsageInfo};
use super::message::{History, Message};
use serde::{Deserialize, Serialize};

/// Result of a text completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextCompletion {
    /// Generated text.
    pub text: String,
    /// Reason for stopping generation, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
    /// Token usage, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<UsageInfo>,
}

impl TextCompletion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stop_reason: None,
            usage: None,
        }
    }
}

/// Images produced by a generation or variation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageGenerationOutput {
    /// Base64-encoded images, between one and five.
    pub images: Vec<String>,
}

/// Result of a converse turn.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverseReply {
    /// The assistant's reply.
    pub message: Message,
    pub stop_reason: Option<StopReason>,
    pub usage: Option<UsageInfo>,
    /// History including this turn's request and reply.
    pub history: History,
}

impl ConverseReply {
    /// Text of the reply.
    pub fn text_reply(&self) -> String {
        self.message.text()
    }

    /// True when the model is waiting for a tool result.
    pub fn requests_tool_use(&self) -> bool {
        self.history.awaits_tool_result()
    }
}

// ============================================================================
// Titan-specific response types
// ============================================================================

/// Titan text generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextResponse {
    /// Token count of the prompt.
    #[serde(default)]
    pub input_text_token_count: Option<u32>,
    /// Generation results.
    pub results: Vec<TitanTextResult>,
}

/// Titan text generation result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextResult {
    /// Generated text output.
    pub output_text: String,
    /// Token count for this result.
    #[serde(default)]
    pub token_count: u32,
    /// Reason for completion.
    #[serde(default)]
    pub completion_reason: Option<String>,
}

/// Titan (and Nova Canvas) image response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitanImageResponse {
    /// Base64 images.
    #[serde(default)]
    pub images: Vec<String>,
    /// Error reported in place of images.
    #[serde(default)]
    pub error: Option<String>,
}

// ============================================================================
// Nova-specific response types
// ============================================================================

/// Nova invoke response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaResponse {
    pub output: NovaOutput,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: Option<NovaUsage>,
}

/// Nova output wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovaOutput {
    pub message: NovaOutputMessage,
}

/// Nova output message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovaOutputMessage {
    pub role: String,
    pub content: Vec<NovaOutputContent>,
}

/// Nova output content; non-text blocks carry no `text`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovaOutputContent {
    #[serde(default)]
    pub text: Option<String>,
}

/// Nova usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl From<NovaUsage> for UsageInfo {
    fn from(usage: NovaUsage) -> Self {
        UsageInfo::new(usage.input_tokens, usage.output_tokens)
    }
}

// ============================================================================
// Claude-specific response types
// ============================================================================

/// Claude messages API response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeResponse {
    /// Response ID.
    #[serde(default)]
    pub id: Option<String>,
    /// Content blocks.
    pub content: Vec<ClaudeContentBlock>,
    /// Stop reason.
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Stop sequence if applicable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_sequence: Option<String>,
    /// Token usage.
    #[serde(default)]
    pub usage: Option<ClaudeUsage>,
}

/// Claude content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClaudeContentBlock {
    /// Text content block.
    #[serde(rename = "text")]
    Text {
        /// The text content.
        text: String,
    },
    /// Any block kind a text completion does not use.
    #[serde(other)]
    Other,
}

/// Claude usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeUsage {
    /// Input tokens.
    pub input_tokens: u32,
    /// Output tokens.
    pub output_tokens: u32,
}

impl From<ClaudeUsage> for UsageInfo {
    fn from(usage: ClaudeUsage) -> Self {
        UsageInfo::new(usage.input_tokens, usage.output_tokens)
    }
}

// ============================================================================
// LLaMA-specific response types
// ============================================================================

/// LLaMA generation response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlamaResponse {
    /// Generated text.
    pub generation: String,
    /// Number of prompt tokens.
    #[serde(default)]
    pub prompt_token_count: Option<u32>,
    /// Number of generation tokens.
    #[serde(default)]
    pub generation_token_count: Option<u32>,
    /// Stop reason.
    #[serde(default)]
    pub stop_reason: Option<String>,
}

// ============================================================================
// Model discovery response types
// ============================================================================

/// List foundation models response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsResponse {
    /// Raw model summaries; fields are checked when converted.
    #[serde(default)]
    pub model_summaries: Option<Vec<FoundationModelSummary>>,
}

/// Foundation model summary as sent by the service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationModelSummary {
    pub model_arn: Option<String>,
    pub model_id: Option<String>,
    pub model_name: Option<String>,
    pub provider_name: Option<String>,
    pub response_streaming_supported: Option<bool>,
    pub model_lifecycle: Option<ModelLifecycle>,
}

/// Model lifecycle information.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelLifecycle {
    /// Lifecycle status.
    pub status: Option<String>,
}
