//! Modality implementations for the Bedrock model families.
//!
//! Each family adapter implements one trait per capability it offers:
//! - [`TextModality`]: single-prompt text completion over `InvokeModel`
//! - [`ConverseModality`]: multi-turn chat over the Converse API
//! - [`TextToImageModality`] and [`ImageVariationModality`]: image generation
//!
//! Adapters only translate. They never talk to the transport themselves.

pub mod claude;
pub mod converse;
pub mod llama;
pub mod models;
pub mod nova;
pub mod titan;

pub use claude::AnthropicText;
pub use llama::LlamaText;
pub use models::{parse_model_summaries, ModelLifecycleStatus, ModelSummary};
pub use nova::NovaText;
pub use titan::{TitanImage, TitanText};

use crate::error::{BedrockError, CodecError};
use crate::types::{
    ContentKind, ConverseParameters, ImageGenerationOutput, ImageGenerationParameters, Message,
    ResolvedImageParameters, ResolvedParameters, StopReason, TextCompletion,
    TextGenerationParameters, Tool, UsageInfo,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Conversation features a converse adapter accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConverseFeature {
    TextGeneration,
    SystemPrompts,
    Vision,
    Document,
    Video,
    ToolUse,
}

impl ConverseFeature {
    /// Feature needed to send a content block of `kind`.
    pub fn required_for(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Text => ConverseFeature::TextGeneration,
            ContentKind::Image => ConverseFeature::Vision,
            ContentKind::Video => ConverseFeature::Video,
            ContentKind::Document => ConverseFeature::Document,
            ContentKind::ToolUse | ContentKind::ToolResult => ConverseFeature::ToolUse,
        }
    }
}

impl fmt::Display for ConverseFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConverseFeature::TextGeneration => "text generation",
            ConverseFeature::SystemPrompts => "system prompts",
            ConverseFeature::Vision => "vision",
            ConverseFeature::Document => "documents",
            ConverseFeature::Video => "video",
            ConverseFeature::ToolUse => "tool use",
        };
        f.write_str(name)
    }
}

/// Common identity of every adapter.
pub trait Modality: Send + Sync + fmt::Debug {
    /// Human-readable adapter name.
    fn name(&self) -> &str;
}

/// Single-prompt text completion.
pub trait TextModality: Modality {
    /// Knob constraints of this model.
    fn text_parameters(&self) -> &TextGenerationParameters;

    /// Serializes the family's request body.
    fn build_text_request(
        &self,
        prompt: &str,
        parameters: &ResolvedParameters,
    ) -> Result<Vec<u8>, BedrockError>;

    /// Extracts text and stop reason from the family's response body.
    fn parse_text_response(&self, body: &[u8]) -> Result<TextCompletion, BedrockError>;
}

/// Multi-turn chat over the Converse API.
pub trait ConverseModality: Modality {
    /// Converse view of the model's knob constraints.
    fn converse_parameters(&self) -> ConverseParameters;

    /// Features this model accepts in conversations.
    fn converse_features(&self) -> &[ConverseFeature];

    fn supports(&self, feature: ConverseFeature) -> bool {
        self.converse_features().contains(&feature)
    }

    /// Converts a canonical message to its Converse wire form.
    fn to_provider_message(&self, message: &Message) -> Result<Value, BedrockError> {
        converse::encode_message(message, self.converse_features())
    }

    /// Converts a Converse wire message to canonical form.
    fn from_provider_message(&self, value: &Value) -> Result<Message, BedrockError> {
        converse::decode_message(value)
    }

    /// Serializes a full Converse request body.
    fn build_converse_request(
        &self,
        messages: &[Message],
        system_prompts: &[String],
        tools: &[Tool],
        parameters: &ResolvedParameters,
    ) -> Result<Vec<u8>, BedrockError> {
        converse::build_request_body(self, messages, system_prompts, tools, parameters)
    }

    /// Parses a Converse response body.
    fn parse_converse_response(
        &self,
        body: &[u8],
    ) -> Result<(Message, Option<StopReason>, Option<UsageInfo>), BedrockError> {
        converse::parse_response_body(self, body)
    }
}

/// Text-to-image generation.
pub trait TextToImageModality: Modality {
    fn image_parameters(&self) -> &ImageGenerationParameters;

    fn build_text_to_image_request(
        &self,
        prompt: &str,
        parameters: &ResolvedImageParameters,
    ) -> Result<Vec<u8>, BedrockError>;

    /// Extracts between one and five generated images.
    fn parse_image_response(&self, body: &[u8]) -> Result<ImageGenerationOutput, BedrockError>;
}

/// Image variation from reference images.
pub trait ImageVariationModality: Modality {
    fn variation_parameters(&self) -> &ImageGenerationParameters;

    fn build_image_variation_request(
        &self,
        prompt: &str,
        images: &[String],
        similarity: f64,
        parameters: &ResolvedImageParameters,
    ) -> Result<Vec<u8>, BedrockError>;

    /// Extracts between one and five generated images.
    fn parse_variation_response(
        &self,
        body: &[u8],
    ) -> Result<ImageGenerationOutput, BedrockError>;
}

/// Serialize a request body to JSON bytes.
pub(crate) fn encode_body<T: Serialize>(body: &T) -> Result<Vec<u8>, BedrockError> {
    serde_json::to_vec(body)
        .map_err(|e| CodecError::encoding(format!("Failed to serialize request: {}", e)).into())
}

/// Parse a response body, naming the family in the error.
pub(crate) fn decode_body<T: DeserializeOwned>(
    body: &[u8],
    context: &str,
) -> Result<T, BedrockError> {
    serde_json::from_slice(body)
        .map_err(|e| CodecError::decoding(format!("Failed to parse {}: {}", context, e)).into())
}
