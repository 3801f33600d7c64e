//! Anthropic Claude model family.
//!
//! Text completions go through the Messages API body with a single user
//! message. Claude 3 and later also accept images and tools in conversations.

use super::{
    decode_body, encode_body, ConverseFeature, ConverseModality, Modality, TextModality,
};
use crate::error::{BedrockError, CodecError, ParameterError};
use crate::types::{
    ClaudeContentBlock, ClaudeMessage, ClaudeRequest, ClaudeResponse, ConverseParameters,
    Parameter, ParameterName, ResolvedParameters, StopReason, StopSequenceParameters,
    TextCompletion, TextGenerationParameters, UsageInfo,
};
use tracing::debug;

/// Anthropic API version for Bedrock.
const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

const MAX_PROMPT_SIZE: usize = 200_000;
const MAX_STOP_SEQUENCES: usize = 8191;

/// Claude knob constraints.
///
/// `max_tokens` is the output ceiling, also used as the default. Legacy
/// models pass `None`: the caller must then choose a value up to 4096.
pub fn text_parameters(max_tokens: Option<u32>) -> TextGenerationParameters {
    let max_tokens = match max_tokens {
        Some(maximum) => Parameter::new(ParameterName::MaxTokens, 1, maximum, maximum),
        None => Parameter::without_default(ParameterName::MaxTokens, 1, 4096),
    };
    TextGenerationParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, 1.0),
        max_tokens,
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.999),
        top_k: Parameter::new(ParameterName::TopK, 0, 500, 0),
        stop_sequences: StopSequenceParameters::new(Some(MAX_STOP_SEQUENCES), Vec::new()),
        max_prompt_size: Some(MAX_PROMPT_SIZE),
    }
}

/// Claude text generation adapter.
#[derive(Debug, Clone)]
pub struct AnthropicText {
    name: &'static str,
    parameters: TextGenerationParameters,
    features: Vec<ConverseFeature>,
}

impl AnthropicText {
    /// Claude 3 and later: vision and tool use included.
    pub fn new(name: &'static str, parameters: TextGenerationParameters) -> Self {
        Self {
            name,
            parameters,
            features: vec![
                ConverseFeature::TextGeneration,
                ConverseFeature::SystemPrompts,
                ConverseFeature::Document,
                ConverseFeature::Vision,
                ConverseFeature::ToolUse,
            ],
        }
    }

    /// Claude instant and v2: text and documents only.
    pub fn legacy(name: &'static str, parameters: TextGenerationParameters) -> Self {
        Self {
            name,
            parameters,
            features: vec![
                ConverseFeature::TextGeneration,
                ConverseFeature::SystemPrompts,
                ConverseFeature::Document,
            ],
        }
    }
}

impl Modality for AnthropicText {
    fn name(&self) -> &str {
        self.name
    }
}

impl TextModality for AnthropicText {
    fn text_parameters(&self) -> &TextGenerationParameters {
        &self.parameters
    }

    fn build_text_request(
        &self,
        prompt: &str,
        parameters: &ResolvedParameters,
    ) -> Result<Vec<u8>, BedrockError> {
        let max_tokens = parameters
            .max_tokens
            .ok_or_else(|| ParameterError::MissingRequiredValue {
                parameter: ParameterName::MaxTokens.to_string(),
            })?;

        let request = ClaudeRequest {
            anthropic_version: ANTHROPIC_VERSION.to_string(),
            max_tokens,
            messages: vec![ClaudeMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            system: None,
            temperature: parameters.temperature_f32(),
            top_p: parameters.top_p_f32(),
            top_k: parameters.top_k,
            stop_sequences: parameters.stop_sequences.clone(),
        };
        encode_body(&request)
    }

    fn parse_text_response(&self, body: &[u8]) -> Result<TextCompletion, BedrockError> {
        let response: ClaudeResponse = decode_body(body, "Claude response")?;

        let texts: Vec<String> = response
            .content
            .into_iter()
            .filter_map(|block| match block {
                ClaudeContentBlock::Text { text } => Some(text),
                ClaudeContentBlock::Other => None,
            })
            .collect();
        if texts.is_empty() {
            return Err(CodecError::missing("content[].text", "Claude response").into());
        }

        debug!(
            id = ?response.id,
            stop_reason = ?response.stop_reason,
            "Parsed Claude completion"
        );

        Ok(TextCompletion {
            text: texts.concat(),
            stop_reason: response.stop_reason.as_deref().map(StopReason::from_claude),
            usage: response.usage.map(UsageInfo::from),
        })
    }
}

impl ConverseModality for AnthropicText {
    fn converse_parameters(&self) -> ConverseParameters {
        ConverseParameters::from(&self.parameters)
    }

    fn converse_features(&self) -> &[ConverseFeature] {
        &self.features
    }
}
