//! Amazon Nova model family.
//!
//! Invoke bodies use the `messages-v1` schema. Lite and Pro are the only
//! models in the registry that accept video in conversations.

use super::{
    decode_body, encode_body, ConverseFeature, ConverseModality, Modality, TextModality,
};
use crate::error::{BedrockError, CodecError};
use crate::types::{
    ConverseParameters, NovaInferenceConfig, NovaMessage, NovaRequest, NovaResponse,
    NovaTextContent, Parameter, ParameterName, ResolvedParameters, StopReason,
    StopSequenceParameters, TextCompletion, TextGenerationParameters, UsageInfo,
};
use tracing::debug;

const SCHEMA_VERSION: &str = "messages-v1";

/// Nova knob constraints.
pub fn text_parameters() -> TextGenerationParameters {
    TextGenerationParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.00001, 1.0, 0.7),
        max_tokens: Parameter::new(ParameterName::MaxTokens, 1, 5000, 5000),
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.9),
        top_k: Parameter::new(ParameterName::TopK, 0, 128, 50),
        stop_sequences: StopSequenceParameters::new(None, Vec::new()),
        max_prompt_size: None,
    }
}

/// Nova text generation adapter.
#[derive(Debug, Clone)]
pub struct NovaText {
    name: &'static str,
    parameters: TextGenerationParameters,
    features: Vec<ConverseFeature>,
}

impl NovaText {
    /// Nova Micro: text only, with tools and documents.
    pub fn micro(name: &'static str, parameters: TextGenerationParameters) -> Self {
        Self {
            name,
            parameters,
            features: vec![
                ConverseFeature::TextGeneration,
                ConverseFeature::SystemPrompts,
                ConverseFeature::Document,
                ConverseFeature::ToolUse,
            ],
        }
    }

    /// Nova Lite and Pro: multimodal.
    pub fn multimodal(name: &'static str, parameters: TextGenerationParameters) -> Self {
        let mut model = Self::micro(name, parameters);
        model
            .features
            .extend([ConverseFeature::Vision, ConverseFeature::Video]);
        model
    }
}

impl Modality for NovaText {
    fn name(&self) -> &str {
        self.name
    }
}

impl TextModality for NovaText {
    fn text_parameters(&self) -> &TextGenerationParameters {
        &self.parameters
    }

    fn build_text_request(
        &self,
        prompt: &str,
        parameters: &ResolvedParameters,
    ) -> Result<Vec<u8>, BedrockError> {
        let request = NovaRequest {
            schema_version: SCHEMA_VERSION.to_string(),
            messages: vec![NovaMessage {
                role: "user".to_string(),
                content: vec![NovaTextContent {
                    text: prompt.to_string(),
                }],
            }],
            inference_config: NovaInferenceConfig {
                max_new_tokens: parameters.max_tokens,
                temperature: parameters.temperature_f32(),
                top_p: parameters.top_p_f32(),
                top_k: parameters.top_k,
                stop_sequences: parameters.stop_sequences.clone(),
            },
        };
        encode_body(&request)
    }

    fn parse_text_response(&self, body: &[u8]) -> Result<TextCompletion, BedrockError> {
        let response: NovaResponse = decode_body(body, "Nova response")?;

        let text: String = response
            .output
            .message
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect();
        if text.is_empty() {
            return Err(CodecError::missing("output.message.content[].text", "Nova response").into());
        }

        debug!(stop_reason = ?response.stop_reason, "Parsed Nova completion");

        Ok(TextCompletion {
            text,
            stop_reason: response.stop_reason.as_deref().map(StopReason::from_converse),
            usage: response.usage.map(UsageInfo::from),
        })
    }
}

impl ConverseModality for NovaText {
    fn converse_parameters(&self) -> ConverseParameters {
        ConverseParameters::from(&self.parameters)
    }

    fn converse_features(&self) -> &[ConverseFeature] {
        &self.features
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::InferenceOverrides;
    use pretty_assertions::assert_eq;
    use serde_json::Value;

    #[test]
    fn test_build_text_request() {
        let model = NovaText::micro("Nova Micro", text_parameters());
        let resolved = model
            .text_parameters()
            .resolve(
                "Hello",
                &InferenceOverrides {
                    max_tokens: Some(200),
                    top_k: Some(20),
                    stop_sequences: Some(vec!["END".into()]),
                    ..Default::default()
                },
            )
            .unwrap();
        let body: Value =
            serde_json::from_slice(&model.build_text_request("Hello", &resolved).unwrap()).unwrap();

        assert_eq!(body["schemaVersion"], "messages-v1");
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][0]["content"][0]["text"], "Hello");
        let config = &body["inferenceConfig"];
        assert_eq!(config["max_new_tokens"], 200);
        assert_eq!(config["top_k"], 20);
        assert_eq!(config["stopSequences"][0], "END");
    }

    #[test]
    fn test_rejects_zero_temperature() {
        let err = text_parameters()
            .resolve(
                "Hello",
                &InferenceOverrides {
                    temperature: Some(0.0),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_feature_sets() {
        let micro = NovaText::micro("Nova Micro", text_parameters());
        let lite = NovaText::multimodal("Nova Lite", text_parameters());
        assert!(!micro.supports(ConverseFeature::Video));
        assert!(micro.supports(ConverseFeature::ToolUse));
        assert!(lite.supports(ConverseFeature::Video));
        assert!(lite.supports(ConverseFeature::Vision));
    }

    #[test]
    fn test_parse_text_response() {
        let body = br#"{
            "output": {"message": {"role": "assistant", "content": [{"text": "Hello"}]}},
            "stopReason": "end_turn",
            "usage": {"inputTokens": 5, "outputTokens": 1}
        }"#;
        let model = NovaText::micro("Nova Micro", text_parameters());
        let completion = model.parse_text_response(body).unwrap();
        assert_eq!(completion.text, "Hello");
        assert_eq!(completion.stop_reason, Some(StopReason::EndTurn));
        assert_eq!(completion.usage, Some(UsageInfo::new(5, 1)));

        let err = model
            .parse_text_response(br#"{"output": {"message": {"role": "assistant", "content": []}}}"#)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodingError);
    }
}
