//! Amazon Titan model family.
//!
//! Text models take a bare `inputText` prompt and have no top-k knob. Image
//! models (also used for Nova Canvas) share one body for text-to-image and
//! variation tasks.

use super::{
    decode_body, encode_body, ConverseFeature, ConverseModality, ImageVariationModality,
    Modality, TextModality, TextToImageModality,
};
use crate::error::{BedrockError, CodecError, ResponseError};
use crate::types::{
    ConverseParameters, ImageGenerationOutput, ImageGenerationParameters,
    ImageResolutionValidator, Parameter, ParameterName, ResolvedImageParameters,
    ResolvedParameters, StopReason, StopSequenceParameters, TextCompletion,
    TextGenerationParameters, TitanImageGenerationConfig, TitanImageRequest,
    TitanImageResponse, TitanImageTask, TitanImageVariationParams, TitanTextConfig,
    TitanTextRequest, TitanTextResponse, TitanTextToImageParams, UsageInfo,
};
use tracing::debug;

/// Most images one call may return.
pub const MAX_IMAGES: usize = 5;

/// Titan text knob constraints with the model's output ceiling.
pub fn text_parameters(max_tokens: u32) -> TextGenerationParameters {
    TextGenerationParameters {
        temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, 0.7),
        max_tokens: Parameter::new(ParameterName::MaxTokens, 0, max_tokens, 512),
        top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.9),
        top_k: Parameter::not_supported(ParameterName::TopK),
        stop_sequences: StopSequenceParameters::new(Some(4), Vec::new()),
        max_prompt_size: None,
    }
}

/// Titan image knob constraints.
pub fn image_parameters() -> ImageGenerationParameters {
    ImageGenerationParameters {
        number_of_images: Parameter::new(ParameterName::NumberOfImages, 1, MAX_IMAGES as u32, 3),
        cfg_scale: Parameter::new(ParameterName::CfgScale, 1.1, 10.0, 8.0),
        seed: Parameter::new(ParameterName::Seed, 0, 2_147_483_646, 0),
        similarity: Parameter::new(ParameterName::Similarity, 0.2, 1.0, 0.7),
        reference_images: Parameter::without_default(ParameterName::ReferenceImages, 1, 5),
        resolution: ImageResolutionValidator {
            minimum: 320,
            maximum: 4096,
            step: 16,
        },
        max_prompt_size: 512,
        max_negative_prompt_size: 512,
    }
}

/// Titan text generation adapter.
#[derive(Debug, Clone)]
pub struct TitanText {
    name: &'static str,
    parameters: TextGenerationParameters,
    features: Vec<ConverseFeature>,
}

impl TitanText {
    pub fn new(name: &'static str, parameters: TextGenerationParameters) -> Self {
        Self {
            name,
            parameters,
            features: vec![ConverseFeature::TextGeneration, ConverseFeature::Document],
        }
    }
}

impl Modality for TitanText {
    fn name(&self) -> &str {
        self.name
    }
}

impl TextModality for TitanText {
    fn text_parameters(&self) -> &TextGenerationParameters {
        &self.parameters
    }

    fn build_text_request(
        &self,
        prompt: &str,
        parameters: &ResolvedParameters,
    ) -> Result<Vec<u8>, BedrockError> {
        let request = TitanTextRequest {
            input_text: prompt.to_string(),
            text_generation_config: TitanTextConfig {
                max_token_count: parameters.max_tokens,
                temperature: parameters.temperature_f32(),
                top_p: parameters.top_p_f32(),
                stop_sequences: parameters.stop_sequences.clone(),
            },
        };
        encode_body(&request)
    }

    fn parse_text_response(&self, body: &[u8]) -> Result<TextCompletion, BedrockError> {
        let response: TitanTextResponse = decode_body(body, "Titan response")?;
        let result = response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| CodecError::missing("results[0]", "Titan response"))?;

        debug!(
            tokens = result.token_count,
            reason = ?result.completion_reason,
            "Parsed Titan completion"
        );

        Ok(TextCompletion {
            stop_reason: result.completion_reason.as_deref().map(StopReason::from_titan),
            usage: response
                .input_text_token_count
                .map(|input| UsageInfo::new(input, result.token_count)),
            text: result.output_text,
        })
    }
}

impl ConverseModality for TitanText {
    fn converse_parameters(&self) -> ConverseParameters {
        ConverseParameters::from(&self.parameters)
    }

    fn converse_features(&self) -> &[ConverseFeature] {
        &self.features
    }
}

/// Titan image generation adapter.
#[derive(Debug, Clone)]
pub struct TitanImage {
    name: &'static str,
    parameters: ImageGenerationParameters,
}

impl TitanImage {
    pub fn new(name: &'static str, parameters: ImageGenerationParameters) -> Self {
        Self { name, parameters }
    }

    fn generation_config(parameters: &ResolvedImageParameters) -> TitanImageGenerationConfig {
        TitanImageGenerationConfig {
            number_of_images: parameters.number_of_images,
            cfg_scale: parameters.cfg_scale as f32,
            seed: parameters.seed,
            quality: parameters.quality,
            width: parameters.resolution.map(|r| r.width),
            height: parameters.resolution.map(|r| r.height),
        }
    }

    fn parse_images(body: &[u8]) -> Result<ImageGenerationOutput, BedrockError> {
        let response: TitanImageResponse = decode_body(body, "image response")?;
        if let Some(error) = response.error.filter(|e| !e.is_empty()) {
            return Err(ResponseError::invalid(format!("image generation failed: {}", error)).into());
        }
        if response.images.is_empty() {
            return Err(CodecError::missing("images", "image response").into());
        }
        if response.images.len() > MAX_IMAGES {
            return Err(ResponseError::invalid(format!(
                "expected at most {} images, got {}",
                MAX_IMAGES,
                response.images.len()
            ))
            .into());
        }
        Ok(ImageGenerationOutput {
            images: response.images,
        })
    }
}

impl Modality for TitanImage {
    fn name(&self) -> &str {
        self.name
    }
}

impl TextToImageModality for TitanImage {
    fn image_parameters(&self) -> &ImageGenerationParameters {
        &self.parameters
    }

    fn build_text_to_image_request(
        &self,
        prompt: &str,
        parameters: &ResolvedImageParameters,
    ) -> Result<Vec<u8>, BedrockError> {
        let request = TitanImageRequest {
            task_type: TitanImageTask::TextImage,
            text_to_image_params: Some(TitanTextToImageParams {
                text: prompt.to_string(),
                negative_text: parameters.negative_prompt.clone(),
            }),
            image_variation_params: None,
            image_generation_config: Self::generation_config(parameters),
        };
        encode_body(&request)
    }

    fn parse_image_response(&self, body: &[u8]) -> Result<ImageGenerationOutput, BedrockError> {
        Self::parse_images(body)
    }
}

impl ImageVariationModality for TitanImage {
    fn variation_parameters(&self) -> &ImageGenerationParameters {
        &self.parameters
    }

    fn build_image_variation_request(
        &self,
        prompt: &str,
        images: &[String],
        similarity: f64,
        parameters: &ResolvedImageParameters,
    ) -> Result<Vec<u8>, BedrockError> {
        let request = TitanImageRequest {
            task_type: TitanImageTask::ImageVariation,
            text_to_image_params: None,
            image_variation_params: Some(TitanImageVariationParams {
                text: prompt.to_string(),
                negative_text: parameters.negative_prompt.clone(),
                images: images.to_vec(),
                similarity_strength: similarity as f32,
            }),
            image_generation_config: Self::generation_config(parameters),
        };
        encode_body(&request)
    }

    fn parse_variation_response(
        &self,
        body: &[u8],
    ) -> Result<ImageGenerationOutput, BedrockError> {
        Self::parse_images(body)
    }
}
