//! Parameter constraints and their resolution.
//!
//! Every model carries a [`TextGenerationParameters`] (and, for image models,
//! an [`ImageGenerationParameters`]) describing which knobs it accepts and in
//! which ranges. Resolution always runs in the same order:
//!
//! 1. explicit values for unsupported knobs are rejected,
//! 2. `effective = explicit ?? default`, failing if neither exists,
//! 3. the effective value is range-checked,
//! 4. stop sequences are checked against the family policy,
//! 5. the prompt is checked for emptiness and length.

use crate::error::{BedrockError, ParameterError, RequestError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical knob names used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterName {
    Temperature,
    MaxTokens,
    TopP,
    TopK,
    StopSequences,
    NumberOfImages,
    CfgScale,
    Seed,
    Similarity,
    ReferenceImages,
}

impl ParameterName {
    /// Wire-style name of the knob.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterName::Temperature => "temperature",
            ParameterName::MaxTokens => "maxTokens",
            ParameterName::TopP => "topP",
            ParameterName::TopK => "topK",
            ParameterName::StopSequences => "stopSequences",
            ParameterName::NumberOfImages => "numberOfImages",
            ParameterName::CfgScale => "cfgScale",
            ParameterName::Seed => "seed",
            ParameterName::Similarity => "similarity",
            ParameterName::ReferenceImages => "referenceImages",
        }
    }
}

impl fmt::Display for ParameterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded numeric knob.
///
/// A supported parameter keeps `minimum <= default <= maximum`. A
/// not-supported parameter carries no bounds and rejects any explicit value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Parameter<T> {
    name: ParameterName,
    minimum: Option<T>,
    maximum: Option<T>,
    default_value: Option<T>,
    supported: bool,
}

impl<T> Parameter<T>
where
    T: Copy + PartialOrd + Into<f64>,
{
    /// A supported parameter with a default value.
    pub fn new(name: ParameterName, minimum: T, maximum: T, default_value: T) -> Self {
        debug_assert!(minimum <= default_value && default_value <= maximum);
        Self {
            name,
            minimum: Some(minimum),
            maximum: Some(maximum),
            default_value: Some(default_value),
            supported: true,
        }
    }

    /// A supported parameter the caller must always set explicitly.
    pub fn without_default(name: ParameterName, minimum: T, maximum: T) -> Self {
        Self {
            name,
            minimum: Some(minimum),
            maximum: Some(maximum),
            default_value: None,
            supported: true,
        }
    }

    /// A parameter this model family does not accept.
    pub fn not_supported(name: ParameterName) -> Self {
        Self {
            name,
            minimum: None,
            maximum: None,
            default_value: None,
            supported: false,
        }
    }

    pub fn name(&self) -> ParameterName {
        self.name
    }

    pub fn minimum(&self) -> Option<T> {
        self.minimum
    }

    pub fn maximum(&self) -> Option<T> {
        self.maximum
    }

    pub fn default_value(&self) -> Option<T> {
        self.default_value
    }

    pub fn is_supported(&self) -> bool {
        self.supported
    }

    /// Rejects an explicit value for an unsupported knob.
    pub fn check_supported(&self, explicit: Option<T>) -> Result<(), ParameterError> {
        if !self.supported && explicit.is_some() {
            return Err(ParameterError::NotSupported {
                parameter: self.name.to_string(),
                message: format!("{} is not supported by this model", self.name),
            });
        }
        Ok(())
    }

    /// Resolves `explicit ?? default` and range-checks the result.
    ///
    /// Returns `Ok(None)` for an unsupported knob that was not set; the knob
    /// is then omitted from the payload.
    pub fn resolve(&self, explicit: Option<T>) -> Result<Option<T>, ParameterError> {
        self.check_supported(explicit)?;
        if !self.supported {
            return Ok(None);
        }
        let value = explicit
            .or(self.default_value)
            .ok_or_else(|| ParameterError::MissingRequiredValue {
                parameter: self.name.to_string(),
            })?;
        self.validate_value(value)?;
        Ok(Some(value))
    }

    /// Range-checks an explicit value without falling back to the default.
    pub fn validate_optional(&self, explicit: Option<T>) -> Result<Option<T>, ParameterError> {
        self.check_supported(explicit)?;
        match explicit {
            Some(value) => {
                self.validate_value(value)?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Checks `minimum <= value <= maximum`.
    pub fn validate_value(&self, value: T) -> Result<(), ParameterError> {
        let (Some(minimum), Some(maximum)) = (self.minimum, self.maximum) else {
            return self.check_supported(Some(value));
        };
        // Written so that NaN fails the check.
        if !(minimum <= value && value <= maximum) {
            return Err(ParameterError::InvalidParameter {
                parameter: self.name.to_string(),
                value: value.into(),
                minimum: minimum.into(),
                maximum: maximum.into(),
            });
        }
        Ok(())
    }
}

/// Stop-sequence policy of a model family.
#[derive(Debug, Clone, PartialEq)]
pub struct StopSequenceParameters {
    /// Maximum number of sequences, if bounded.
    pub max_count: Option<usize>,
    /// Sequences sent when the caller gives none.
    pub default_sequences: Vec<String>,
    pub supported: bool,
}

impl StopSequenceParameters {
    pub fn new(max_count: Option<usize>, default_sequences: Vec<String>) -> Self {
        Self {
            max_count,
            default_sequences,
            supported: true,
        }
    }

    pub fn not_supported() -> Self {
        Self {
            max_count: None,
            default_sequences: Vec::new(),
            supported: false,
        }
    }

    fn check_supported(&self, explicit: Option<&[String]>) -> Result<(), ParameterError> {
        if !self.supported && explicit.map_or(false, |s| !s.is_empty()) {
            return Err(ParameterError::NotSupported {
                parameter: ParameterName::StopSequences.to_string(),
                message: "stop sequences are not supported by this model".to_string(),
            });
        }
        Ok(())
    }

    /// Resolves the effective sequence list.
    pub fn resolve(&self, explicit: Option<&[String]>) -> Result<Vec<String>, ParameterError> {
        self.check_supported(explicit)?;
        if !self.supported {
            return Ok(Vec::new());
        }
        let sequences = explicit
            .map(<[String]>::to_vec)
            .unwrap_or_else(|| self.default_sequences.clone());
        self.check_count(&sequences)?;
        Ok(sequences)
    }

    /// Validates an explicit list without applying defaults.
    pub fn validate_optional(&self, explicit: Option<&[String]>) -> Result<Vec<String>, ParameterError> {
        self.check_supported(explicit)?;
        let sequences = explicit.map(<[String]>::to_vec).unwrap_or_default();
        self.check_count(&sequences)?;
        Ok(sequences)
    }

    fn check_count(&self, sequences: &[String]) -> Result<(), ParameterError> {
        match self.max_count {
            Some(maximum) if sequences.len() > maximum => {
                Err(ParameterError::TooManyStopSequences {
                    count: sequences.len(),
                    maximum,
                })
            }
            _ => Ok(()),
        }
    }
}

/// Caller-supplied inference overrides shared by text and converse calls.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

/// Concrete parameter set handed to an adapter.
///
/// `None` means the knob is omitted from the payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedParameters {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub top_k: Option<u32>,
    pub stop_sequences: Vec<String>,
}

impl ResolvedParameters {
    /// Temperature narrowed for the wire.
    pub fn temperature_f32(&self) -> Option<f32> {
        self.temperature.map(|t| t as f32)
    }

    /// Top-p narrowed for the wire.
    pub fn top_p_f32(&self) -> Option<f32> {
        self.top_p.map(|p| p as f32)
    }
}

/// Text-generation knobs of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct TextGenerationParameters {
    pub temperature: Parameter<f64>,
    pub max_tokens: Parameter<u32>,
    pub top_p: Parameter<f64>,
    pub top_k: Parameter<u32>,
    pub stop_sequences: StopSequenceParameters,
    /// Longest accepted prompt, in characters.
    pub max_prompt_size: Option<usize>,
}

impl TextGenerationParameters {
    /// Resolves overrides for a text completion.
    pub fn resolve(
        &self,
        prompt: &str,
        overrides: &InferenceOverrides,
    ) -> Result<ResolvedParameters, BedrockError> {
        self.check_supported(overrides)?;
        let resolved = ResolvedParameters {
            temperature: self.temperature.resolve(overrides.temperature)?,
            max_tokens: self.max_tokens.resolve(overrides.max_tokens)?,
            top_p: self.top_p.resolve(overrides.top_p)?,
            top_k: self.top_k.resolve(overrides.top_k)?,
            stop_sequences: self
                .stop_sequences
                .resolve(overrides.stop_sequences.as_deref())?,
        };
        self.validate_prompt(prompt)?;
        Ok(resolved)
    }

    /// Checks a prompt for emptiness and the model's size limit.
    pub fn validate_prompt(&self, prompt: &str) -> Result<(), RequestError> {
        validate_prompt_text(prompt, self.max_prompt_size)
    }

    fn check_supported(&self, overrides: &InferenceOverrides) -> Result<(), ParameterError> {
        self.temperature.check_supported(overrides.temperature)?;
        self.max_tokens.check_supported(overrides.max_tokens)?;
        self.top_p.check_supported(overrides.top_p)?;
        self.top_k.check_supported(overrides.top_k)?;
        self.stop_sequences
            .check_supported(overrides.stop_sequences.as_deref())
    }
}

/// Converse-path view of a model's knobs.
///
/// The Converse wire format treats every inference knob as optional, so
/// resolution never falls back to defaults and never reports a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverseParameters {
    pub temperature: Parameter<f64>,
    pub max_tokens: Parameter<u32>,
    pub top_p: Parameter<f64>,
    pub stop_sequences: StopSequenceParameters,
    pub max_prompt_size: Option<usize>,
}

impl From<&TextGenerationParameters> for ConverseParameters {
    fn from(params: &TextGenerationParameters) -> Self {
        Self {
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            top_p: params.top_p,
            stop_sequences: params.stop_sequences.clone(),
            max_prompt_size: params.max_prompt_size,
        }
    }
}

impl ConverseParameters {
    /// Validates converse overrides and an optional new prompt.
    ///
    /// `topK` is not part of the Converse inference config and is rejected.
    pub fn resolve(
        &self,
        prompt: Option<&str>,
        overrides: &InferenceOverrides,
    ) -> Result<ResolvedParameters, BedrockError> {
        if overrides.top_k.is_some() {
            return Err(ParameterError::NotSupported {
                parameter: ParameterName::TopK.to_string(),
                message: "topK is not part of the converse inference configuration".to_string(),
            }
            .into());
        }
        self.temperature.check_supported(overrides.temperature)?;
        self.max_tokens.check_supported(overrides.max_tokens)?;
        self.top_p.check_supported(overrides.top_p)?;

        let resolved = ResolvedParameters {
            temperature: self.temperature.validate_optional(overrides.temperature)?,
            max_tokens: self.max_tokens.validate_optional(overrides.max_tokens)?,
            top_p: self.top_p.validate_optional(overrides.top_p)?,
            top_k: None,
            stop_sequences: self
                .stop_sequences
                .validate_optional(overrides.stop_sequences.as_deref())?,
        };
        if let Some(prompt) = prompt {
            validate_prompt_text(prompt, self.max_prompt_size)?;
        }
        Ok(resolved)
    }
}

fn validate_prompt_text(prompt: &str, max_prompt_size: Option<usize>) -> Result<(), RequestError> {
    if prompt.trim().is_empty() {
        return Err(RequestError::invalid_prompt("prompt is empty"));
    }
    if let Some(maximum) = max_prompt_size {
        let length = prompt.chars().count();
        if length > maximum {
            return Err(RequestError::PromptTooLong { length, maximum });
        }
    }
    Ok(())
}

/// Output quality for image generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageQuality {
    #[default]
    Standard,
    Premium,
}

/// Output image size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageResolution {
    pub width: u32,
    pub height: u32,
}

impl ImageResolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Accepted image dimensions: each side in range and on a fixed step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageResolutionValidator {
    pub minimum: u32,
    pub maximum: u32,
    pub step: u32,
}

impl ImageResolutionValidator {
    pub fn validate(&self, resolution: ImageResolution) -> Result<(), ParameterError> {
        let ImageResolution { width, height } = resolution;
        for side in [width, height] {
            if side < self.minimum || side > self.maximum {
                return Err(ParameterError::InvalidResolution {
                    width,
                    height,
                    message: format!(
                        "each side must be between {} and {} pixels",
                        self.minimum, self.maximum
                    ),
                });
            }
            if self.step > 0 && side % self.step != 0 {
                return Err(ParameterError::InvalidResolution {
                    width,
                    height,
                    message: format!("each side must be divisible by {}", self.step),
                });
            }
        }
        Ok(())
    }
}

/// Caller-supplied image knobs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageOverrides {
    pub number_of_images: Option<u32>,
    pub cfg_scale: Option<f64>,
    pub seed: Option<u32>,
    pub quality: Option<ImageQuality>,
    pub resolution: Option<ImageResolution>,
    pub negative_prompt: Option<String>,
}

/// Concrete image generation settings handed to an adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedImageParameters {
    pub number_of_images: u32,
    pub cfg_scale: f64,
    pub seed: u32,
    pub quality: ImageQuality,
    pub resolution: Option<ImageResolution>,
    pub negative_prompt: Option<String>,
}

/// Image-generation knobs of one model.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerationParameters {
    pub number_of_images: Parameter<u32>,
    pub cfg_scale: Parameter<f64>,
    pub seed: Parameter<u32>,
    pub similarity: Parameter<f64>,
    pub reference_images: Parameter<u32>,
    pub resolution: ImageResolutionValidator,
    pub max_prompt_size: usize,
    pub max_negative_prompt_size: usize,
}

impl ImageGenerationParameters {
    /// Resolves the knobs shared by text-to-image and variation calls.
    pub fn resolve(
        &self,
        prompt: &str,
        overrides: &ImageOverrides,
    ) -> Result<ResolvedImageParameters, BedrockError> {
        self.number_of_images
            .check_supported(overrides.number_of_images)?;
        self.cfg_scale.check_supported(overrides.cfg_scale)?;
        self.seed.check_supported(overrides.seed)?;

        let number_of_images = self.required(&self.number_of_images, overrides.number_of_images)?;
        let cfg_scale = self.required(&self.cfg_scale, overrides.cfg_scale)?;
        let seed = self.required(&self.seed, overrides.seed)?;
        if let Some(resolution) = overrides.resolution {
            self.resolution.validate(resolution)?;
        }

        validate_prompt_text(prompt, Some(self.max_prompt_size))?;
        // Only the length limit applies; an empty negative prompt is dropped.
        let negative_prompt = match overrides.negative_prompt.as_deref() {
            Some("") | None => None,
            Some(text) => {
                let length = text.chars().count();
                if length > self.max_negative_prompt_size {
                    return Err(RequestError::PromptTooLong {
                        length,
                        maximum: self.max_negative_prompt_size,
                    }
                    .into());
                }
                Some(text.to_string())
            }
        };

        Ok(ResolvedImageParameters {
            number_of_images,
            cfg_scale,
            seed,
            quality: overrides.quality.unwrap_or_default(),
            resolution: overrides.resolution,
            negative_prompt,
        })
    }

    /// Resolves the similarity strength and reference-image count of a variation.
    pub fn resolve_variation(
        &self,
        similarity: Option<f64>,
        reference_images: usize,
    ) -> Result<f64, ParameterError> {
        let count = u32::try_from(reference_images).unwrap_or(u32::MAX);
        self.reference_images.validate_value(count)?;
        self.required(&self.similarity, similarity)
    }

    fn required<T>(&self, parameter: &Parameter<T>, explicit: Option<T>) -> Result<T, ParameterError>
    where
        T: Copy + PartialOrd + Into<f64>,
    {
        parameter
            .resolve(explicit)?
            .ok_or_else(|| ParameterError::MissingRequiredValue {
                parameter: parameter.name().to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn family_a() -> TextGenerationParameters {
        TextGenerationParameters {
            temperature: Parameter::new(ParameterName::Temperature, 0.0, 1.0, 0.5),
            max_tokens: Parameter::new(ParameterName::MaxTokens, 0, 2048, 512),
            top_p: Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.9),
            top_k: Parameter::not_supported(ParameterName::TopK),
            stop_sequences: StopSequenceParameters::not_supported(),
            max_prompt_size: Some(20),
        }
    }

    fn image_params() -> ImageGenerationParameters {
        ImageGenerationParameters {
            number_of_images: Parameter::new(ParameterName::NumberOfImages, 1, 5, 1),
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

    #[test]
    fn test_defaults_applied() {
        let resolved = family_a()
            .resolve("hello", &InferenceOverrides::default())
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedParameters {
                max_tokens: Some(512),
                temperature: Some(0.5),
                top_p: Some(0.9),
                top_k: None,
                stop_sequences: vec![],
            }
        );
    }

    #[test]
    fn test_temperature_out_of_range() {
        let overrides = InferenceOverrides {
            temperature: Some(1.5),
            ..Default::default()
        };
        let err = family_a().resolve("hello", &overrides).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
        match err {
            BedrockError::Parameter(ParameterError::InvalidParameter {
                parameter,
                value,
                minimum,
                maximum,
            }) => {
                assert_eq!(parameter, "temperature");
                assert_eq!(value, 1.5);
                assert_eq!(minimum, 0.0);
                assert_eq!(maximum, 1.0);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_top_k() {
        let overrides = InferenceOverrides {
            top_k: Some(10),
            ..Default::default()
        };
        let err = family_a().resolve("hello", &overrides).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
        match err {
            BedrockError::Parameter(e) => assert_eq!(e.parameter(), "topK"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_checked_before_range() {
        // Out-of-range temperature and an unsupported knob: NotSupported wins.
        let overrides = InferenceOverrides {
            temperature: Some(9.0),
            stop_sequences: Some(vec!["END".into()]),
            ..Default::default()
        };
        let err = family_a().resolve("hello", &overrides).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
    }

    #[test]
    fn test_empty_stop_sequences_allowed_when_unsupported() {
        let overrides = InferenceOverrides {
            stop_sequences: Some(vec![]),
            ..Default::default()
        };
        assert!(family_a().resolve("hello", &overrides).is_ok());
    }

    #[test]
    fn test_missing_required_value() {
        let params = TextGenerationParameters {
            max_tokens: Parameter::without_default(ParameterName::MaxTokens, 1, 4096),
            ..family_a()
        };
        let err = params
            .resolve("hello", &InferenceOverrides::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredValue);
    }

    #[test]
    fn test_too_many_stop_sequences() {
        let params = TextGenerationParameters {
            stop_sequences: StopSequenceParameters::new(Some(1), vec![]),
            ..family_a()
        };
        let overrides = InferenceOverrides {
            stop_sequences: Some(vec!["a".into(), "b".into()]),
            ..Default::default()
        };
        let err = params.resolve("hello", &overrides).unwrap_err();
        assert!(matches!(
            err,
            BedrockError::Parameter(ParameterError::TooManyStopSequences {
                count: 2,
                maximum: 1
            })
        ));
    }

    #[test_case("" ; "empty")]
    #[test_case("   \n" ; "whitespace")]
    #[test_case("this prompt is longer than twenty characters" ; "too long")]
    fn test_invalid_prompt(prompt: &str) {
        let err = family_a()
            .resolve(prompt, &InferenceOverrides::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPrompt);
    }

    #[test]
    fn test_converse_resolution_is_optional() {
        let params = ConverseParameters::from(&TextGenerationParameters {
            max_tokens: Parameter::without_default(ParameterName::MaxTokens, 1, 4096),
            ..family_a()
        });
        let resolved = params.resolve(None, &InferenceOverrides::default()).unwrap();
        assert_eq!(resolved, ResolvedParameters::default());

        let overrides = InferenceOverrides {
            max_tokens: Some(5000),
            ..Default::default()
        };
        let err = params.resolve(Some("hi"), &overrides).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test]
    fn test_converse_rejects_top_k() {
        let params = ConverseParameters::from(&family_a());
        let overrides = InferenceOverrides {
            top_k: Some(3),
            ..Default::default()
        };
        let err = params.resolve(Some("hi"), &overrides).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
    }

    #[test]
    fn test_image_defaults() {
        let resolved = image_params()
            .resolve("a cat", &ImageOverrides::default())
            .unwrap();
        assert_eq!(resolved.number_of_images, 1);
        assert_eq!(resolved.cfg_scale, 8.0);
        assert_eq!(resolved.seed, 0);
        assert_eq!(resolved.quality, ImageQuality::Standard);
    }

    #[test_case(6 ; "above maximum")]
    #[test_case(0 ; "below minimum")]
    fn test_image_count_out_of_range(count: u32) {
        let overrides = ImageOverrides {
            number_of_images: Some(count),
            ..Default::default()
        };
        let err = image_params().resolve("a cat", &overrides).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    }

    #[test_case(1024, 1024, true ; "square")]
    #[test_case(320, 4096, true ; "extremes")]
    #[test_case(1000, 1024, false ; "not on grid")]
    #[test_case(256, 256, false ; "too small")]
    fn test_image_resolution(width: u32, height: u32, ok: bool) {
        let overrides = ImageOverrides {
            resolution: Some(ImageResolution::new(width, height)),
            ..Default::default()
        };
        assert_eq!(image_params().resolve("a cat", &overrides).is_ok(), ok);
    }

    #[test]
    fn test_negative_prompt_length_only() {
        let empty = ImageOverrides {
            negative_prompt: Some(String::new()),
            ..Default::default()
        };
        let resolved = image_params().resolve("a cat", &empty).unwrap();
        assert_eq!(resolved.negative_prompt, None);

        let at_limit = ImageOverrides {
            negative_prompt: Some("x".repeat(512)),
            ..Default::default()
        };
        assert!(image_params().resolve("a cat", &at_limit).is_ok());

        let too_long = ImageOverrides {
            negative_prompt: Some("x".repeat(513)),
            ..Default::default()
        };
        let err = image_params().resolve("a cat", &too_long).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidPrompt);
    }

    #[test]
    fn test_variation_reference_images() {
        let params = image_params();
        assert_eq!(params.resolve_variation(None, 1).unwrap(), 0.7);
        assert!(params.resolve_variation(Some(0.1), 1).is_err());
        assert!(params.resolve_variation(None, 0).is_err());
        assert!(params.resolve_variation(None, 6).is_err());
    }

    proptest! {
        #[test]
        fn prop_unsupported_rejects_any_explicit(value in any::<u32>()) {
            let p = Parameter::<u32>::not_supported(ParameterName::TopK);
            prop_assert!(p.resolve(Some(value)).is_err());
            prop_assert_eq!(p.resolve(None).unwrap(), None);
        }

        #[test]
        fn prop_bounds_are_inclusive(value in -2.0f64..3.0) {
            let p = Parameter::new(ParameterName::Temperature, 0.0, 1.0, 0.5);
            let ok = (0.0..=1.0).contains(&value);
            prop_assert_eq!(p.resolve(Some(value)).is_ok(), ok);
        }

        #[test]
        fn prop_resolution_is_idempotent(explicit in proptest::option::of(0u32..3000)) {
            let p = Parameter::new(ParameterName::MaxTokens, 0, 2048, 512);
            let first = p.resolve(explicit).ok();
            let second = p.resolve(explicit).ok();
            prop_assert_eq!(first, second);
        }
    }

    #[test]
    fn test_boundaries() {
        let p = Parameter::new(ParameterName::TopP, 0.0, 1.0, 0.9);
        assert!(p.resolve(Some(0.0)).is_ok());
        assert!(p.resolve(Some(1.0)).is_ok());
        assert!(p.resolve(Some(0.0 - f64::EPSILON)).is_err());
        assert!(p.resolve(Some(1.0 + f64::EPSILON)).is_err());
        assert!(p.resolve(Some(f64::NAN)).is_err());
    }
}
