//! Request types: canonical call descriptors and provider request bodies.

use super::content::{DocumentBlock, ImageBlock, ToolResultBlock, VideoBlock};
use super::message::History;
use super::parameters::{ImageOverrides, ImageQuality, ImageResolution, InferenceOverrides};
use super::responses::ConverseReply;
use super::tool::Tool;
use serde::{Deserialize, Serialize};

/// Text completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct TextCompletionRequest {
    /// The model ID to invoke.
    pub model_id: String,
    /// The prompt text.
    pub prompt: String,
    /// Optional knob overrides.
    pub parameters: InferenceOverrides,
}

impl TextCompletionRequest {
    /// Create a new request with required fields.
    pub fn new(model_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            parameters: InferenceOverrides::default(),
        }
    }

    /// Set maximum tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.parameters.max_tokens = Some(max_tokens);
        self
    }

    /// Set temperature.
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.parameters.temperature = Some(temperature);
        self
    }

    /// Set top-p.
    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.parameters.top_p = Some(top_p);
        self
    }

    /// Set top-k.
    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.parameters.top_k = Some(top_k);
        self
    }

    /// Set stop sequences.
    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.parameters.stop_sequences = Some(stop_sequences);
        self
    }
}

/// Text-to-image call.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageGenerationRequest {
    pub model_id: String,
    pub prompt: String,
    pub options: ImageOverrides,
}

impl ImageGenerationRequest {
    pub fn new(model_id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            options: ImageOverrides::default(),
        }
    }

    pub fn with_number_of_images(mut self, count: u32) -> Self {
        self.options.number_of_images = Some(count);
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.options.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_cfg_scale(mut self, cfg_scale: f64) -> Self {
        self.options.cfg_scale = Some(cfg_scale);
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.options.seed = Some(seed);
        self
    }

    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.options.quality = Some(quality);
        self
    }

    pub fn with_resolution(mut self, resolution: ImageResolution) -> Self {
        self.options.resolution = Some(resolution);
        self
    }
}

/// Image variation call: new images derived from reference images.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageVariationRequest {
    pub model_id: String,
    pub prompt: String,
    /// Reference images as base64 text.
    pub images: Vec<String>,
    /// How close the output stays to the references.
    pub similarity: Option<f64>,
    pub options: ImageOverrides,
}

impl ImageVariationRequest {
    pub fn new(
        model_id: impl Into<String>,
        prompt: impl Into<String>,
        images: Vec<String>,
    ) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: prompt.into(),
            images,
            similarity: None,
            options: ImageOverrides::default(),
        }
    }

    pub fn with_similarity(mut self, similarity: f64) -> Self {
        self.similarity = Some(similarity);
        self
    }

    pub fn with_number_of_images(mut self, count: u32) -> Self {
        self.options.number_of_images = Some(count);
        self
    }

    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.options.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_cfg_scale(mut self, cfg_scale: f64) -> Self {
        self.options.cfg_scale = Some(cfg_scale);
        self
    }

    pub fn with_seed(mut self, seed: u32) -> Self {
        self.options.seed = Some(seed);
        self
    }

    pub fn with_quality(mut self, quality: ImageQuality) -> Self {
        self.options.quality = Some(quality);
        self
    }

    pub fn with_resolution(mut self, resolution: ImageResolution) -> Self {
        self.options.resolution = Some(resolution);
        self
    }
}

/// One converse turn.
///
/// The new user message is assembled from the tool result, the prompt and
/// the attached media, in that order. Use [`ConverseRequest::follow_up`] to
/// continue a conversation from a reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverseRequest {
    pub model_id: String,
    pub prompt: Option<String>,
    pub image: Option<ImageBlock>,
    pub document: Option<DocumentBlock>,
    pub video: Option<VideoBlock>,
    pub tool_result: Option<ToolResultBlock>,
    pub history: History,
    pub tools: Vec<Tool>,
    pub system_prompts: Vec<String>,
    pub parameters: InferenceOverrides,
}

impl ConverseRequest {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            prompt: None,
            image: None,
            document: None,
            video: None,
            tool_result: None,
            history: History::new(),
            tools: Vec::new(),
            system_prompts: Vec::new(),
            parameters: InferenceOverrides::default(),
        }
    }

    /// Continues the conversation of `reply`.
    ///
    /// Model, tools, system prompts and knobs carry over; the new turn's
    /// prompt, media and tool result start empty.
    pub fn follow_up(&self, reply: &ConverseReply) -> Self {
        Self {
            model_id: self.model_id.clone(),
            prompt: None,
            image: None,
            document: None,
            video: None,
            tool_result: None,
            history: reply.history.clone(),
            tools: self.tools.clone(),
            system_prompts: self.system_prompts.clone(),
            parameters: self.parameters.clone(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_image(mut self, image: ImageBlock) -> Self {
        self.image = Some(image);
        self
    }

    pub fn with_document(mut self, document: DocumentBlock) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_video(mut self, video: VideoBlock) -> Self {
        self.video = Some(video);
        self
    }

    pub fn with_tool_result(mut self, tool_result: ToolResultBlock) -> Self {
        self.tool_result = Some(tool_result);
        self
    }

    pub fn with_history(mut self, history: History) -> Self {
        self.history = history;
        self
    }

    pub fn with_tools(mut self, tools: Vec<Tool>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompts.push(system_prompt.into());
        self
    }

    pub fn with_system_prompts(mut self, system_prompts: Vec<String>) -> Self {
        self.system_prompts = system_prompts;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.parameters.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.parameters.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f64) -> Self {
        self.parameters.top_p = Some(top_p);
        self
    }

    pub fn with_top_k(mut self, top_k: u32) -> Self {
        self.parameters.top_k = Some(top_k);
        self
    }

    pub fn with_stop_sequences(mut self, stop_sequences: Vec<String>) -> Self {
        self.parameters.stop_sequences = Some(stop_sequences);
        self
    }
}

// ============================================================================
// Titan-specific request types
// ============================================================================

/// Titan text generation request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextRequest {
    /// The input text prompt.
    pub input_text: String,
    /// Text generation configuration.
    pub text_generation_config: TitanTextConfig,
}

/// Titan text generation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextConfig {
    /// Maximum token count for generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_token_count: Option<u32>,
    /// Temperature for sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top-p for nucleus sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub stop_sequences: Vec<String>,
}

/// Titan image task selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TitanImageTask {
    TextImage,
    ImageVariation,
}

/// Titan image request body, shared by text-to-image and variation tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanImageRequest {
    pub task_type: TitanImageTask,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_to_image_params: Option<TitanTextToImageParams>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_variation_params: Option<TitanImageVariationParams>,
    pub image_generation_config: TitanImageGenerationConfig,
}

/// Prompt of a text-to-image task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanTextToImageParams {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_text: Option<String>,
}

/// Inputs of an image variation task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanImageVariationParams {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub negative_text: Option<String>,
    /// Base64 reference images.
    pub images: Vec<String>,
    pub similarity_strength: f32,
}

/// Output settings of an image task.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitanImageGenerationConfig {
    pub number_of_images: u32,
    pub cfg_scale: f32,
    pub seed: u32,
    pub quality: ImageQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

// ============================================================================
// Nova-specific request types
// ============================================================================

/// Nova invoke request body (messages schema).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NovaRequest {
    /// Schema version tag.
    pub schema_version: String,
    /// Conversation messages.
    pub messages: Vec<NovaMessage>,
    /// Inference configuration.
    pub inference_config: NovaInferenceConfig,
}

/// Nova message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovaMessage {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Text content blocks.
    pub content: Vec<NovaTextContent>,
}

/// Nova text content block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovaTextContent {
    pub text: String,
}

/// Nova inference configuration. Field names mix cases on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovaInferenceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(
        rename = "stopSequences",
        skip_serializing_if = "Vec::is_empty",
        default
    )]
    pub stop_sequences: Vec<String>,
}

// ============================================================================
// Claude-specific request types
// ============================================================================

/// Claude messages API request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeRequest {
    /// API version tag.
    pub anthropic_version: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Conversation messages.
    pub messages: Vec<ClaudeMessage>,
    /// Optional system prompt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Temperature for sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top-p for nucleus sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    /// Top-k for sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    /// Stop sequences.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub stop_sequences: Vec<String>,
}

/// Claude message format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClaudeMessage {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Message content.
    pub content: String,
}

// ============================================================================
// LLaMA-specific request types
// ============================================================================

/// LLaMA request body. The schema has no top-k field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlamaRequest {
    /// The formatted prompt string.
    pub prompt: String,
    /// Maximum generation length in tokens.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gen_len: Option<u32>,
    /// Temperature for sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Top-p for nucleus sampling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}
