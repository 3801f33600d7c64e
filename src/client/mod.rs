//! Bedrock client implementation.
//!
//! Orchestrates every call as lookup, validation, payload build, transport
//! and parse. Each step fails fast; nothing is retried here.

use crate::config::BedrockConfig;
use crate::error::{BedrockError, ConfigurationError, RequestError, ResponseError};
use crate::logging::{log_request_payload, log_response_payload};
use crate::registry::{registry, Capability, ModelDescriptor, ModelRegistry};
use crate::services::{parse_model_summaries, ModelSummary};
use crate::transport::{BedrockTransport, ConverseInput, InvokeRequest};
use crate::types::{
    validate_base64, Content, ContentKind, ConverseReply, ConverseRequest, ImageGenerationOutput,
    ImageGenerationRequest, ImageVariationRequest, Message, Role, TextCompletion,
    TextCompletionRequest,
};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Bedrock client trait defining the public API.
#[async_trait]
pub trait BedrockClient: Send + Sync {
    /// Single-prompt text completion over `InvokeModel`.
    async fn complete_text(
        &self,
        request: TextCompletionRequest,
    ) -> Result<TextCompletion, BedrockError>;

    /// Text-to-image generation.
    async fn generate_image(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationOutput, BedrockError>;

    /// Image variation from reference images.
    async fn generate_image_variation(
        &self,
        request: ImageVariationRequest,
    ) -> Result<ImageGenerationOutput, BedrockError>;

    /// One conversation turn. The reply carries the extended history.
    async fn converse(&self, request: ConverseRequest) -> Result<ConverseReply, BedrockError>;

    /// Foundation models offered in the configured region.
    async fn list_models(&self) -> Result<Vec<ModelSummary>, BedrockError>;
}

/// Bedrock client implementation.
pub struct BedrockClientImpl {
    config: BedrockConfig,
    transport: Arc<dyn BedrockTransport>,
    registry: &'static ModelRegistry,
}

impl BedrockClientImpl {
    pub fn new(config: BedrockConfig, transport: Arc<dyn BedrockTransport>) -> Self {
        Self {
            config,
            transport,
            registry: registry(),
        }
    }

    pub fn config(&self) -> &BedrockConfig {
        &self.config
    }

    pub fn registry(&self) -> &'static ModelRegistry {
        self.registry
    }

    fn model(&self, model_id: &str, capability: Capability) -> Result<&'static ModelDescriptor, BedrockError> {
        let model = self.registry.lookup(model_id)?;
        model.require(capability)?;
        Ok(model)
    }

    async fn invoke(&self, model_id: &str, operation: &str, body: Vec<u8>) -> Result<Bytes, BedrockError> {
        log_request_payload(model_id, operation, &body);
        let response = self
            .transport
            .invoke(InvokeRequest {
                model_id: model_id.to_string(),
                body: Bytes::from(body),
                content_type: self.config.content_type.clone(),
                accept: self.config.accept.clone(),
                region: self.config.region.clone(),
            })
            .await?;
        non_empty(model_id, operation, response)
    }
}

fn non_empty(model_id: &str, operation: &str, body: Bytes) -> Result<Bytes, BedrockError> {
    if body.is_empty() {
        return Err(ResponseError::invalid(format!("{} returned an empty body", operation)).into());
    }
    log_response_payload(model_id, operation, &body);
    Ok(body)
}

/// Assembles the new user message of a converse turn.
///
/// A tool result comes first, then the prompt, then attached media.
fn build_turn_message(request: &ConverseRequest) -> Result<Message, BedrockError> {
    let mut content = Vec::new();
    if let Some(result) = &request.tool_result {
        content.push(Content::ToolResult(result.clone()));
    }
    if let Some(prompt) = &request.prompt {
        content.push(Content::Text(prompt.clone()));
    }
    if let Some(image) = &request.image {
        content.push(Content::Image(image.clone()));
    }
    if let Some(document) = &request.document {
        content.push(Content::Document(document.clone()));
    }
    if let Some(video) = &request.video {
        content.push(Content::Video(video.clone()));
    }
    if content.is_empty() {
        return Err(RequestError::invalid_prompt("Prompt is not defined.").into());
    }
    Ok(Message::new(Role::User, content)?)
}

/// Tool pairing rules, checked before history is touched.
fn check_tools(model: &ModelDescriptor, request: &ConverseRequest) -> Result<(), BedrockError> {
    if !request.tools.is_empty() || request.tool_result.is_some() {
        model.require(Capability::ToolUse)?;
    }
    if request.tool_result.is_some() {
        if request.tools.is_empty() {
            return Err(
                RequestError::invalid_prompt("Tool result is defined but tools are not.").into(),
            );
        }
        if !request.history.awaits_tool_result() {
            return Err(RequestError::invalid_prompt(
                "Tool result is defined but the last message is not a tool use request.",
            )
            .into());
        }
    }
    Ok(())
}

/// Media in the new turn, tool results included, needs the matching capability.
fn check_media(model: &ModelDescriptor, turn: &Message) -> Result<(), BedrockError> {
    for kind in turn.media_kinds() {
        let capability = match kind {
            ContentKind::Image => Capability::Vision,
            ContentKind::Document => Capability::Document,
            ContentKind::Video => Capability::Video,
            _ => continue,
        };
        model.require(capability)?;
    }
    Ok(())
}

#[async_trait]
impl BedrockClient for BedrockClientImpl {
    #[instrument(skip(self, request), fields(model_id = %request.model_id))]
    async fn complete_text(
        &self,
        request: TextCompletionRequest,
    ) -> Result<TextCompletion, BedrockError> {
        let model = self.model(&request.model_id, Capability::TextGeneration)?;
        let text = model.text_modality()?;
        let resolved = text
            .text_parameters()
            .resolve(&request.prompt, &request.parameters)?;
        let body = text.build_text_request(&request.prompt, &resolved)?;

        debug!(
            family = %model.family(),
            body_size = body.len(),
            "Invoking text completion"
        );

        let response = self.invoke(&request.model_id, "complete_text", body).await?;
        text.parse_text_response(&response)
    }

    #[instrument(skip(self, request), fields(model_id = %request.model_id))]
    async fn generate_image(
        &self,
        request: ImageGenerationRequest,
    ) -> Result<ImageGenerationOutput, BedrockError> {
        let model = self.model(&request.model_id, Capability::TextToImage)?;
        let image = model.text_to_image_modality()?;
        let resolved = image
            .image_parameters()
            .resolve(&request.prompt, &request.options)?;
        let body = image.build_text_to_image_request(&request.prompt, &resolved)?;

        debug!(images = resolved.number_of_images, "Invoking image generation");

        let response = self.invoke(&request.model_id, "generate_image", body).await?;
        image.parse_image_response(&response)
    }

    #[instrument(skip(self, request), fields(model_id = %request.model_id))]
    async fn generate_image_variation(
        &self,
        request: ImageVariationRequest,
    ) -> Result<ImageGenerationOutput, BedrockError> {
        let model = self.model(&request.model_id, Capability::ImageVariation)?;
        let variation = model.image_variation_modality()?;
        let parameters = variation.variation_parameters();
        let resolved = parameters.resolve(&request.prompt, &request.options)?;
        let similarity = parameters.resolve_variation(request.similarity, request.images.len())?;
        for image in &request.images {
            validate_base64(image)?;
        }
        let body = variation.build_image_variation_request(
            &request.prompt,
            &request.images,
            similarity,
            &resolved,
        )?;

        debug!(
            references = request.images.len(),
            similarity,
            "Invoking image variation"
        );

        let response = self
            .invoke(&request.model_id, "generate_image_variation", body)
            .await?;
        variation.parse_variation_response(&response)
    }

    #[instrument(skip(self, request), fields(model_id = %request.model_id, turns = request.history.len()))]
    async fn converse(&self, request: ConverseRequest) -> Result<ConverseReply, BedrockError> {
        let model = self.model(&request.model_id, Capability::Converse)?;
        let converse = model.converse_modality()?;
        let resolved = converse
            .converse_parameters()
            .resolve(request.prompt.as_deref(), &request.parameters)?;
        check_tools(model, &request)?;
        let turn = build_turn_message(&request)?;
        check_media(model, &turn)?;

        let mut messages = request.history.messages().to_vec();
        messages.push(turn.clone());
        let body = converse.build_converse_request(
            &messages,
            &request.system_prompts,
            &request.tools,
            &resolved,
        )?;

        debug!(
            messages = messages.len(),
            tools = request.tools.len(),
            "Invoking converse"
        );

        log_request_payload(&request.model_id, "converse", &body);
        let response = self
            .transport
            .converse(ConverseInput {
                model_id: request.model_id.clone(),
                body: Bytes::from(body),
                region: self.config.region.clone(),
            })
            .await?;
        let response = non_empty(&request.model_id, "converse", response)?;
        let (message, stop_reason, usage) = converse.parse_converse_response(&response)?;

        let mut history = request.history;
        history.push(turn);
        history.push(message.clone());

        debug!(stop_reason = ?stop_reason, turns = history.len(), "Converse turn complete");

        Ok(ConverseReply {
            message,
            stop_reason,
            usage,
            history,
        })
    }

    #[instrument(skip(self), fields(region = %self.config.region))]
    async fn list_models(&self) -> Result<Vec<ModelSummary>, BedrockError> {
        debug!("Listing foundation models");
        let response = self
            .transport
            .list_foundation_models(&self.config.region)
            .await?;
        let response = non_empty("-", "list_models", response)?;
        parse_model_summaries(&response, self.registry)
    }
}

/// Client builder.
#[derive(Default)]
pub struct BedrockClientBuilder {
    config: Option<BedrockConfig>,
    transport: Option<Arc<dyn BedrockTransport>>,
}

impl BedrockClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: BedrockConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn transport(mut self, transport: Arc<dyn BedrockTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Read the configuration from the environment unless one was set.
    pub fn from_env(mut self) -> Result<Self, BedrockError> {
        if self.config.is_none() {
            self.config = Some(BedrockConfig::from_env()?);
        }
        Ok(self)
    }

    /// Build the client. Without a config the defaults apply.
    pub fn build(self) -> Result<BedrockClientImpl, BedrockError> {
        let transport = self
            .transport
            .ok_or(ConfigurationError::MissingTransport)?;
        Ok(BedrockClientImpl::new(
            self.config.unwrap_or_default(),
            transport,
        ))
    }
}

impl std::fmt::Debug for BedrockClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BedrockClientImpl")
            .field("config", &self.config)
            .field("models", &self.registry.len())
            .finish_non_exhaustive()
    }
}
