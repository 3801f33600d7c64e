//! Canonical modality layer for AWS Bedrock.
//!
//! One API for text completion, image generation and variation, and
//! multi-turn converse chat with tools across the Amazon Titan, Amazon Nova,
//! Anthropic Claude and Meta LLaMA model families.
//!
//! # Features
//!
//! - **Model registry**: static id → capability table, no fallback
//! - **Parameter validation**: per-model ranges checked before any call
//! - **Content blocks**: text, image, video, document, tool use and tool result
//!   with lossless Converse wire conversion
//! - **Pluggable transport**: the caller supplies signing and networking
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bedrock_modality::{BedrockClient, BedrockClientBuilder, TextCompletionRequest};
//! # use bedrock_modality::transport::BedrockTransport;
//! # use std::sync::Arc;
//!
//! # async fn example(transport: Arc<dyn BedrockTransport>) -> Result<(), bedrock_modality::BedrockError> {
//! let client = BedrockClientBuilder::new()
//!     .from_env()?
//!     .transport(transport)
//!     .build()?;
//!
//! let completion = client
//!     .complete_text(
//!         TextCompletionRequest::new("amazon.titan-text-express-v1", "Explain ownership in Rust")
//!             .with_max_tokens(200),
//!     )
//!     .await?;
//! println!("{}", completion.text);
//! # Ok(())
//! # }
//! ```
//!
//! # Conversations
//!
//! ```rust,no_run
//! use bedrock_modality::{BedrockClient, ConverseRequest};
//!
//! # async fn example(client: &impl BedrockClient) -> Result<(), bedrock_modality::BedrockError> {
//! let request = ConverseRequest::new("anthropic.claude-3-haiku-20240307-v1:0")
//!     .with_prompt("Hi, my name is Ada.")
//!     .with_system_prompt("Answer in one sentence.");
//! let reply = client.converse(request.clone()).await?;
//!
//! let next = request.follow_up(&reply).with_prompt("What is my name?");
//! let reply = client.converse(next).await?;
//! assert_eq!(reply.history.len(), 4);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]

pub mod client;
pub mod config;
pub mod document;
pub mod error;
pub mod logging;
pub mod mocks;
pub mod registry;
pub mod services;
pub mod transport;
pub mod types;

// Client
pub use client::{BedrockClient, BedrockClientBuilder, BedrockClientImpl};

// Configuration
pub use config::{BedrockConfig, BedrockConfigBuilder, BEDROCK_REGIONS};

// Errors
pub use error::{
    BedrockError, CodecError, ConfigurationError, ErrorKind, ModelError, ParameterError,
    RequestError, ResponseError, TransportError,
};

// Registry
pub use registry::{registry, Capability, ModelDescriptor, ModelRegistry};

// Services
pub use services::{
    AnthropicText, ConverseFeature, ConverseModality, ImageVariationModality, LlamaText,
    Modality, ModelLifecycleStatus, ModelSummary, NovaText, TextModality, TextToImageModality,
    TitanImage, TitanText,
};

// Transport
pub use transport::{BedrockTransport, ConverseInput, InvokeRequest};

pub use document::DynamicDocument;

// Types
pub use types::{
    // Content
    Content,
    ContentKind,
    DocumentBlock,
    DocumentFormat,
    History,
    ImageBlock,
    ImageFormat,
    MediaSource,
    Message,
    Role,
    S3Location,
    Tool,
    ToolResultBlock,
    ToolResultContent,
    ToolResultStatus,
    ToolUseBlock,
    VideoBlock,
    VideoFormat,
    // Parameters
    ImageQuality,
    ImageResolution,
    InferenceOverrides,
    Parameter,
    ParameterName,
    TextGenerationParameters,
    // Requests and results
    ConverseReply,
    ConverseRequest,
    ImageGenerationOutput,
    ImageGenerationRequest,
    ImageVariationRequest,
    ModelFamily,
    StopReason,
    TextCompletion,
    TextCompletionRequest,
    UsageInfo,
};

/// Result type alias for Bedrock operations.
pub type Result<T> = std::result::Result<T, BedrockError>;
