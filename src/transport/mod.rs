//! Outbound transport interface.
//!
//! The crate never opens connections itself. Callers supply an implementation
//! that signs and sends the bodies built here, for example over the AWS SDK.

use crate::error::TransportError;
use async_trait::async_trait;
use bytes::Bytes;

/// An `InvokeModel` call.
#[derive(Debug, Clone, PartialEq)]
pub struct InvokeRequest {
    pub model_id: String,
    pub body: Bytes,
    pub content_type: String,
    pub accept: String,
    pub region: String,
}

/// A `Converse` call. The body is the JSON form of the converse input.
#[derive(Debug, Clone, PartialEq)]
pub struct ConverseInput {
    pub model_id: String,
    pub body: Bytes,
    pub region: String,
}

/// Sends built requests and returns raw response bodies.
///
/// Retries, signing and cancellation belong to the implementation.
#[async_trait]
pub trait BedrockTransport: Send + Sync {
    async fn invoke(&self, request: InvokeRequest) -> Result<Bytes, TransportError>;

    async fn converse(&self, input: ConverseInput) -> Result<Bytes, TransportError>;

    /// `ListFoundationModels` against the control-plane endpoint.
    async fn list_foundation_models(&self, region: &str) -> Result<Bytes, TransportError>;
}
