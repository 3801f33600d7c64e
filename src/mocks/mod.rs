//! Mock implementations for testing.
//!
//! A recording [`MockTransport`] plus builders for canned provider bodies, so
//! the client can be exercised without AWS.

use crate::error::TransportError;
use crate::transport::{BedrockTransport, ConverseInput, InvokeRequest};
use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::VecDeque;

/// A call seen by the mock transport.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Invoke(InvokeRequest),
    Converse(ConverseInput),
    ListFoundationModels { region: String },
}

impl RecordedCall {
    /// Request body parsed as JSON; `None` for listings.
    pub fn body_json(&self) -> Option<Value> {
        let body = match self {
            RecordedCall::Invoke(request) => &request.body,
            RecordedCall::Converse(input) => &input.body,
            RecordedCall::ListFoundationModels { .. } => return None,
        };
        serde_json::from_slice(body).ok()
    }

    pub fn model_id(&self) -> Option<&str> {
        match self {
            RecordedCall::Invoke(request) => Some(&request.model_id),
            RecordedCall::Converse(input) => Some(&input.model_id),
            RecordedCall::ListFoundationModels { .. } => None,
        }
    }
}

/// Transport that replays queued outcomes and records every call.
///
/// Outcomes are consumed in order whatever the call kind.
pub struct MockTransport {
    responses: Mutex<VecDeque<Result<Bytes, TransportError>>>,
    requests: Mutex<Vec<RecordedCall>>,
    default_response: Option<Bytes>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            default_response: None,
        }
    }

    /// Create a mock transport with queued bodies.
    pub fn with_responses<B: Into<Bytes>>(responses: impl IntoIterator<Item = B>) -> Self {
        let transport = Self::new();
        for body in responses {
            transport.queue_response(body);
        }
        transport
    }

    /// Body returned once the queue is empty.
    pub fn with_default(body: impl Into<Bytes>) -> Self {
        Self {
            default_response: Some(body.into()),
            ..Self::new()
        }
    }

    pub fn queue_response(&self, body: impl Into<Bytes>) {
        self.responses.lock().push_back(Ok(body.into()));
    }

    pub fn queue_error(&self, error: TransportError) {
        self.responses.lock().push_back(Err(error));
    }

    pub fn requests(&self) -> Vec<RecordedCall> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<RecordedCall> {
        self.requests.lock().last().cloned()
    }

    /// Body of the last call, parsed as JSON.
    pub fn last_body_json(&self) -> Option<Value> {
        self.last_request().and_then(|call| call.body_json())
    }

    pub fn clear_requests(&self) {
        self.requests.lock().clear();
    }

    fn respond(&self, call: RecordedCall) -> Result<Bytes, TransportError> {
        self.requests.lock().push(call);

        let next = self.responses.lock().pop_front();
        match next {
            Some(outcome) => outcome,
            None => self
                .default_response
                .clone()
                .ok_or_else(|| TransportError::ConnectionFailed {
                    message: "No mock response available".to_string(),
                }),
        }
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BedrockTransport for MockTransport {
    async fn invoke(&self, request: InvokeRequest) -> Result<Bytes, TransportError> {
        self.respond(RecordedCall::Invoke(request))
    }

    async fn converse(&self, input: ConverseInput) -> Result<Bytes, TransportError> {
        self.respond(RecordedCall::Converse(input))
    }

    async fn list_foundation_models(&self, region: &str) -> Result<Bytes, TransportError> {
        self.respond(RecordedCall::ListFoundationModels {
            region: region.to_string(),
        })
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("queued_responses", &self.responses.lock().len())
            .field("recorded_requests", &self.requests.lock().len())
            .finish()
    }
}

/// Mock Titan text response builder.
pub struct MockTitanResponse {
    output_text: String,
    input_token_count: u32,
    token_count: u32,
    completion_reason: String,
}

impl MockTitanResponse {
    pub fn new(output_text: impl Into<String>) -> Self {
        Self {
            output_text: output_text.into(),
            input_token_count: 5,
            token_count: 10,
            completion_reason: "FINISH".to_string(),
        }
    }

    pub fn with_token_count(mut self, count: u32) -> Self {
        self.token_count = count;
        self
    }

    pub fn with_completion_reason(mut self, reason: impl Into<String>) -> Self {
        self.completion_reason = reason.into();
        self
    }

    pub fn to_json(&self) -> String {
        json!({
            "inputTextTokenCount": self.input_token_count,
            "results": [{
                "outputText": self.output_text,
                "tokenCount": self.token_count,
                "completionReason": self.completion_reason
            }]
        })
        .to_string()
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_json())
    }
}

/// Mock Claude response builder.
pub struct MockClaudeResponse {
    id: String,
    content: String,
    stop_reason: String,
    input_tokens: u32,
    output_tokens: u32,
}

impl MockClaudeResponse {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: format!("msg_{}", uuid::Uuid::new_v4()),
            content: content.into(),
            stop_reason: "end_turn".to_string(),
            input_tokens: 10,
            output_tokens: 5,
        }
    }

    pub fn with_stop_reason(mut self, reason: impl Into<String>) -> Self {
        self.stop_reason = reason.into();
        self
    }

    pub fn with_usage(mut self, input: u32, output: u32) -> Self {
        self.input_tokens = input;
        self.output_tokens = output;
        self
    }

    pub fn to_json(&self) -> String {
        json!({
            "id": self.id,
            "type": "message",
            "role": "assistant",
            "content": [{
                "type": "text",
                "text": self.content
            }],
            "stop_reason": self.stop_reason,
            "usage": {
                "input_tokens": self.input_tokens,
                "output_tokens": self.output_tokens
            }
        })
        .to_string()
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_json())
    }
}

/// Mock LLaMA response builder.
pub struct MockLlamaResponse {
    generation: String,
    prompt_token_count: u32,
    generation_token_count: u32,
    stop_reason: String,
}

impl MockLlamaResponse {
    pub fn new(generation: impl Into<String>) -> Self {
        Self {
            generation: generation.into(),
            prompt_token_count: 10,
            generation_token_count: 5,
            stop_reason: "stop".to_string(),
        }
    }

    pub fn with_token_counts(mut self, prompt: u32, generation: u32) -> Self {
        self.prompt_token_count = prompt;
        self.generation_token_count = generation;
        self
    }

    pub fn to_json(&self) -> String {
        json!({
            "generation": self.generation,
            "prompt_token_count": self.prompt_token_count,
            "generation_token_count": self.generation_token_count,
            "stop_reason": self.stop_reason
        })
        .to_string()
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_json())
    }
}

/// Mock Nova invoke response builder.
pub struct MockNovaResponse {
    text: String,
    stop_reason: String,
    input_tokens: u32,
    output_tokens: u32,
}

impl MockNovaResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            stop_reason: "end_turn".to_string(),
            input_tokens: 8,
            output_tokens: 4,
        }
    }

    pub fn with_stop_reason(mut self, reason: impl Into<String>) -> Self {
        self.stop_reason = reason.into();
        self
    }

    pub fn to_json(&self) -> String {
        json!({
            "output": {
                "message": {
                    "role": "assistant",
                    "content": [{"text": self.text}]
                }
            },
            "stopReason": self.stop_reason,
            "usage": {
                "inputTokens": self.input_tokens,
                "outputTokens": self.output_tokens,
                "totalTokens": self.input_tokens + self.output_tokens
            }
        })
        .to_string()
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_json())
    }
}

/// Mock Converse response builder.
pub struct MockConverseResponse {
    content: Vec<Value>,
    stop_reason: String,
    input_tokens: u32,
    output_tokens: u32,
}

impl MockConverseResponse {
    /// Reply with a single text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![json!({"text": text.into()})],
            stop_reason: "end_turn".to_string(),
            input_tokens: 12,
            output_tokens: 6,
        }
    }

    /// Reply with a tool request, generating its id.
    pub fn tool_use(name: impl Into<String>, input: Value) -> Self {
        Self {
            content: Vec::new(),
            stop_reason: "tool_use".to_string(),
            input_tokens: 12,
            output_tokens: 6,
        }
        .with_tool_use(format!("tooluse_{}", uuid::Uuid::new_v4().simple()), name, input)
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.content.push(json!({"text": text.into()}));
        self
    }

    pub fn with_tool_use(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        input: Value,
    ) -> Self {
        self.content.push(json!({
            "toolUse": {
                "toolUseId": id.into(),
                "name": name.into(),
                "input": input
            }
        }));
        self.stop_reason = "tool_use".to_string();
        self
    }

    /// Append a raw content block, e.g. a variant the decoder rejects.
    pub fn with_raw_block(mut self, block: Value) -> Self {
        self.content.push(block);
        self
    }

    pub fn with_stop_reason(mut self, reason: impl Into<String>) -> Self {
        self.stop_reason = reason.into();
        self
    }

    pub fn with_usage(mut self, input: u32, output: u32) -> Self {
        self.input_tokens = input;
        self.output_tokens = output;
        self
    }

    pub fn to_json(&self) -> String {
        json!({
            "output": {
                "message": {
                    "role": "assistant",
                    "content": self.content
                }
            },
            "stopReason": self.stop_reason,
            "usage": {
                "inputTokens": self.input_tokens,
                "outputTokens": self.output_tokens,
                "totalTokens": self.input_tokens + self.output_tokens
            },
            "metrics": {"latencyMs": 120}
        })
        .to_string()
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_json())
    }
}

/// Mock image generation response builder.
pub struct MockImageResponse {
    images: Vec<String>,
    error: Option<String>,
}

impl MockImageResponse {
    /// `count` copies of a tiny base64 payload.
    pub fn new(count: usize) -> Self {
        Self {
            images: vec!["iVBORw0KGgo=".to_string(); count],
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn to_json(&self) -> String {
        let mut body = json!({ "images": self.images });
        if let Some(error) = &self.error {
            body["error"] = json!(error);
        }
        body.to_string()
    }

    pub fn to_bytes(&self) -> Bytes {
        Bytes::from(self.to_json())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn invoke(model_id: &str) -> InvokeRequest {
        InvokeRequest {
            model_id: model_id.to_string(),
            body: Bytes::from_static(b"{\"inputText\":\"hi\"}"),
            content_type: "application/json".to_string(),
            accept: "application/json".to_string(),
            region: "us-east-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_transport_replays_in_order() {
        let transport = MockTransport::with_responses(vec!["first", "second"]);

        assert_eq!(transport.invoke(invoke("a")).await.unwrap(), Bytes::from("first"));
        assert_eq!(transport.invoke(invoke("b")).await.unwrap(), Bytes::from("second"));
        assert!(transport.invoke(invoke("c")).await.is_err());

        assert_eq!(transport.request_count(), 3);
        assert_eq!(transport.last_request().unwrap().model_id(), Some("c"));
        assert_eq!(transport.last_body_json().unwrap()["inputText"], "hi");
    }

    #[tokio::test]
    async fn test_mock_transport_errors_and_default() {
        let transport = MockTransport::with_default("fallback");
        transport.queue_error(TransportError::Cancelled);

        let err = transport.list_foundation_models("us-east-1").await.unwrap_err();
        assert!(matches!(err, TransportError::Cancelled));
        assert_eq!(
            transport.invoke(invoke("a")).await.unwrap(),
            Bytes::from("fallback")
        );
        assert_eq!(
            transport.requests()[0],
            RecordedCall::ListFoundationModels {
                region: "us-east-1".to_string()
            }
        );
    }

    #[test]
    fn test_mock_bodies_are_valid_json() {
        for body in [
            MockTitanResponse::new("Hello").to_json(),
            MockClaudeResponse::new("Hi").with_usage(20, 10).to_json(),
            MockLlamaResponse::new("Text").with_token_counts(50, 25).to_json(),
            MockNovaResponse::new("Hey").to_json(),
            MockConverseResponse::text("Hi").to_json(),
            MockImageResponse::new(2).to_json(),
        ] {
            serde_json::from_str::<Value>(&body).unwrap();
        }
    }

    #[test]
    fn test_mock_converse_tool_use() {
        let body: Value = serde_json::from_str(
            &MockConverseResponse::tool_use("get_weather", json!({"city": "Paris"})).to_json(),
        )
        .unwrap();
        assert_eq!(body["stopReason"], "tool_use");
        let tool_use = &body["output"]["message"]["content"][0]["toolUse"];
        assert_eq!(tool_use["name"], "get_weather");
        assert!(tool_use["toolUseId"].as_str().unwrap().starts_with("tooluse_"));
    }
}
