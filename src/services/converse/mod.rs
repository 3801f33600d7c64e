//! Converse API wire format.
//!
//! Content blocks are single-member JSON objects keyed by their kind
//! (`text`, `image`, `video`, `document`, `toolUse`, `toolResult`). Decoding
//! fails closed: an unknown block kind, media source or format is reported as
//! not implemented rather than dropped.

use super::{encode_body, decode_body, ConverseFeature, ConverseModality};
use crate::document::DynamicDocument;
use crate::error::{BedrockError, CodecError, ParameterError, RequestError};
use crate::types::{
    validate_base64, validate_document_name, validate_tool_name, Content, ContentKind,
    DocumentBlock, DocumentFormat, ImageBlock, ImageFormat, MediaSource, Message,
    ResolvedParameters, Role, S3Location, StopReason, Tool, ToolResultBlock, ToolResultContent,
    ToolResultStatus, ToolUseBlock, UsageInfo, VideoBlock, VideoFormat,
};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::trace;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ConverseRequestBody {
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    system: Vec<SystemContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inference_config: Option<InferenceConfig>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_config: Option<ToolConfig>,
}

#[derive(Debug, Serialize)]
struct SystemContent {
    text: String,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
struct InferenceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop_sequences: Vec<String>,
}

impl InferenceConfig {
    fn from_resolved(parameters: &ResolvedParameters) -> Option<Self> {
        let config = Self {
            max_tokens: parameters.max_tokens,
            temperature: parameters.temperature_f32(),
            top_p: parameters.top_p_f32(),
            stop_sequences: parameters.stop_sequences.clone(),
        };
        let empty = config.max_tokens.is_none()
            && config.temperature.is_none()
            && config.top_p.is_none()
            && config.stop_sequences.is_empty();
        (!empty).then_some(config)
    }
}

// Tool choice is never sent, so the service default (auto) applies.
#[derive(Debug, Serialize)]
struct ToolConfig {
    tools: Vec<Value>,
}

/// Builds a Converse request body.
pub(crate) fn build_request_body<M>(
    modality: &M,
    messages: &[Message],
    system_prompts: &[String],
    tools: &[Tool],
    parameters: &ResolvedParameters,
) -> Result<Vec<u8>, BedrockError>
where
    M: ConverseModality + ?Sized,
{
    if !system_prompts.is_empty() && !modality.supports(ConverseFeature::SystemPrompts) {
        return Err(ParameterError::NotSupported {
            parameter: "systemPrompts".to_string(),
            message: format!("{} does not accept system prompts", modality.name()),
        }
        .into());
    }
    if !tools.is_empty() && !modality.supports(ConverseFeature::ToolUse) {
        return Err(BedrockError::not_implemented(format!(
            "tool declarations for {}",
            modality.name()
        )));
    }

    let body = ConverseRequestBody {
        messages: messages
            .iter()
            .map(|m| modality.to_provider_message(m))
            .collect::<Result<_, _>>()?,
        system: system_prompts
            .iter()
            .map(|text| SystemContent { text: text.clone() })
            .collect(),
        inference_config: InferenceConfig::from_resolved(parameters),
        tool_config: if tools.is_empty() {
            None
        } else {
            Some(ToolConfig {
                tools: tools
                    .iter()
                    .map(Tool::to_tool_spec)
                    .collect::<Result<_, _>>()?,
            })
        },
    };

    trace!(
        messages = body.messages.len(),
        tools = tools.len(),
        "Built converse request body"
    );
    encode_body(&body)
}

/// Parses a Converse response body into the reply, stop reason and usage.
pub(crate) fn parse_response_body<M>(
    modality: &M,
    body: &[u8],
) -> Result<(Message, Option<StopReason>, Option<UsageInfo>), BedrockError>
where
    M: ConverseModality + ?Sized,
{
    let value: Value = decode_body(body, "converse response")?;
    let output = value
        .get("output")
        .and_then(|output| output.get("message"))
        .ok_or_else(|| CodecError::missing("output.message", "converse response"))?;
    let message = modality.from_provider_message(output)?;

    let stop_reason = value
        .get("stopReason")
        .and_then(Value::as_str)
        .map(StopReason::from_converse);
    let usage = value.get("usage").and_then(|usage| {
        let input = usage.get("inputTokens")?.as_u64()?;
        let output = usage.get("outputTokens")?.as_u64()?;
        Some(UsageInfo::new(
            u32::try_from(input).unwrap_or(u32::MAX),
            u32::try_from(output).unwrap_or(u32::MAX),
        ))
    });
    Ok((message, stop_reason, usage))
}

/// Encodes a message, rejecting blocks the model cannot accept.
pub fn encode_message(message: &Message, features: &[ConverseFeature]) -> Result<Value, BedrockError> {
    let content = message
        .content()
        .iter()
        .map(|block| encode_content(block, features))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(json!({
        "role": message.role().as_str(),
        "content": content,
    }))
}

/// Decodes a Converse wire message.
pub fn decode_message(value: &Value) -> Result<Message, BedrockError> {
    let role = match required_str(value, "role", "message")? {
        "user" => Role::User,
        "assistant" => Role::Assistant,
        other => {
            return Err(BedrockError::not_implemented(format!("message role '{}'", other)));
        }
    };
    let blocks = required(value, "content", "message")?
        .as_array()
        .ok_or_else(|| CodecError::decoding("message content is not an array"))?;
    if blocks.is_empty() {
        return Err(CodecError::decoding("message content is empty").into());
    }
    let content = blocks
        .iter()
        .map(decode_content)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Message::new(role, content)?)
}

fn require_feature(kind: ContentKind, features: &[ConverseFeature]) -> Result<(), BedrockError> {
    if features.contains(&ConverseFeature::required_for(kind)) {
        Ok(())
    } else {
        Err(BedrockError::not_implemented(format!(
            "{} content for this model",
            kind
        )))
    }
}

/// Encodes one content block.
pub fn encode_content(content: &Content, features: &[ConverseFeature]) -> Result<Value, BedrockError> {
    require_feature(content.kind(), features)?;
    Ok(match content {
        Content::Text(text) => json!({ "text": text }),
        Content::Image(block) => json!({ "image": encode_image(block)? }),
        Content::Video(block) => json!({ "video": encode_video(block)? }),
        Content::Document(block) => json!({ "document": encode_document(block)? }),
        Content::ToolUse(block) => {
            validate_tool_name(&block.name)?;
            json!({
                "toolUse": {
                    "toolUseId": block.id,
                    "name": block.name,
                    "input": block.input.to_value()?,
                }
            })
        }
        Content::ToolResult(block) => {
            let items = block
                .content
                .iter()
                .map(|item| encode_tool_result_item(item, features))
                .collect::<Result<Vec<_>, _>>()?;
            json!({
                "toolResult": {
                    "toolUseId": block.id,
                    "content": items,
                    "status": block.status.as_str(),
                }
            })
        }
    })
}

fn encode_tool_result_item(
    item: &ToolResultContent,
    features: &[ConverseFeature],
) -> Result<Value, BedrockError> {
    Ok(match item {
        ToolResultContent::Text(text) => json!({ "text": text }),
        ToolResultContent::Json(document) => json!({ "json": document.to_value()? }),
        ToolResultContent::Image(block) => {
            require_feature(ContentKind::Image, features)?;
            json!({ "image": encode_image(block)? })
        }
        ToolResultContent::Document(block) => {
            require_feature(ContentKind::Document, features)?;
            json!({ "document": encode_document(block)? })
        }
        ToolResultContent::Video(block) => {
            require_feature(ContentKind::Video, features)?;
            json!({ "video": encode_video(block)? })
        }
    })
}

fn encode_image(block: &ImageBlock) -> Result<Value, BedrockError> {
    Ok(json!({
        "format": block.format.as_str(),
        "source": encode_source(&block.source)?,
    }))
}

fn encode_video(block: &VideoBlock) -> Result<Value, BedrockError> {
    if block.source.is_empty_bytes() {
        return Err(RequestError::invalid_name("video payload is empty").into());
    }
    Ok(json!({
        "format": block.format.as_str(),
        "source": encode_source(&block.source)?,
    }))
}

fn encode_document(block: &DocumentBlock) -> Result<Value, BedrockError> {
    validate_document_name(&block.name)?;
    if block.source.is_empty_bytes() {
        return Err(RequestError::invalid_name("document payload is empty").into());
    }
    Ok(json!({
        "name": block.name,
        "format": block.format.as_str(),
        "source": encode_source(&block.source)?,
    }))
}

fn encode_source(source: &MediaSource) -> Result<Value, BedrockError> {
    match source {
        MediaSource::Bytes(data) => {
            validate_base64(data).map_err(|e| CodecError::encoding(e.to_string()))?;
            Ok(json!({ "bytes": data }))
        }
        MediaSource::S3(location) => {
            let mut s3 = Map::new();
            s3.insert("uri".to_string(), Value::String(location.uri()));
            if let Some(region) = &location.region {
                s3.insert("region".to_string(), Value::String(region.clone()));
            }
            Ok(json!({ "s3Location": s3 }))
        }
    }
}

/// Decodes one content block.
pub fn decode_content(value: &Value) -> Result<Content, BedrockError> {
    let (kind, inner) = single_member(value, "content block")?;
    match kind {
        "text" => Ok(Content::Text(as_string(inner, "text")?)),
        "image" => Ok(Content::Image(decode_image(inner)?)),
        "video" => Ok(Content::Video(decode_video(inner)?)),
        "document" => Ok(Content::Document(decode_document(inner)?)),
        "toolUse" => {
            let input = DynamicDocument::try_from(required(inner, "input", "toolUse")?.clone())?;
            Ok(Content::ToolUse(ToolUseBlock::new(
                required_str(inner, "toolUseId", "toolUse")?,
                required_str(inner, "name", "toolUse")?,
                input,
            )?))
        }
        "toolResult" => {
            let items = required(inner, "content", "toolResult")?
                .as_array()
                .ok_or_else(|| CodecError::decoding("toolResult content is not an array"))?
                .iter()
                .map(decode_tool_result_item)
                .collect::<Result<Vec<_>, _>>()?;
            let status = match inner.get("status").and_then(Value::as_str) {
                Some(status) => ToolResultStatus::parse(status)?,
                None => ToolResultStatus::Success,
            };
            Ok(Content::ToolResult(
                ToolResultBlock::new(required_str(inner, "toolUseId", "toolResult")?, items)
                    .with_status(status),
            ))
        }
        other => Err(BedrockError::not_implemented(format!(
            "content block '{}'",
            other
        ))),
    }
}

fn decode_tool_result_item(value: &Value) -> Result<ToolResultContent, BedrockError> {
    let (kind, inner) = single_member(value, "tool result content")?;
    match kind {
        "text" => Ok(ToolResultContent::Text(as_string(inner, "text")?)),
        "json" => Ok(ToolResultContent::Json(DynamicDocument::try_from(
            inner.clone(),
        )?)),
        "image" => Ok(ToolResultContent::Image(decode_image(inner)?)),
        "document" => Ok(ToolResultContent::Document(decode_document(inner)?)),
        "video" => Ok(ToolResultContent::Video(decode_video(inner)?)),
        other => Err(BedrockError::not_implemented(format!(
            "tool result content '{}'",
            other
        ))),
    }
}

fn decode_image(value: &Value) -> Result<ImageBlock, BedrockError> {
    let format = ImageFormat::parse(required_str(value, "format", "image")?)?;
    ImageBlock::from_source(format, decode_source(required(value, "source", "image")?)?)
}

fn decode_video(value: &Value) -> Result<VideoBlock, BedrockError> {
    let format = VideoFormat::parse(required_str(value, "format", "video")?)?;
    VideoBlock::from_source(format, decode_source(required(value, "source", "video")?)?)
}

fn decode_document(value: &Value) -> Result<DocumentBlock, BedrockError> {
    let format = DocumentFormat::parse(required_str(value, "format", "document")?)?;
    DocumentBlock::from_source(
        required_str(value, "name", "document")?,
        format,
        decode_source(required(value, "source", "document")?)?,
    )
}

fn decode_source(value: &Value) -> Result<MediaSource, BedrockError> {
    let (kind, inner) = single_member(value, "media source")?;
    match kind {
        "bytes" => {
            let data = as_string(inner, "bytes")?;
            validate_base64(&data)?;
            Ok(MediaSource::Bytes(data))
        }
        "s3Location" => {
            let uri = required_str(inner, "uri", "s3Location")?;
            let region = inner
                .get("region")
                .and_then(Value::as_str)
                .map(str::to_string);
            Ok(MediaSource::S3(S3Location::from_uri(uri, region)?))
        }
        other => Err(BedrockError::not_implemented(format!(
            "media source '{}'",
            other
        ))),
    }
}

fn single_member<'a>(value: &'a Value, context: &str) -> Result<(&'a str, &'a Value), CodecError> {
    let object = value
        .as_object()
        .ok_or_else(|| CodecError::decoding(format!("{} is not an object", context)))?;
    let mut members = object.iter();
    match (members.next(), members.next()) {
        (Some((key, inner)), None) => Ok((key.as_str(), inner)),
        _ => Err(CodecError::decoding(format!(
            "{} must have exactly one member",
            context
        ))),
    }
}

fn required<'a>(value: &'a Value, field: &str, context: &str) -> Result<&'a Value, CodecError> {
    value
        .get(field)
        .ok_or_else(|| CodecError::missing(field, context))
}

fn required_str<'a>(value: &'a Value, field: &str, context: &str) -> Result<&'a str, CodecError> {
    required(value, field, context)?
        .as_str()
        .ok_or_else(|| CodecError::decoding(format!("{}.{} is not a string", context, field)))
}

fn as_string(value: &Value, context: &str) -> Result<String, CodecError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| CodecError::decoding(format!("{} is not a string", context)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::History;
    use pretty_assertions::assert_eq;

    const ALL: &[ConverseFeature] = &[
        ConverseFeature::TextGeneration,
        ConverseFeature::SystemPrompts,
        ConverseFeature::Vision,
        ConverseFeature::Document,
        ConverseFeature::Video,
        ConverseFeature::ToolUse,
    ];

    const PNG: &str = "iVBORw0KGgo=";

    fn round_trip(content: Content) {
        let wire = encode_content(&content, ALL).unwrap();
        assert_eq!(decode_content(&wire).unwrap(), content);
    }

    fn nested_document() -> DynamicDocument {
        DynamicDocument::from_json_str(
            r#"{"location": [{"city": "Paris", "coords": {"lat": 48.85, "lon": 2}}], "units": null}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_text() {
        round_trip(Content::text("hello"));
        round_trip(Content::text(""));
    }

    #[test]
    fn test_round_trip_image() {
        round_trip(ImageBlock::new(ImageFormat::Png, PNG).unwrap().into());
        let s3 = S3Location::new("bucket", "img/cat.jpeg").with_region("us-west-2");
        round_trip(
            ImageBlock::from_source(ImageFormat::Jpeg, MediaSource::S3(s3))
                .unwrap()
                .into(),
        );
    }

    #[test]
    fn test_round_trip_video() {
        round_trip(VideoBlock::new(VideoFormat::Mp4, "AAAAGGZ0eXA=").unwrap().into());
    }

    #[test]
    fn test_round_trip_document() {
        round_trip(
            DocumentBlock::new("Q3 report", DocumentFormat::Pdf, "JVBERi0xLjQ=")
                .unwrap()
                .into(),
        );
    }

    #[test]
    fn test_round_trip_tool_use_and_result() {
        round_trip(
            ToolUseBlock::new("tooluse_1", "get_weather", nested_document())
                .unwrap()
                .into(),
        );
        round_trip(
            ToolResultBlock::new(
                "tooluse_1",
                vec![
                    ToolResultContent::Json(nested_document()),
                    ToolResultContent::Text("sunny".into()),
                    ToolResultContent::Image(ImageBlock::new(ImageFormat::Png, PNG).unwrap()),
                ],
            )
            .with_status(ToolResultStatus::Error)
            .into(),
        );
    }

    #[test]
    fn test_wire_shapes() {
        let s3 = S3Location::new("b", "k");
        let doc = DocumentBlock::from_source("notes", DocumentFormat::Txt, MediaSource::S3(s3))
            .unwrap();
        let wire = encode_content(&doc.into(), ALL).unwrap();
        assert_eq!(
            wire,
            json!({"document": {"name": "notes", "format": "txt", "source": {"s3Location": {"uri": "s3://b/k"}}}})
        );

        let tool_use = ToolUseBlock::new("id1", "calc", DynamicDocument::empty_object()).unwrap();
        let wire = encode_content(&tool_use.into(), ALL).unwrap();
        assert_eq!(
            wire,
            json!({"toolUse": {"toolUseId": "id1", "name": "calc", "input": {}}})
        );
    }

    #[test]
    fn test_unknown_block_not_implemented() {
        let err = decode_content(&json!({"reasoningContent": {"text": "..."}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
        assert!(err.to_string().contains("reasoningContent"));

        let err = decode_content(&json!({"image": {"format": "bmp", "source": {"bytes": PNG}}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);

        let err = decode_content(&json!({"image": {"format": "png", "source": {"uri": "x"}}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }

    #[test]
    fn test_decode_validates_payloads() {
        let err = decode_content(&json!({"image": {"format": "png", "source": {"bytes": "@@@"}}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodingError);

        let err = decode_content(&json!({"video": {"format": "mp4", "source": {"bytes": ""}}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidName);

        let err = decode_content(&json!({"toolUse": {"toolUseId": "1", "name": "bad name", "input": {}}}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidName);

        let err = decode_content(&json!({"toolUse": {"toolUseId": "1", "input": {}}})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodingError);
        assert!(err.to_string().contains("name"));
    }

    #[test]
    fn test_encode_revalidates_literal_blocks() {
        let document = Content::Document(DocumentBlock {
            name: "report".to_string(),
            format: DocumentFormat::Pdf,
            source: MediaSource::Bytes(String::new()),
        });
        assert_eq!(encode_content(&document, ALL).unwrap_err().kind(), ErrorKind::InvalidName);

        let document = Content::Document(DocumentBlock {
            name: "report?.pdf".to_string(),
            format: DocumentFormat::Pdf,
            source: MediaSource::Bytes(PNG.to_string()),
        });
        assert_eq!(encode_content(&document, ALL).unwrap_err().kind(), ErrorKind::InvalidName);

        let video = Content::Video(VideoBlock {
            format: VideoFormat::Mp4,
            source: MediaSource::Bytes(String::new()),
        });
        assert_eq!(encode_content(&video, ALL).unwrap_err().kind(), ErrorKind::InvalidName);

        let tool_use = Content::ToolUse(ToolUseBlock {
            id: "1".to_string(),
            name: "bad name!".to_string(),
            input: DynamicDocument::empty_object(),
        });
        assert_eq!(encode_content(&tool_use, ALL).unwrap_err().kind(), ErrorKind::InvalidName);
    }

    #[test]
    fn test_encode_rejects_unsupported_variant() {
        let features = [ConverseFeature::TextGeneration, ConverseFeature::Vision];
        let video: Content = VideoBlock::new(VideoFormat::Mov, "AAAA").unwrap().into();
        let err = encode_content(&video, &features).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
        assert!(err.to_string().contains("video"));

        let result: Content = ToolResultBlock::new(
            "1",
            vec![ToolResultContent::Video(VideoBlock::new(VideoFormat::Mov, "AAAA").unwrap())],
        )
        .into();
        let features = [ConverseFeature::TextGeneration, ConverseFeature::ToolUse];
        assert_eq!(
            encode_content(&result, &features).unwrap_err().kind(),
            ErrorKind::NotImplemented
        );
    }

    #[test]
    fn test_history_round_trip_preserves_order() {
        let history = History::from(vec![
            Message::user("What is 2+2?"),
            Message::assistant("4"),
            Message::user("And times 3?"),
            Message::assistant("12"),
        ]);

        let wire: Vec<Value> = history
            .iter()
            .map(|m| encode_message(m, ALL).unwrap())
            .collect();
        assert_eq!(wire[0]["role"], "user");
        assert_eq!(wire[3]["content"][0]["text"], "12");

        let decoded = History::from(
            wire.iter()
                .map(|v| decode_message(v).unwrap())
                .collect::<Vec<_>>(),
        );
        assert_eq!(decoded, history);
    }

    #[test]
    fn test_decode_message_rejects_empty_content() {
        let err = decode_message(&json!({"role": "assistant", "content": []})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodingError);

        let err = decode_message(&json!({"role": "system", "content": [{"text": "x"}]}))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
    }
}
