//! Conversation content blocks.
//!
//! Media payloads are kept as base64 text, exactly as they travel on the
//! wire. Constructors validate the payload so an invalid block never reaches
//! a provider.

use crate::document::DynamicDocument;
use crate::error::{BedrockError, CodecError, RequestError};
use crate::types::tool::validate_tool_name;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

static DOCUMENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9\s\-()\[\]]+$").expect("valid document name pattern"));

/// Kind of a content block, used in error messages and capability checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Text,
    Image,
    Video,
    Document,
    ToolUse,
    ToolResult,
}

impl ContentKind {
    /// Wire tag of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentKind::Text => "text",
            ContentKind::Image => "image",
            ContentKind::Video => "video",
            ContentKind::Document => "document",
            ContentKind::ToolUse => "toolUse",
            ContentKind::ToolResult => "toolResult",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! wire_format {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[doc = concat!("`", $wire, "`")]
                $variant,
            )+
        }

        impl $name {
            /// Wire name of the format.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Parses a wire name; unknown formats are not implemented.
            pub fn parse(value: &str) -> Result<Self, BedrockError> {
                match value {
                    $($wire => Ok($name::$variant),)+
                    other => Err(BedrockError::not_implemented(format!(
                        "{} '{}'",
                        stringify!($name),
                        other
                    ))),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_format!(
    /// Image encodings accepted in conversations.
    ImageFormat {
        Gif => "gif",
        Jpeg => "jpeg",
        Png => "png",
        Webp => "webp",
    }
);

wire_format!(
    /// Video containers accepted in conversations.
    VideoFormat {
        Flv => "flv",
        Mkv => "mkv",
        Mov => "mov",
        Mp4 => "mp4",
        Mpeg => "mpeg",
        Mpg => "mpg",
        ThreeGp => "three_gp",
        Webm => "webm",
        Wmv => "wmv",
    }
);

wire_format!(
    /// Document types accepted in conversations.
    DocumentFormat {
        Pdf => "pdf",
        Csv => "csv",
        Doc => "doc",
        Docx => "docx",
        Xls => "xls",
        Xlsx => "xlsx",
        Html => "html",
        Txt => "txt",
        Md => "md",
    }
);

/// Reference to an object in S3.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub key: String,
    pub region: Option<String>,
}

impl S3Location {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            region: None,
        }
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// `s3://bucket/key`
    pub fn uri(&self) -> String {
        format!("s3://{}/{}", self.bucket, self.key)
    }

    /// Parses an `s3://bucket/key` URI.
    pub fn from_uri(uri: &str, region: Option<String>) -> Result<Self, CodecError> {
        let rest = uri
            .strip_prefix("s3://")
            .ok_or_else(|| CodecError::decoding(format!("'{}' is not an s3:// URI", uri)))?;
        match rest.split_once('/') {
            Some((bucket, key)) if !bucket.is_empty() && !key.is_empty() => Ok(Self {
                bucket: bucket.to_string(),
                key: key.to_string(),
                region,
            }),
            _ => Err(CodecError::decoding(format!(
                "'{}' does not name a bucket and key",
                uri
            ))),
        }
    }
}

/// Where a media payload lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// Inline base64 text.
    Bytes(String),
    /// Remote object.
    S3(S3Location),
}

impl MediaSource {
    /// Inline bytes, validated as base64.
    pub fn bytes(base64: impl Into<String>) -> Result<Self, CodecError> {
        let base64 = base64.into();
        validate_base64(&base64)?;
        Ok(MediaSource::Bytes(base64))
    }

    /// Inline bytes from raw binary data.
    pub fn from_raw(data: &[u8]) -> Self {
        MediaSource::Bytes(STANDARD.encode(data))
    }

    pub(crate) fn is_empty_bytes(&self) -> bool {
        matches!(self, MediaSource::Bytes(b) if b.is_empty())
    }
}

/// Checks that `value` is well-formed standard base64.
pub fn validate_base64(value: &str) -> Result<(), CodecError> {
    STANDARD
        .decode(value)
        .map(|_| ())
        .map_err(|e| CodecError::decoding(format!("invalid base64 payload: {}", e)))
}

/// An image attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBlock {
    pub format: ImageFormat,
    pub source: MediaSource,
}

impl ImageBlock {
    /// Inline image from base64 text.
    pub fn new(format: ImageFormat, base64: impl Into<String>) -> Result<Self, BedrockError> {
        Self::from_source(format, MediaSource::bytes(base64)?)
    }

    pub fn from_source(format: ImageFormat, source: MediaSource) -> Result<Self, BedrockError> {
        if let MediaSource::Bytes(b) = &source {
            validate_base64(b)?;
        }
        Ok(Self { format, source })
    }
}

/// A video attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoBlock {
    pub format: VideoFormat,
    pub source: MediaSource,
}

impl VideoBlock {
    /// Inline video from base64 text. Empty payloads are rejected.
    pub fn new(format: VideoFormat, base64: impl Into<String>) -> Result<Self, BedrockError> {
        Self::from_source(format, MediaSource::Bytes(base64.into()))
    }

    pub fn from_source(format: VideoFormat, source: MediaSource) -> Result<Self, BedrockError> {
        if source.is_empty_bytes() {
            return Err(RequestError::invalid_name("video payload is empty").into());
        }
        if let MediaSource::Bytes(b) = &source {
            validate_base64(b)?;
        }
        Ok(Self { format, source })
    }
}

/// A named document attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentBlock {
    pub name: String,
    pub format: DocumentFormat,
    pub source: MediaSource,
}

impl DocumentBlock {
    /// Inline document from base64 text. Empty payloads are rejected.
    pub fn new(
        name: impl Into<String>,
        format: DocumentFormat,
        base64: impl Into<String>,
    ) -> Result<Self, BedrockError> {
        Self::from_source(name, format, MediaSource::Bytes(base64.into()))
    }

    pub fn from_source(
        name: impl Into<String>,
        format: DocumentFormat,
        source: MediaSource,
    ) -> Result<Self, BedrockError> {
        let name = name.into();
        validate_document_name(&name)?;
        if source.is_empty_bytes() {
            return Err(RequestError::invalid_name("document payload is empty").into());
        }
        if let MediaSource::Bytes(b) = &source {
            validate_base64(b)?;
        }
        Ok(Self {
            name,
            format,
            source,
        })
    }
}

/// Document names allow alphanumerics, hyphens, parentheses, square
/// brackets and single whitespace characters.
pub fn validate_document_name(name: &str) -> Result<(), RequestError> {
    if !DOCUMENT_NAME.is_match(name) {
        return Err(RequestError::invalid_name(format!(
            "document name '{}' contains unsupported characters",
            name
        )));
    }
    let mut previous_space = false;
    for c in name.chars() {
        let space = c.is_whitespace();
        if space && previous_space {
            return Err(RequestError::invalid_name(format!(
                "document name '{}' contains consecutive whitespace",
                name
            )));
        }
        previous_space = space;
    }
    Ok(())
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolUseBlock {
    pub id: String,
    pub name: String,
    pub input: DynamicDocument,
}

impl ToolUseBlock {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        input: DynamicDocument,
    ) -> Result<Self, BedrockError> {
        let name = name.into();
        validate_tool_name(&name)?;
        Ok(Self {
            id: id.into(),
            name,
            input,
        })
    }
}

/// Outcome reported for a tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToolResultStatus {
    #[default]
    Success,
    Error,
}

impl ToolResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolResultStatus::Success => "success",
            ToolResultStatus::Error => "error",
        }
    }

    pub fn parse(value: &str) -> Result<Self, BedrockError> {
        match value {
            "success" => Ok(ToolResultStatus::Success),
            "error" => Ok(ToolResultStatus::Error),
            other => Err(BedrockError::not_implemented(format!(
                "tool result status '{}'",
                other
            ))),
        }
    }
}

/// One item of a tool result.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResultContent {
    Text(String),
    Json(DynamicDocument),
    Image(ImageBlock),
    Document(DocumentBlock),
    Video(VideoBlock),
}

/// The caller's answer to a [`ToolUseBlock`].
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResultBlock {
    pub id: String,
    pub content: Vec<ToolResultContent>,
    pub status: ToolResultStatus,
}

impl ToolResultBlock {
    pub fn new(id: impl Into<String>, content: Vec<ToolResultContent>) -> Self {
        Self {
            id: id.into(),
            content,
            status: ToolResultStatus::Success,
        }
    }

    /// A successful result carrying a JSON document.
    pub fn json(id: impl Into<String>, output: DynamicDocument) -> Self {
        Self::new(id, vec![ToolResultContent::Json(output)])
    }

    /// A successful result carrying text.
    pub fn text(id: impl Into<String>, output: impl Into<String>) -> Self {
        Self::new(id, vec![ToolResultContent::Text(output.into())])
    }

    pub fn with_status(mut self, status: ToolResultStatus) -> Self {
        self.status = status;
        self
    }
}

/// A unit of conversation content.
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    Text(String),
    Image(ImageBlock),
    Video(VideoBlock),
    Document(DocumentBlock),
    ToolUse(ToolUseBlock),
    ToolResult(ToolResultBlock),
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text(text.into())
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Text(_) => ContentKind::Text,
            Content::Image(_) => ContentKind::Image,
            Content::Video(_) => ContentKind::Video,
            Content::Document(_) => ContentKind::Document,
            Content::ToolUse(_) => ContentKind::ToolUse,
            Content::ToolResult(_) => ContentKind::ToolResult,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_tool_use(&self) -> Option<&ToolUseBlock> {
        match self {
            Content::ToolUse(t) => Some(t),
            _ => None,
        }
    }

    /// Kinds of media carried by this block, including inside tool results.
    pub(crate) fn media_kinds(&self) -> Vec<ContentKind> {
        match self {
            Content::Image(_) => vec![ContentKind::Image],
            Content::Video(_) => vec![ContentKind::Video],
            Content::Document(_) => vec![ContentKind::Document],
            Content::ToolResult(result) => result
                .content
                .iter()
                .filter_map(|item| match item {
                    ToolResultContent::Image(_) => Some(ContentKind::Image),
                    ToolResultContent::Document(_) => Some(ContentKind::Document),
                    ToolResultContent::Video(_) => Some(ContentKind::Video),
                    ToolResultContent::Text(_) | ToolResultContent::Json(_) => None,
                })
                .collect(),
            Content::Text(_) | Content::ToolUse(_) => Vec::new(),
        }
    }
}

impl From<ImageBlock> for Content {
    fn from(block: ImageBlock) -> Self {
        Content::Image(block)
    }
}

impl From<VideoBlock> for Content {
    fn from(block: VideoBlock) -> Self {
        Content::Video(block)
    }
}

impl From<DocumentBlock> for Content {
    fn from(block: DocumentBlock) -> Self {
        Content::Document(block)
    }
}

impl From<ToolUseBlock> for Content {
    fn from(block: ToolUseBlock) -> Self {
        Content::ToolUse(block)
    }
}

impl From<ToolResultBlock> for Content {
    fn from(block: ToolResultBlock) -> Self {
        Content::ToolResult(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use test_case::test_case;

    #[test]
    fn test_empty_document_is_invalid_name() {
        let err = DocumentBlock::new("report", DocumentFormat::Pdf, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidName);
    }

    #[test]
    fn test_empty_video_is_invalid_name() {
        let err = VideoBlock::new(VideoFormat::Mp4, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidName);
    }

    #[test]
    fn test_malformed_base64_is_decoding_error() {
        let err = ImageBlock::new(ImageFormat::Png, "not base64!").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodingError);
        let err = DocumentBlock::new("report", DocumentFormat::Txt, "%%%").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DecodingError);
    }

    #[test]
    fn test_s3_sources_skip_payload_checks() {
        let location = S3Location::new("bucket", "clips/a.mp4").with_region("us-east-1");
        let block = VideoBlock::from_source(VideoFormat::Mp4, MediaSource::S3(location)).unwrap();
        assert!(matches!(block.source, MediaSource::S3(_)));
    }

    #[test]
    fn test_s3_uri_round_trip() {
        let location = S3Location::new("bucket", "dir/key.pdf");
        assert_eq!(location.uri(), "s3://bucket/dir/key.pdf");
        assert_eq!(S3Location::from_uri(&location.uri(), None).unwrap(), location);
        assert!(S3Location::from_uri("https://bucket/key", None).is_err());
        assert!(S3Location::from_uri("s3://bucket", None).is_err());
    }

    #[test_case("Quarterly Report (v2) [final]", true ; "allowed punctuation")]
    #[test_case("report-2024", true ; "hyphen")]
    #[test_case("two  spaces", false ; "consecutive whitespace")]
    #[test_case("report.pdf", false ; "dot")]
    #[test_case("", false ; "empty")]
    fn test_document_name(name: &str, ok: bool) {
        assert_eq!(validate_document_name(name).is_ok(), ok);
    }

    #[test]
    fn test_unknown_format_not_implemented() {
        let err = ImageFormat::parse("bmp").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotImplemented);
        assert_eq!(VideoFormat::parse("three_gp").unwrap(), VideoFormat::ThreeGp);
        assert_eq!(DocumentFormat::parse("md").unwrap(), DocumentFormat::Md);
    }

    #[test]
    fn test_media_kinds_inside_tool_result() {
        let image = ImageBlock::new(ImageFormat::Png, "aGVsbG8=").unwrap();
        let result = ToolResultBlock::new(
            "t1",
            vec![
                ToolResultContent::Text("ok".into()),
                ToolResultContent::Image(image),
            ],
        );
        assert_eq!(
            Content::from(result).media_kinds(),
            vec![ContentKind::Image]
        );
    }
}
