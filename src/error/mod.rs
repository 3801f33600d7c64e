//! Error types for the Bedrock modality layer.
//!
//! Errors are grouped by the stage that detects them (model lookup, parameter
//! validation, request construction, payload encoding/decoding, response
//! handling, transport). Every error maps onto a single [`ErrorKind`] so callers
//! can branch on the uniform taxonomy without matching nested enums.

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Uniform error taxonomy shared by all operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown model id or missing expected field in a provider response.
    NotFound,
    /// The selected model lacks the required capability.
    InvalidModality,
    /// Feature is valid canonically but disallowed for this model family.
    NotSupported,
    /// Numeric value out of bounds.
    InvalidParameter,
    /// No explicit value and no default.
    MissingRequiredValue,
    /// Empty or oversized prompt, malformed tool/result sequencing.
    InvalidPrompt,
    /// Malformed tool or document name, or empty media payload.
    InvalidName,
    /// Payload serialization failure.
    EncodingError,
    /// Payload deserialization failure.
    DecodingError,
    /// Transport succeeded but returned an unusable body.
    InvalidSdkResponse,
    /// Structurally valid but unhandled provider variant.
    NotImplemented,
    /// Failure reported by the transport collaborator.
    Transport,
    /// Invalid client configuration.
    Configuration,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::InvalidModality => "InvalidModality",
            ErrorKind::NotSupported => "NotSupported",
            ErrorKind::InvalidParameter => "InvalidParameter",
            ErrorKind::MissingRequiredValue => "MissingRequiredValue",
            ErrorKind::InvalidPrompt => "InvalidPrompt",
            ErrorKind::InvalidName => "InvalidName",
            ErrorKind::EncodingError => "EncodingError",
            ErrorKind::DecodingError => "DecodingError",
            ErrorKind::InvalidSdkResponse => "InvalidSDKResponse",
            ErrorKind::NotImplemented => "NotImplemented",
            ErrorKind::Transport => "Transport",
            ErrorKind::Configuration => "Configuration",
        };
        f.write_str(name)
    }
}

/// Top-level error type.
#[derive(Debug, Error)]
pub enum BedrockError {
    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// Model lookup and capability errors.
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Parameter validation errors.
    #[error("Parameter error: {0}")]
    Parameter(#[from] ParameterError),

    /// Request construction errors.
    #[error("Request error: {0}")]
    Request(#[from] RequestError),

    /// Payload encoding and decoding errors.
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Unusable responses from the transport.
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// Transport errors, propagated unchanged.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A provider variant this layer does not handle.
    #[error("Not implemented: {0}")]
    NotImplemented(String),
}

impl BedrockError {
    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            BedrockError::Configuration(_) => ErrorKind::Configuration,
            BedrockError::Model(e) => e.kind(),
            BedrockError::Parameter(e) => e.kind(),
            BedrockError::Request(e) => e.kind(),
            BedrockError::Codec(e) => e.kind(),
            BedrockError::Response(e) => e.kind(),
            BedrockError::Transport(_) => ErrorKind::Transport,
            BedrockError::NotImplemented(_) => ErrorKind::NotImplemented,
        }
    }

    /// Returns true if retrying the whole call may succeed.
    ///
    /// The core never retries; this is a hint for the caller.
    pub fn is_retryable(&self) -> bool {
        match self {
            BedrockError::Transport(e) => e.is_retryable(),
            _ => false,
        }
    }

    /// Returns the retry delay hint if the transport supplied one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            BedrockError::Transport(TransportError::Throttled { retry_after, .. }) => *retry_after,
            _ => None,
        }
    }

    /// Returns the model id the error refers to, if any.
    pub fn model_id(&self) -> Option<&str> {
        match self {
            BedrockError::Model(e) => Some(e.model_id()),
            _ => None,
        }
    }

    pub(crate) fn not_implemented(what: impl Into<String>) -> Self {
        BedrockError::NotImplemented(what.into())
    }
}

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// Missing required region configuration.
    #[error("Missing region: region must be specified via config or environment")]
    MissingRegion,

    /// Missing transport.
    #[error("Missing transport: a BedrockTransport must be supplied")]
    MissingTransport,

    /// Invalid configuration value.
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfiguration {
        /// The configuration field name.
        field: String,
        /// Error message.
        message: String,
    },

    /// Region does not support Bedrock.
    #[error("Region '{region}' does not support AWS Bedrock")]
    UnsupportedRegion {
        /// The unsupported region.
        region: String,
    },
}

/// Model lookup and capability errors.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Model id is not in the registry.
    #[error("Model not found: '{model_id}'")]
    NotFound {
        /// The model ID.
        model_id: String,
    },

    /// Model does not implement the requested capability.
    #[error("Model '{model_id}' ({modality}) does not support {capability}: {message}")]
    InvalidModality {
        /// The model ID.
        model_id: String,
        /// Name of the model's primary modality implementation.
        modality: String,
        /// The missing capability.
        capability: String,
        /// Error message.
        message: String,
    },
}

impl ModelError {
    /// Returns the taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::NotFound { .. } => ErrorKind::NotFound,
            ModelError::InvalidModality { .. } => ErrorKind::InvalidModality,
        }
    }

    /// Returns the model id.
    pub fn model_id(&self) -> &str {
        match self {
            ModelError::NotFound { model_id } | ModelError::InvalidModality { model_id, .. } => {
                model_id
            }
        }
    }
}

/// Parameter validation errors.
#[derive(Debug, Error)]
pub enum ParameterError {
    /// Explicit value for a knob this model family does not accept.
    #[error("Parameter '{parameter}' is not supported: {message}")]
    NotSupported {
        /// The parameter name.
        parameter: String,
        /// Error message.
        message: String,
    },

    /// Value outside the accepted bounds.
    #[error("Invalid value for parameter '{parameter}': {value} is outside [{minimum}, {maximum}]")]
    InvalidParameter {
        /// The parameter name.
        parameter: String,
        /// The offending value.
        value: f64,
        /// Inclusive lower bound.
        minimum: f64,
        /// Inclusive upper bound.
        maximum: f64,
    },

    /// Too many stop sequences.
    #[error("Too many stop sequences: {count} given, at most {maximum} allowed")]
    TooManyStopSequences {
        /// Number supplied.
        count: usize,
        /// Maximum accepted.
        maximum: usize,
    },

    /// Image dimensions outside the accepted grid.
    #[error("Invalid resolution {width}x{height}: {message}")]
    InvalidResolution {
        /// Requested width.
        width: u32,
        /// Requested height.
        height: u32,
        /// Error message.
        message: String,
    },

    /// No value given and no default available.
    #[error("No value was given for '{parameter}' and no default value was found")]
    MissingRequiredValue {
        /// The parameter name.
        parameter: String,
    },
}

impl ParameterError {
    /// Returns the taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParameterError::NotSupported { .. } => ErrorKind::NotSupported,
            ParameterError::InvalidParameter { .. }
            | ParameterError::TooManyStopSequences { .. }
            | ParameterError::InvalidResolution { .. } => ErrorKind::InvalidParameter,
            ParameterError::MissingRequiredValue { .. } => ErrorKind::MissingRequiredValue,
        }
    }

    /// Returns the offending parameter name.
    pub fn parameter(&self) -> &str {
        match self {
            ParameterError::NotSupported { parameter, .. }
            | ParameterError::InvalidParameter { parameter, .. }
            | ParameterError::MissingRequiredValue { parameter } => parameter,
            ParameterError::TooManyStopSequences { .. } => "stopSequences",
            ParameterError::InvalidResolution { .. } => "resolution",
        }
    }
}

/// Request construction errors.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Malformed prompt or conversation sequencing.
    #[error("Invalid prompt: {message}")]
    InvalidPrompt {
        /// Error message.
        message: String,
    },

    /// Prompt exceeds the model's maximum prompt size.
    #[error("Prompt too long: {length} characters, at most {maximum} allowed")]
    PromptTooLong {
        /// Prompt length in characters.
        length: usize,
        /// Maximum accepted length.
        maximum: usize,
    },

    /// Malformed name or empty media payload.
    #[error("Invalid name: {message}")]
    InvalidName {
        /// Error message.
        message: String,
    },
}

impl RequestError {
    /// Returns the taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RequestError::InvalidPrompt { .. } | RequestError::PromptTooLong { .. } => {
                ErrorKind::InvalidPrompt
            }
            RequestError::InvalidName { .. } => ErrorKind::InvalidName,
        }
    }

    pub(crate) fn invalid_prompt(message: impl Into<String>) -> Self {
        RequestError::InvalidPrompt {
            message: message.into(),
        }
    }

    pub(crate) fn invalid_name(message: impl Into<String>) -> Self {
        RequestError::InvalidName {
            message: message.into(),
        }
    }
}

/// Payload encoding and decoding errors.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Request payload could not be serialized.
    #[error("Encoding error: {message}")]
    Encoding {
        /// Error message.
        message: String,
    },

    /// Response payload could not be parsed.
    #[error("Decoding error: {message}")]
    Decoding {
        /// Error message.
        message: String,
    },

    /// A required field is absent from a provider payload.
    #[error("Decoding error: missing field '{field}' in {context}")]
    MissingField {
        /// The missing field.
        field: String,
        /// Where the field was expected.
        context: String,
    },
}

impl CodecError {
    /// Returns the taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CodecError::Encoding { .. } => ErrorKind::EncodingError,
            CodecError::Decoding { .. } | CodecError::MissingField { .. } => {
                ErrorKind::DecodingError
            }
        }
    }

    pub(crate) fn encoding(message: impl Into<String>) -> Self {
        CodecError::Encoding {
            message: message.into(),
        }
    }

    pub(crate) fn decoding(message: impl Into<String>) -> Self {
        CodecError::Decoding {
            message: message.into(),
        }
    }

    pub(crate) fn missing(field: impl Into<String>, context: impl Into<String>) -> Self {
        CodecError::MissingField {
            field: field.into(),
            context: context.into(),
        }
    }
}

/// Unusable responses returned by a successful transport call.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Empty body or missing top-level output.
    #[error("Invalid SDK response: {message}")]
    InvalidSdkResponse {
        /// Error message.
        message: String,
    },

    /// Listing entry is missing an expected field.
    #[error("Response is missing '{field}' in {context}")]
    MissingField {
        /// The missing field.
        field: String,
        /// Where the field was expected.
        context: String,
    },

    /// Listing entry carries a value this layer does not recognize.
    #[error("Unsupported value '{value}' for '{field}'")]
    UnsupportedValue {
        /// The field name.
        field: String,
        /// The unrecognized value.
        value: String,
    },
}

impl ResponseError {
    /// Returns the taxonomy kind.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ResponseError::InvalidSdkResponse { .. } => ErrorKind::InvalidSdkResponse,
            ResponseError::MissingField { .. } => ErrorKind::NotFound,
            ResponseError::UnsupportedValue { .. } => ErrorKind::NotSupported,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        ResponseError::InvalidSdkResponse {
            message: message.into(),
        }
    }
}

/// Errors reported by the transport collaborator.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Error message.
        message: String,
    },

    /// Request timed out.
    #[error("Request timed out after {duration:?}")]
    Timeout {
        /// The timeout duration.
        duration: Duration,
    },

    /// The remote service throttled the request.
    #[error("Request throttled: {message}")]
    Throttled {
        /// Error message.
        message: String,
        /// Retry after duration hint.
        retry_after: Option<Duration>,
    },

    /// The remote service rejected the request.
    #[error("Service error ({code}): {message}")]
    Service {
        /// Service error code.
        code: String,
        /// Error message.
        message: String,
    },

    /// The call was cancelled by the transport.
    #[error("Request cancelled")]
    Cancelled,
}

impl TransportError {
    /// Returns true if the error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::ConnectionFailed { .. }
                | TransportError::Timeout { .. }
                | TransportError::Throttled { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let not_found = BedrockError::from(ModelError::NotFound {
            model_id: "unknown".into(),
        });
        assert_eq!(not_found.kind(), ErrorKind::NotFound);
        assert_eq!(not_found.model_id(), Some("unknown"));

        let too_many = BedrockError::from(ParameterError::TooManyStopSequences {
            count: 5,
            maximum: 4,
        });
        assert_eq!(too_many.kind(), ErrorKind::InvalidParameter);

        let too_long = BedrockError::from(RequestError::PromptTooLong {
            length: 10,
            maximum: 5,
        });
        assert_eq!(too_long.kind(), ErrorKind::InvalidPrompt);

        let missing = BedrockError::from(CodecError::missing("generation", "Llama response"));
        assert_eq!(missing.kind(), ErrorKind::DecodingError);

        let listing = BedrockError::from(ResponseError::MissingField {
            field: "modelArn".into(),
            context: "model summary".into(),
        });
        assert_eq!(listing.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn test_invalid_parameter_message() {
        let err = ParameterError::InvalidParameter {
            parameter: "temperature".into(),
            value: 1.5,
            minimum: 0.0,
            maximum: 1.0,
        };
        assert_eq!(
            err.to_string(),
            "Invalid value for parameter 'temperature': 1.5 is outside [0, 1]"
        );
        assert_eq!(err.parameter(), "temperature");
    }

    #[test]
    fn test_is_retryable() {
        let throttled = BedrockError::Transport(TransportError::Throttled {
            message: "slow down".into(),
            retry_after: Some(Duration::from_secs(2)),
        });
        assert!(throttled.is_retryable());
        assert_eq!(throttled.retry_after(), Some(Duration::from_secs(2)));

        let service = BedrockError::Transport(TransportError::Service {
            code: "ValidationException".into(),
            message: "bad".into(),
        });
        assert!(!service.is_retryable());

        let prompt = BedrockError::from(RequestError::invalid_prompt("empty"));
        assert!(!prompt.is_retryable());
        assert!(prompt.retry_after().is_none());
    }
}
