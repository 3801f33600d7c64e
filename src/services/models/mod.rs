//! Foundation model listing.
//!
//! Converts the service's `ListFoundationModels` body into summaries and
//! marks the entries this crate can drive.

use super::decode_body;
use crate::error::{BedrockError, ResponseError};
use crate::registry::ModelRegistry;
use crate::types::{FoundationModelSummary, ListModelsResponse};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Lifecycle stage of a foundation model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelLifecycleStatus {
    Active,
    Legacy,
}

impl ModelLifecycleStatus {
    fn parse(status: &str) -> Option<Self> {
        match status.to_ascii_uppercase().as_str() {
            "ACTIVE" => Some(ModelLifecycleStatus::Active),
            "LEGACY" => Some(ModelLifecycleStatus::Legacy),
            _ => None,
        }
    }
}

impl fmt::Display for ModelLifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelLifecycleStatus::Active => f.write_str("active"),
            ModelLifecycleStatus::Legacy => f.write_str("legacy"),
        }
    }
}

/// One listed foundation model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelSummary {
    pub model_name: String,
    pub provider_name: String,
    pub model_id: String,
    pub model_arn: String,
    pub lifecycle: ModelLifecycleStatus,
    pub response_streaming_supported: bool,
    /// True when the registry knows this id.
    pub registered: bool,
}

impl ModelSummary {
    fn from_raw(
        raw: FoundationModelSummary,
        registry: &ModelRegistry,
    ) -> Result<Self, ResponseError> {
        let model_id = require(raw.model_id, "modelId")?;
        let status = raw
            .model_lifecycle
            .and_then(|lifecycle| lifecycle.status)
            .ok_or_else(|| missing("modelLifecycle.status"))?;
        let lifecycle =
            ModelLifecycleStatus::parse(&status).ok_or_else(|| ResponseError::UnsupportedValue {
                field: "modelLifecycle.status".to_string(),
                value: status.clone(),
            })?;

        Ok(Self {
            model_name: require(raw.model_name, "modelName")?,
            provider_name: require(raw.provider_name, "providerName")?,
            model_arn: require(raw.model_arn, "modelArn")?,
            lifecycle,
            response_streaming_supported: raw.response_streaming_supported.unwrap_or(false),
            registered: registry.contains(&model_id),
            model_id,
        })
    }
}

/// Parse a `ListFoundationModels` body.
///
/// Any entry missing a required field fails the whole listing.
pub fn parse_model_summaries(
    body: &[u8],
    registry: &ModelRegistry,
) -> Result<Vec<ModelSummary>, BedrockError> {
    let response: ListModelsResponse = decode_body(body, "model listing")?;
    let raw = response
        .model_summaries
        .ok_or_else(|| ResponseError::invalid("listing has no modelSummaries"))?;

    let summaries = raw
        .into_iter()
        .map(|entry| ModelSummary::from_raw(entry, registry))
        .collect::<Result<Vec<_>, _>>()?;

    debug!(
        total = summaries.len(),
        registered = summaries.iter().filter(|s| s.registered).count(),
        "Parsed model listing"
    );
    Ok(summaries)
}

fn require(value: Option<String>, field: &str) -> Result<String, ResponseError> {
    value.ok_or_else(|| missing(field))
}

fn missing(field: &str) -> ResponseError {
    ResponseError::MissingField {
        field: field.to_string(),
        context: "FoundationModelSummary".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::registry::registry;

    const LISTING: &str = r#"{
        "modelSummaries": [
            {
                "modelArn": "arn:aws:bedrock:us-east-1::foundation-model/amazon.titan-text-express-v1",
                "modelId": "amazon.titan-text-express-v1",
                "modelName": "Titan Text G1 - Express",
                "providerName": "Amazon",
                "responseStreamingSupported": true,
                "modelLifecycle": {"status": "ACTIVE"}
            },
            {
                "modelArn": "arn:aws:bedrock:us-east-1::foundation-model/cohere.command-text-v14",
                "modelId": "cohere.command-text-v14",
                "modelName": "Command",
                "providerName": "Cohere",
                "modelLifecycle": {"status": "LEGACY"}
            }
        ]
    }"#;

    #[test]
    fn test_parse_listing() {
        let summaries = parse_model_summaries(LISTING.as_bytes(), registry()).unwrap();
        assert_eq!(summaries.len(), 2);

        assert_eq!(summaries[0].lifecycle, ModelLifecycleStatus::Active);
        assert!(summaries[0].registered);
        assert!(summaries[0].response_streaming_supported);

        assert_eq!(summaries[1].lifecycle, ModelLifecycleStatus::Legacy);
        assert!(!summaries[1].registered);
        assert!(!summaries[1].response_streaming_supported);
    }

    #[test]
    fn test_missing_field() {
        let body = br#"{"modelSummaries": [{"modelId": "x", "modelLifecycle": {"status": "ACTIVE"}}]}"#;
        let err = parse_model_summaries(body, registry()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.to_string().contains("modelName"));
    }

    #[test]
    fn test_unknown_lifecycle() {
        let body = br#"{"modelSummaries": [{
            "modelId": "x", "modelName": "X", "providerName": "P", "modelArn": "arn",
            "modelLifecycle": {"status": "RETIRED"}
        }]}"#;
        let err = parse_model_summaries(body, registry()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotSupported);
    }
}
