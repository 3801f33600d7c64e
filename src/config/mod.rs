//! Configuration for the Bedrock modality client.

use crate::error::{BedrockError, ConfigurationError};

/// Content type used for every Bedrock runtime payload.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Configuration for the Bedrock client.
#[derive(Debug, Clone)]
pub struct BedrockConfig {
    /// AWS region forwarded to the transport.
    pub region: String,
    /// Content type of request payloads.
    pub content_type: String,
    /// Accepted response type.
    pub accept: String,
}

impl BedrockConfig {
    /// Create a new config builder.
    pub fn builder() -> BedrockConfigBuilder {
        BedrockConfigBuilder::new()
    }

    /// Build a configuration from `AWS_REGION` / `AWS_DEFAULT_REGION`.
    pub fn from_env() -> Result<Self, BedrockError> {
        BedrockConfigBuilder::new().from_env().build()
    }
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            content_type: JSON_CONTENT_TYPE.to_string(),
            accept: JSON_CONTENT_TYPE.to_string(),
        }
    }
}

/// Builder for BedrockConfig.
#[derive(Debug, Default)]
pub struct BedrockConfigBuilder {
    region: Option<String>,
    content_type: Option<String>,
    accept: Option<String>,
}

impl BedrockConfigBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the AWS region.
    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Override the request content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Override the accepted response type.
    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.accept = Some(accept.into());
        self
    }

    /// Fill unset values from environment variables.
    pub fn from_env(mut self) -> Self {
        if self.region.is_none() {
            self.region = std::env::var("AWS_REGION")
                .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
                .ok();
        }
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Result<BedrockConfig, BedrockError> {
        let region = self
            .region
            .ok_or(BedrockError::Configuration(ConfigurationError::MissingRegion))?;

        if !is_valid_region(&region) {
            return Err(BedrockError::Configuration(
                ConfigurationError::InvalidConfiguration {
                    field: "region".to_string(),
                    message: format!("'{}' is not a valid AWS region name", region),
                },
            ));
        }

        if !is_bedrock_region(&region) {
            return Err(BedrockError::Configuration(
                ConfigurationError::UnsupportedRegion { region },
            ));
        }

        let content_type = self
            .content_type
            .unwrap_or_else(|| JSON_CONTENT_TYPE.to_string());
        let accept = self.accept.unwrap_or_else(|| JSON_CONTENT_TYPE.to_string());

        // Every provider body in this crate is JSON.
        if content_type != JSON_CONTENT_TYPE || accept != JSON_CONTENT_TYPE {
            return Err(BedrockError::Configuration(
                ConfigurationError::InvalidConfiguration {
                    field: "content_type".to_string(),
                    message: format!("only {} payloads are supported", JSON_CONTENT_TYPE),
                },
            ));
        }

        Ok(BedrockConfig {
            region,
            content_type,
            accept,
        })
    }
}

/// Validate AWS region format.
fn is_valid_region(region: &str) -> bool {
    let parts: Vec<&str> = region.split('-').collect();
    if parts.len() < 3 {
        return false;
    }

    let valid_prefixes = ["us", "eu", "ap", "sa", "ca", "me", "af", "cn", "il"];
    valid_prefixes.contains(&parts[0])
}

/// Regions known to support Bedrock.
pub const BEDROCK_REGIONS: &[&str] = &[
    "us-east-1",
    "us-east-2",
    "us-west-2",
    "eu-west-1",
    "eu-west-3",
    "eu-central-1",
    "ap-south-1",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-northeast-1",
    "ca-central-1",
    "sa-east-1",
];

/// Check if a region supports Bedrock.
pub fn is_bedrock_region(region: &str) -> bool {
    BEDROCK_REGIONS.contains(&region)
}
