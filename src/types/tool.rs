//! Tool declarations for converse calls.

use crate::document::DynamicDocument;
use crate::error::{BedrockError, CodecError, RequestError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

static TOOL_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid tool name pattern"));

/// Tool names are non-empty and use only `[A-Za-z0-9_-]`.
pub fn validate_tool_name(name: &str) -> Result<(), RequestError> {
    if name.is_empty() {
        return Err(RequestError::invalid_name("tool name is empty"));
    }
    if !TOOL_NAME.is_match(name) {
        return Err(RequestError::invalid_name(format!(
            "tool name '{}' must match [a-zA-Z0-9_-]+",
            name
        )));
    }
    Ok(())
}

/// A tool the model may call.
///
/// Serializes to `{"name", "description"?, "inputSchema"}`; the schema is
/// passed through verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: DynamicDocument,
}

impl Tool {
    pub fn new(name: impl Into<String>, input_schema: DynamicDocument) -> Result<Self, BedrockError> {
        let name = name.into();
        validate_tool_name(&name)?;
        Ok(Self {
            name,
            description: None,
            input_schema,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Parses a tool declaration and validates its name.
    pub fn from_json_str(json: &str) -> Result<Self, BedrockError> {
        let tool: Tool = serde_json::from_str(json)
            .map_err(|e| CodecError::decoding(format!("invalid tool declaration: {}", e)))?;
        validate_tool_name(&tool.name)?;
        Ok(tool)
    }

    /// Converse `toolSpec` wrapper: the schema sits under `inputSchema.json`.
    ///
    /// The name is checked again here since the fields are public.
    pub(crate) fn to_tool_spec(&self) -> Result<Value, BedrockError> {
        validate_tool_name(&self.name)?;
        let mut spec = json!({
            "name": self.name,
            "inputSchema": { "json": self.input_schema.to_value()? },
        });
        if let Some(description) = &self.description {
            spec["description"] = Value::String(description.clone());
        }
        Ok(json!({ "toolSpec": spec }))
    }
}
