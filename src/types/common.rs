//! Common types shared across model families.

use serde::{Deserialize, Serialize};

/// Provider family of a model, selecting its wire schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelFamily {
    /// Amazon Titan text and image models.
    Titan,
    /// Amazon Nova models.
    Nova,
    /// Anthropic Claude models.
    Claude,
    /// Meta LLaMA models.
    Llama,
}

impl std::fmt::Display for ModelFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelFamily::Titan => write!(f, "titan"),
            ModelFamily::Nova => write!(f, "nova"),
            ModelFamily::Claude => write!(f, "claude"),
            ModelFamily::Llama => write!(f, "llama"),
        }
    }
}

/// Unified stop reason enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Model completed its response naturally.
    EndTurn,
    /// Maximum tokens reached.
    MaxTokens,
    /// Stop sequence encountered.
    StopSequence,
    /// Content was filtered.
    ContentFilter,
    /// Tool use requested.
    ToolUse,
    /// A guardrail stopped generation.
    GuardrailIntervened,
}

impl StopReason {
    /// Normalize Titan completion reason to unified format.
    pub fn from_titan(reason: &str) -> Self {
        match reason.to_uppercase().as_str() {
            "FINISH" | "FINISHED" => StopReason::EndTurn,
            "LENGTH" => StopReason::MaxTokens,
            "STOP_SEQUENCE" => StopReason::StopSequence,
            "CONTENT_FILTERED" => StopReason::ContentFilter,
            _ => StopReason::EndTurn,
        }
    }

    /// Normalize Claude stop reason to unified format.
    pub fn from_claude(reason: &str) -> Self {
        match reason {
            "end_turn" => StopReason::EndTurn,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            "tool_use" => StopReason::ToolUse,
            _ => StopReason::EndTurn,
        }
    }

    /// Normalize LLaMA stop reason to unified format.
    pub fn from_llama(reason: &str) -> Self {
        match reason {
            "stop" => StopReason::EndTurn,
            "length" => StopReason::MaxTokens,
            _ => StopReason::EndTurn,
        }
    }

    /// Normalize a Converse (or Nova invoke) stop reason.
    pub fn from_converse(reason: &str) -> Self {
        match reason {
            "end_turn" => StopReason::EndTurn,
            "max_tokens" => StopReason::MaxTokens,
            "stop_sequence" => StopReason::StopSequence,
            "tool_use" => StopReason::ToolUse,
            "content_filtered" => StopReason::ContentFilter,
            "guardrail_intervened" => StopReason::GuardrailIntervened,
            _ => StopReason::EndTurn,
        }
    }
}

/// Token usage information.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageInfo {
    /// Number of input tokens.
    pub input_tokens: u32,
    /// Number of output tokens.
    pub output_tokens: u32,
    /// Total tokens (input + output).
    pub total_tokens: u32,
}

impl UsageInfo {
    /// Create new usage info.
    pub fn new(input_tokens: u32, output_tokens: u32) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens: input_tokens.saturating_add(output_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stop_reason_normalization() {
        assert_eq!(StopReason::from_titan("FINISH"), StopReason::EndTurn);
        assert_eq!(StopReason::from_titan("LENGTH"), StopReason::MaxTokens);
        assert_eq!(StopReason::from_titan("CONTENT_FILTERED"), StopReason::ContentFilter);
        assert_eq!(StopReason::from_claude("end_turn"), StopReason::EndTurn);
        assert_eq!(StopReason::from_claude("tool_use"), StopReason::ToolUse);
        assert_eq!(StopReason::from_llama("stop"), StopReason::EndTurn);
        assert_eq!(StopReason::from_llama("length"), StopReason::MaxTokens);
        assert_eq!(
            StopReason::from_converse("guardrail_intervened"),
            StopReason::GuardrailIntervened
        );
    }

    #[test]
    fn test_usage_info() {
        let usage = UsageInfo::new(100, 50);
        assert_eq!(usage.input_tokens, 100);
        assert_eq!(usage.output_tokens, 50);
        assert_eq!(usage.total_tokens, 150);
    }

    #[test]
    fn test_model_family_display() {
        assert_eq!(ModelFamily::Nova.to_string(), "nova");
        assert_eq!(
            serde_json::to_string(&ModelFamily::Claude).unwrap(),
            "\"claude\""
        );
    }
}
