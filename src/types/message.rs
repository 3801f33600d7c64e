//! Conversation messages and history.

use crate::error::RequestError;
use crate::types::content::{Content, ContentKind, ToolResultBlock, ToolUseBlock};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message: a role and a non-empty, ordered list of content blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    role: Role,
    content: Vec<Content>,
}

impl Message {
    /// Creates a message, rejecting empty content.
    pub fn new(role: Role, content: Vec<Content>) -> Result<Self, RequestError> {
        if content.is_empty() {
            return Err(RequestError::invalid_prompt(format!(
                "{} message has no content",
                role
            )));
        }
        Ok(Self { role, content })
    }

    /// A user message holding a single text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![Content::Text(text.into())],
        }
    }

    /// An assistant message holding a single text block.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: vec![Content::Text(text.into())],
        }
    }

    /// A user message answering a tool call.
    pub fn tool_result(result: ToolResultBlock) -> Self {
        Self {
            role: Role::User,
            content: vec![Content::ToolResult(result)],
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &[Content] {
        &self.content
    }

    pub fn into_content(self) -> Vec<Content> {
        self.content
    }

    pub fn last_block(&self) -> Option<&Content> {
        self.content.last()
    }

    /// Concatenation of all text blocks.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(Content::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// Tool calls requested in this message.
    pub fn tool_uses(&self) -> impl Iterator<Item = &ToolUseBlock> {
        self.content.iter().filter_map(Content::as_tool_use)
    }

    pub fn contains(&self, kind: ContentKind) -> bool {
        self.content.iter().any(|c| c.kind() == kind)
    }

    /// Media kinds present anywhere in this message.
    pub(crate) fn media_kinds(&self) -> Vec<ContentKind> {
        let mut kinds: Vec<ContentKind> =
            self.content.iter().flat_map(Content::media_kinds).collect();
        kinds.dedup();
        kinds
    }
}

/// Ordered conversation history. Grows by appending only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    /// Last content block of the last message.
    pub fn last_block(&self) -> Option<&Content> {
        self.last().and_then(Message::last_block)
    }

    /// True when the conversation is waiting for a tool result.
    pub fn awaits_tool_result(&self) -> bool {
        matches!(self.last_block(), Some(Content::ToolUse(_)))
    }

    pub fn into_vec(self) -> Vec<Message> {
        self.messages
    }
}

impl From<Vec<Message>> for History {
    fn from(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.messages.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DynamicDocument;
    use crate::error::ErrorKind;
    use crate::BedrockError;

    #[test]
    fn test_empty_message_rejected() {
        let err = Message::new(Role::User, vec![]).unwrap_err();
        assert_eq!(BedrockError::from(err).kind(), ErrorKind::InvalidPrompt);
    }

    #[test]
    fn test_message_text_joins_text_blocks() {
        let tool_use =
            ToolUseBlock::new("t1", "lookup", DynamicDocument::empty_object()).unwrap();
        let message = Message::new(
            Role::Assistant,
            vec![
                Content::text("Let me "),
                Content::text("check."),
                Content::ToolUse(tool_use),
            ],
        )
        .unwrap();
        assert_eq!(message.text(), "Let me check.");
        assert_eq!(message.tool_uses().count(), 1);
        assert!(message.contains(ContentKind::ToolUse));
    }

    #[test]
    fn test_history_awaits_tool_result() {
        let mut history = History::new();
        assert!(!history.awaits_tool_result());

        history.push(Message::user("weather?"));
        assert!(!history.awaits_tool_result());

        let tool_use =
            ToolUseBlock::new("t1", "get_weather", DynamicDocument::empty_object()).unwrap();
        history.push(Message::new(Role::Assistant, vec![tool_use.into()]).unwrap());
        assert!(history.awaits_tool_result());
        assert_eq!(history.len(), 2);
    }
}
