//! Conversation types shared between the engine and its callers

use crate::errors::InvalidArgument;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One user message paired with the assistant reply it produced.
///
/// Both sides are non-empty. Fields are private so a stored exchange cannot be
/// edited after the fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Exchange {
    user: String,
    assistant: String,
}

impl Exchange {
    /// Create a new exchange, rejecting empty text on either side.
    ///
    /// The user side is checked first.
    pub fn new(
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Result<Self, InvalidArgument> {
        let user = user.into();
        if user.is_empty() {
            return Err(InvalidArgument::UserContent);
        }

        let assistant = assistant.into();
        if assistant.is_empty() {
            return Err(InvalidArgument::AssistantContent);
        }

        Ok(Self { user, assistant })
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn assistant(&self) -> &str {
        &self.assistant
    }
}

/// Message in a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Role of the message sender (system, user, assistant)
    pub role: MessageRole,

    /// Content of the message
    pub content: String,
}

impl Message {
    /// Create a new user message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// Create a new assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    /// Create a new system message
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

/// Role of a message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt
    System,

    /// User message
    User,

    /// Assistant message
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::System => write!(f, "system"),
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_creation() {
        let exchange = Exchange::new("Hello", "What's up!").unwrap();
        assert_eq!(exchange.user(), "Hello");
        assert_eq!(exchange.assistant(), "What's up!");
    }

    #[test]
    fn test_exchange_rejects_empty_sides() {
        assert_eq!(Exchange::new("", "a"), Err(InvalidArgument::UserContent));
        assert_eq!(
            Exchange::new("a", ""),
            Err(InvalidArgument::AssistantContent)
        );
        // User side wins when both are empty
        assert_eq!(Exchange::new("", ""), Err(InvalidArgument::UserContent));
    }

    #[test]
    fn test_message_creation() {
        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, MessageRole::User);
        assert_eq!(user_msg.content, "Hello");

        let assistant_msg = Message::assistant("Hi there");
        assert_eq!(assistant_msg.role, MessageRole::Assistant);

        let system_msg = Message::system("You are a helpful assistant");
        assert_eq!(system_msg.role, MessageRole::System);
    }

    #[test]
    fn test_message_wire_shape() {
        let json = serde_json::to_value(Message::system("be brief")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"role": "system", "content": "be brief"})
        );
    }

    #[test]
    fn test_role_display_matches_serde() {
        for role in [MessageRole::System, MessageRole::User, MessageRole::Assistant] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(json, format!("\"{}\"", role));
        }
    }
}
