//! Request bodies for the OpenAI-compatible chat completions endpoint.

use murmur_core::{Message, MessageRole};
use serde::Serialize;

/// Path of the chat completions endpoint, relative to the server base URL.
pub const COMPLETIONS_PATH: &str = "/v1/chat/completions";

/// Path of the health endpoint.
pub const HEALTH_PATH: &str = "/health";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireMessage {
    pub role: &'static str,
    pub content: String,
}

impl WireMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system",
            content: content.to_string(),
        }
    }

    fn user(content: String) -> Self {
        Self {
            role: MessageRole::User.as_str(),
            content,
        }
    }
}

impl From<&Message> for WireMessage {
    fn from(message: &Message) -> Self {
        Self {
            role: message.role.as_str(),
            content: message.content.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatCompletionRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

/// Streamed reply: the instructions, then the conversation as is.
pub fn reply_request(
    model: Option<&str>,
    instructions: &str,
    context: &[Message],
) -> ChatCompletionRequest {
    let mut messages = Vec::with_capacity(context.len() + 1);
    messages.push(WireMessage::system(instructions));
    messages.extend(context.iter().map(WireMessage::from));

    ChatCompletionRequest {
        model: model.map(str::to_string),
        messages,
        stream: true,
        max_tokens: None,
    }
}

/// Streamed summary: the instructions, then the conversation flattened into
/// a single transcript.
pub fn summary_request(
    model: Option<&str>,
    instructions: &str,
    context: &[Message],
) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.map(str::to_string),
        messages: vec![
            WireMessage::system(instructions),
            WireMessage::user(transcript(context)),
        ],
        stream: true,
        max_tokens: None,
    }
}

/// One-token request used to get the model loaded.
pub fn prewarm_request(model: Option<&str>, instructions: &str) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.map(str::to_string),
        messages: vec![WireMessage::system(instructions)],
        stream: false,
        max_tokens: Some(1),
    }
}

/// Render messages as `role: content` lines.
pub fn transcript(context: &[Message]) -> String {
    context
        .iter()
        .map(|m| format!("{}: {}", m.role, m.content))
        .collect::<Vec<_>>()
        .join("\n")
}
