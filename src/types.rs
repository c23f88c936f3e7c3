//! Core data types used throughout k8s-chat.
//!
//! This module defines the conversation messages, the transcript that
//! owns them, and the tool structures that flow between the chat model,
//! the directive parser and the tool server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// --- Message Roles ---

/// The role of a message in the conversation.
///
/// The chat endpoint only understands three roles. Tool output is folded
/// back into the conversation as ordinary assistant/user messages, so
/// there is no dedicated tool role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

// --- Messages ---

/// A single message in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a system message (sets the AI's behavior/instructions).
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Create an assistant message (text reply from the AI).
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

// --- Transcript ---

/// Append-only conversation history.
///
/// The first message is always the system message handed to [`Transcript::new`].
/// Messages can only be appended.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[cfg(test)]
    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }
}

// --- Tool Descriptor ---

/// Describes one tool exposed by the tool server.
///
/// Only the fields the model needs are kept; any other server-side
/// metadata in the `tools/list` response is dropped during decoding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    /// The tool's name (unique within a session)
    pub name: String,
    /// Human-readable description of what the tool does
    #[serde(default)]
    pub description: String,
    /// JSON Schema describing the tool's input parameters
    #[serde(rename = "inputSchema", default = "empty_schema")]
    pub input_schema: Value,
}

fn empty_schema() -> Value {
    Value::Object(Map::new())
}

// --- Tool Invocation ---

/// A tool call recognized in a model reply.
///
/// Lives only for the duration of one turn: built by the parser,
/// consumed by dispatch.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub arguments: Map<String, Value>,
}

impl ToolInvocation {
    /// Compact JSON rendering of the arguments, used for display.
    pub fn arguments_json(&self) -> String {
        Value::Object(self.arguments.clone()).to_string()
    }
}

// --- Chat Request / Response ---

/// A request to send to the chat endpoint.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    /// The model to use (e.g. "deepseek-r1")
    pub model: String,
    /// The full ordered conversation
    pub messages: Vec<Message>,
    /// Sampling temperature
    pub temperature: f32,
}

/// The reply from a chat completion.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    /// Text of the first completion choice
    pub content: String,
    /// Token usage, when the endpoint reports it
    pub usage: Option<TokenUsage>,
}

/// Token usage statistics from a single API call.
#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
