//! Chat endpoint client.
//!
//! The `LlmProvider` trait is the seam between the conversation loop and
//! the chat-completion API. The loop only ever needs one operation: send
//! the full transcript, get back the first choice's text.

pub mod openai_compatible;

use async_trait::async_trait;

use crate::error::ChatError;
use crate::types::{ChatRequest, ChatResponse};

/// Trait that all chat providers must implement.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request and wait for the full response.
    ///
    /// A single attempt is made; failures are surfaced immediately.
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError>;

    /// Return the provider's display name (for logging).
    fn name(&self) -> &str;
}
