//! OpenAI-compatible chat provider implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;

use super::LlmProvider;
use crate::error::{snippet, ChatError};
use crate::types::{ChatRequest, ChatResponse, Message, TokenUsage};

pub struct OpenAiCompatibleProvider {
    api_key: String,
    api_base: String,
    timeout: Duration,
    client: reqwest::Client,
}

// --- API Request Types (OpenAI format) ---

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

// --- API Response Types ---

#[derive(Deserialize, Debug)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

#[derive(Deserialize, Debug)]
struct ApiChoice {
    message: ApiResponseMessage,
}

#[derive(Deserialize, Debug)]
struct ApiResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiUsage {
    prompt_tokens: Option<u64>,
    completion_tokens: Option<u64>,
}

// --- Implementation ---

impl OpenAiCompatibleProvider {
    pub fn new(api_key: String, api_base: impl Into<String>, timeout: Duration) -> Self {
        Self {
            api_key,
            api_base: api_base.into(),
            timeout,
            client: reqwest::Client::new(),
        }
    }

    fn parse_response(&self, body: &str) -> Result<ChatResponse, ChatError> {
        let api_response: ApiResponse = serde_json::from_str(body).map_err(|e| {
            ChatError::Decode(format!("{} (body: {})", e, snippet(body)))
        })?;

        let choice = api_response
            .choices
            .into_iter()
            .next()
            .ok_or(ChatError::NoCompletion)?;

        let content = choice.message.content.unwrap_or_default();
        let usage = api_response.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens.unwrap_or(0),
            output_tokens: u.completion_tokens.unwrap_or(0),
        });

        Ok(ChatResponse { content, usage })
    }
}

#[async_trait]
impl LlmProvider for OpenAiCompatibleProvider {
    async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let api_request = ApiRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
        };
        let url = format!("{}/chat/completions", self.api_base.trim_end_matches('/'));
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&api_request)
            .send()
            .await
            .map_err(ChatError::from_reqwest)?;

        let status = response.status();
        let body = response.text().await.map_err(ChatError::from_reqwest)?;
        debug!(
            status = status.as_u16(),
            messages = request.messages.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "chat completion returned"
        );

        if !status.is_success() {
            return Err(ChatError::Http {
                status: status.as_u16(),
                body: snippet(&body),
            });
        }

        let parsed = self.parse_response(&body)?;
        if let Some(usage) = &parsed.usage {
            debug!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "token usage"
            );
        }
        Ok(parsed)
    }

    fn name(&self) -> &str {
        "OpenAI-Compatible"
    }
}
