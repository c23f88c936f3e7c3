//! Error types reported during a chat session.
//!
//! Every variant of [`ChatError`] is recoverable: the loop reports it
//! inline and waits for the next user input.

use thiserror::Error;

/// Errors from the chat endpoint, the tool endpoint, or the directive parser.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Connection failure or timeout.
    #[error("transport: {0}")]
    Transport(String),

    /// Endpoint answered with a non-success HTTP status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Response body did not have the expected shape.
    #[error("failed to decode response: {0}")]
    Decode(String),

    /// Chat endpoint returned zero choices.
    #[error("no completion returned by the model")]
    NoCompletion,

    /// Tool server reported an application error.
    #[error("tool error: {message}")]
    Tool { message: String },

    /// The `ARGS:` line of a directive was not a JSON object.
    #[error("invalid JSON in tool arguments: {0}")]
    ArgumentParse(String),

    /// A directive marker appeared more than once (strict mode only).
    #[error("ambiguous tool directive: {marker} appears {count} times")]
    AmbiguousDirective { marker: &'static str, count: usize },
}

impl ChatError {
    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Transport(format!("request timed out: {err}"))
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}

/// Keep error messages readable when a server returns a large body.
pub(crate) fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
