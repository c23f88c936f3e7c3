//! UI Module - how the conversation is shown to the user.
//!
//! The agent reports what happens during a turn through the `Presenter`
//! trait; it never prints directly. The terminal implementation lives in
//! `terminal`, tests use a recording implementation.

pub mod terminal;

use crate::error::ChatError;
use crate::types::ToolInvocation;

pub trait Presenter {
    /// A tool directive was recognized and is about to be dispatched.
    fn tool_call(&mut self, invocation: &ToolInvocation);

    /// The tool returned; `result` is the full, untruncated text.
    fn tool_result(&mut self, tool_name: &str, result: &str);

    /// A reply from the model that is shown to the user.
    fn assistant_reply(&mut self, reply: &str);

    /// A recoverable error for this turn.
    fn error(&mut self, error: &ChatError);
}

#[cfg(test)]
pub mod recording {
    use super::*;

    /// What a presenter was asked to show, in order.
    #[derive(Debug, Clone, PartialEq)]
    pub enum Shown {
        ToolCall { name: String, arguments: String },
        ToolResult { name: String, result: String },
        Reply(String),
        Error(String),
    }

    #[derive(Default)]
    pub struct RecordingUi {
        pub shown: Vec<Shown>,
    }

    impl Presenter for RecordingUi {
        fn tool_call(&mut self, invocation: &ToolInvocation) {
            self.shown.push(Shown::ToolCall {
                name: invocation.tool_name.clone(),
                arguments: invocation.arguments_json(),
            });
        }

        fn tool_result(&mut self, tool_name: &str, result: &str) {
            self.shown.push(Shown::ToolResult {
                name: tool_name.to_string(),
                result: result.to_string(),
            });
        }

        fn assistant_reply(&mut self, reply: &str) {
            self.shown.push(Shown::Reply(reply.to_string()));
        }

        fn error(&mut self, error: &ChatError) {
            self.shown.push(Shown::Error(error.to_string()));
        }
    }
}
