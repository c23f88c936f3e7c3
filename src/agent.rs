//! Agent Loop - the conversation state machine.
//!
//! The Agent owns the transcript and drives one turn per user input:
//!
//! ```text
//! AwaitingUserInput
//!     |
//!     v
//! ModelGenerating --(plain reply)--> RenderingReply -------------+
//!     |                                                         |
//!     +--(TOOL:/ARGS: directive)--> DispatchingTool             |
//!                                       |                       |
//!                                       v                       |
//!                              InterpretingToolResult           |
//!                                       |                       |
//!                                       v                       v
//!                                   AwaitingUserInput <---------+
//! ```
//!
//! Every failure is reported through the presenter and ends the turn.
//! Committed messages are never removed; a failed model call simply
//! appends nothing.

use tracing::debug;

use crate::config::AppConfig;
use crate::error::ChatError;
use crate::llm::LlmProvider;
use crate::parser::{parse_directive, DirectivePolicy};
use crate::render::truncate_chars;
use crate::tools::ToolServer;
use crate::types::{ChatRequest, ToolInvocation, Transcript};
use crate::ui::Presenter;

/// Fixed follow-up asking the model to explain a tool result.
pub const INTERPRET_PROMPT: &str = "Please summarize what we found in a natural way.";

/// What the caller should do after a line of input was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

/// Where a turn currently is.
#[derive(Debug)]
enum State {
    AwaitingUserInput,
    ModelGenerating,
    RenderingReply(String),
    DispatchingTool(ToolInvocation),
    InterpretingToolResult,
}

/// The Agent holds all components and manages the conversation.
pub struct Agent {
    llm: Box<dyn LlmProvider>,
    tools: Box<dyn ToolServer>,
    transcript: Transcript,
    model: String,
    temperature: f32,
    exit_keywords: Vec<String>,
    context_result_chars: usize,
    policy: DirectivePolicy,
}

impl Agent {
    /// Create a new Agent seeded with `system_prompt`.
    pub fn new(
        llm: Box<dyn LlmProvider>,
        tools: Box<dyn ToolServer>,
        system_prompt: String,
        config: &AppConfig,
    ) -> Self {
        Self {
            llm,
            tools,
            transcript: Transcript::new(system_prompt),
            model: config.chat.model.clone(),
            temperature: config.chat.temperature,
            exit_keywords: config.session.exit_keywords.clone(),
            context_result_chars: config.session.context_result_chars,
            policy: DirectivePolicy::from_strict(config.session.strict_directives),
        }
    }

    /// Handle one line of user input.
    ///
    /// Empty lines are ignored, exit keywords end the session without
    /// touching the model. Anything else runs a full turn.
    pub async fn handle_input(&mut self, line: &str, ui: &mut dyn Presenter) -> Control {
        let input = line.trim();
        if input.is_empty() {
            return Control::Continue;
        }
        if self.exit_keywords.iter().any(|k| k == input) {
            return Control::Exit;
        }

        self.transcript.push_user(input);
        self.run_turn(ui).await;
        Control::Continue
    }

    async fn run_turn(&mut self, ui: &mut dyn Presenter) {
        let mut state = State::ModelGenerating;
        loop {
            debug!(?state, transcript_len = self.transcript.len(), "turn state");
            state = match state {
                State::AwaitingUserInput => return,
                State::ModelGenerating => match self.complete().await {
                    Ok(reply) => match parse_directive(&reply, self.policy) {
                        Ok(Some(invocation)) => State::DispatchingTool(invocation),
                        Ok(None) => State::RenderingReply(reply),
                        Err(e) => self.fail(ui, e),
                    },
                    Err(e) => self.fail(ui, e),
                },
                State::RenderingReply(reply) => {
                    self.transcript.push_assistant(reply.as_str());
                    ui.assistant_reply(&reply);
                    State::AwaitingUserInput
                }
                State::DispatchingTool(invocation) => {
                    ui.tool_call(&invocation);
                    match self.dispatch(&invocation).await {
                        Ok(result) => {
                            ui.tool_result(&invocation.tool_name, &result);
                            self.record_tool_result(&invocation.tool_name, &result);
                            State::InterpretingToolResult
                        }
                        Err(e) => self.fail(ui, e),
                    }
                }
                State::InterpretingToolResult => match self.complete().await {
                    Ok(reply) => State::RenderingReply(reply),
                    Err(e) => self.fail(ui, e),
                },
            };
        }
    }

    fn fail(&self, ui: &mut dyn Presenter, error: ChatError) -> State {
        debug!(%error, "turn ended with error");
        ui.error(&error);
        State::AwaitingUserInput
    }

    async fn complete(&self) -> Result<String, ChatError> {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: self.transcript.messages().to_vec(),
            temperature: self.temperature,
        };
        let response = self.llm.chat_completion(&request).await?;
        Ok(response.content)
    }

    async fn dispatch(&self, invocation: &ToolInvocation) -> Result<String, ChatError> {
        debug!(
            tool = %invocation.tool_name,
            provider = self.llm.name(),
            "dispatching tool call"
        );
        self.tools
            .call_tool(&invocation.tool_name, invocation.arguments.clone())
            .await
    }

    /// Fold a tool result into the transcript, bounded in length, and ask
    /// the model to interpret it.
    fn record_tool_result(&mut self, tool_name: &str, result: &str) {
        let truncated = truncate_chars(result, self.context_result_chars);
        self.transcript.push_assistant(format!(
            "Tool {} executed successfully. Result: {}",
            tool_name, truncated
        ));
        self.transcript.push_user(INTERPRET_PROMPT);
    }

    /// Get a reference to the conversation history.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }
}
