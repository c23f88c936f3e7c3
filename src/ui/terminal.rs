//! Plain line-oriented terminal presenter.

use std::io::Write;

use super::Presenter;
use crate::error::ChatError;
use crate::render::render;
use crate::types::ToolInvocation;

/// Writes the conversation to any `Write` sink, stdout by default.
pub struct TerminalUi<W: Write> {
    out: W,
}

impl TerminalUi<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalUi<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, text: &str) {
        let _ = writeln!(self.out, "{}", text);
        let _ = self.out.flush();
    }
}

impl<W: Write> Presenter for TerminalUi<W> {
    fn tool_call(&mut self, invocation: &ToolInvocation) {
        self.emit(&format!(
            "\n[Tool] Executing: {}({})",
            invocation.tool_name,
            invocation.arguments_json()
        ));
    }

    fn tool_result(&mut self, _tool_name: &str, result: &str) {
        self.emit("\n[Results]");
        for line in render(result) {
            self.emit(&line);
        }
    }

    fn assistant_reply(&mut self, reply: &str) {
        self.emit(&format!("\nAssistant > {}\n", reply));
    }

    fn error(&mut self, error: &ChatError) {
        self.emit(&format!("[Error: {}]\n", error));
    }
}
