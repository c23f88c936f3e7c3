//! Tool directive parsing.
//!
//! The chat endpoint has no structured function-calling channel, so the
//! model is asked to answer with two marker lines when it wants a tool:
//!
//! ```text
//! TOOL: listResources
//! ARGS: {"Kind": "Pod"}
//! ```
//!
//! Anything else is a plain conversational reply.

use serde_json::{Map, Value};

use crate::error::ChatError;
use crate::types::ToolInvocation;

const TOOL_MARKER: &str = "TOOL:";
const ARGS_MARKER: &str = "ARGS:";

/// How repeated marker lines are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DirectivePolicy {
    /// The last `TOOL:` and the last `ARGS:` line win.
    #[default]
    LastWins,
    /// A repeated marker is an `AmbiguousDirective` error.
    RejectDuplicates,
}

impl DirectivePolicy {
    pub fn from_strict(strict: bool) -> Self {
        if strict {
            DirectivePolicy::RejectDuplicates
        } else {
            DirectivePolicy::LastWins
        }
    }
}

#[derive(Default)]
struct Capture<'a> {
    value: Option<&'a str>,
    count: usize,
}

impl<'a> Capture<'a> {
    fn record(&mut self, value: &'a str) {
        self.value = Some(value);
        self.count += 1;
    }

    fn non_empty(&self) -> Option<&'a str> {
        self.value.filter(|v| !v.is_empty())
    }
}

/// Scan a model reply for a tool directive.
///
/// Returns `Ok(None)` when either marker is missing or has an empty value.
/// When both are present the `ARGS:` value must decode to a JSON object.
pub fn parse_directive(
    reply: &str,
    policy: DirectivePolicy,
) -> Result<Option<ToolInvocation>, ChatError> {
    let mut tool = Capture::default();
    let mut args = Capture::default();

    for line in reply.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix(TOOL_MARKER) {
            tool.record(rest.trim());
        } else if let Some(rest) = line.strip_prefix(ARGS_MARKER) {
            args.record(rest.trim());
        }
    }

    // Repeats count even when the last occurrence is empty.
    if policy == DirectivePolicy::RejectDuplicates {
        for (marker, capture) in [(TOOL_MARKER, &tool), (ARGS_MARKER, &args)] {
            if capture.count > 1 {
                return Err(ChatError::AmbiguousDirective {
                    marker,
                    count: capture.count,
                });
            }
        }
    }

    let (Some(tool_name), Some(raw_args)) = (tool.non_empty(), args.non_empty()) else {
        return Ok(None);
    };

    let arguments: Map<String, Value> = serde_json::from_str(raw_args)
        .map_err(|e| ChatError::ArgumentParse(e.to_string()))?;

    Ok(Some(ToolInvocation {
        tool_name: tool_name.to_string(),
        arguments,
    }))
}
