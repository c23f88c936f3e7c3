use anyhow::Result;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::agent::{Agent, Control};
use crate::ui::Presenter;

#[derive(Parser, Debug)]
#[command(
    name = "k8s-chat",
    version,
    about = "Chat with a Kubernetes cluster through an MCP tool server"
)]
pub struct Args {
    /// Config file (defaults to ~/.k8s-chat/config.toml when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(long, short)]
    pub verbose: bool,
}

/// Read lines until an exit keyword or end of input.
///
/// Bytes that are not valid UTF-8 are replaced rather than ending the
/// session.
pub async fn run_chat_loop<R>(
    agent: &mut Agent,
    mut input: R,
    prompt: &str,
    ui: &mut dyn Presenter,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut buf = Vec::new();
    loop {
        print!("{}", prompt);
        std::io::stdout().flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf).await? == 0 {
            println!("\nGoodbye!");
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        if agent.handle_input(&line, ui).await == Control::Exit {
            println!("Goodbye!");
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::ChatError;
    use crate::llm::LlmProvider;
    use crate::tools::ToolServer;
    use crate::types::{ChatRequest, ChatResponse, ToolDescriptor};
    use crate::ui::recording::{RecordingUi, Shown};
    use async_trait::async_trait;
    use serde_json::{Map, Value};

    struct Echo;

    #[async_trait]
    impl LlmProvider for Echo {
        async fn chat_completion(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
            let last = request.messages.last().map(|m| m.content.clone());
            Ok(ChatResponse {
                content: format!("echo: {}", last.unwrap_or_default()),
                usage: None,
            })
        }

        fn name(&self) -> &str {
            "echo"
        }
    }

    struct NoTools;

    #[async_trait]
    impl ToolServer for NoTools {
        async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ChatError> {
            Ok(vec![])
        }

        async fn call_tool(
            &self,
            _name: &str,
            _arguments: Map<String, Value>,
        ) -> Result<String, ChatError> {
            Ok(String::new())
        }
    }

    fn agent() -> Agent {
        Agent::new(
            Box::new(Echo),
            Box::new(NoTools),
            "sys".to_string(),
            &AppConfig::default(),
        )
    }

    #[tokio::test]
    async fn test_loop_stops_at_exit_keyword() {
        let mut agent = agent();
        let mut ui = RecordingUi::default();
        let input: &[u8] = b"hello\n\nexit\nnever read\n";

        run_chat_loop(&mut agent, input, "You: ", &mut ui)
            .await
            .unwrap();

        assert_eq!(ui.shown, vec![Shown::Reply("echo: hello".to_string())]);
        assert_eq!(agent.transcript().len(), 3);
    }

    #[tokio::test]
    async fn test_loop_stops_at_end_of_input() {
        let mut agent = agent();
        let mut ui = RecordingUi::default();
        let input: &[u8] = b"one\ntwo";

        run_chat_loop(&mut agent, input, "You: ", &mut ui)
            .await
            .unwrap();

        assert_eq!(ui.shown.len(), 2);
        assert_eq!(agent.transcript().len(), 5);
    }

    #[tokio::test]
    async fn test_invalid_utf8_line_does_not_end_session() {
        let mut agent = agent();
        let mut ui = RecordingUi::default();
        let input: &[u8] = b"caf\xe9\nhello\n";

        run_chat_loop(&mut agent, input, "You: ", &mut ui)
            .await
            .unwrap();

        assert_eq!(
            ui.shown,
            vec![
                Shown::Reply("echo: caf\u{FFFD}".to_string()),
                Shown::Reply("echo: hello".to_string()),
            ]
        );
        assert_eq!(agent.transcript().len(), 5);
    }

    #[tokio::test]
    async fn test_crlf_line_endings() {
        let mut agent = agent();
        let mut ui = RecordingUi::default();
        let input: &[u8] = b"hi\r\nquit\r\n";

        run_chat_loop(&mut agent, input, "You: ", &mut ui)
            .await
            .unwrap();

        assert_eq!(ui.shown, vec![Shown::Reply("echo: hi".to_string())]);
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["k8s-chat", "--config", "/tmp/c.toml", "-v"]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
        assert!(args.verbose);
    }
}
