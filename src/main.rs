mod agent;
mod cli;
mod config;
mod error;
mod llm;
mod parser;
mod render;
mod sidecar;
mod tools;
mod types;
mod ui;

#[cfg(test)]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use agent::Agent;
use cli::Args;
use config::AppConfig;
use llm::openai_compatible::OpenAiCompatibleProvider;
use sidecar::{HttpProbe, LaunchSpec, Sidecar};
use tools::rpc::HttpToolServer;
use tools::{load_directory, ToolDirectory};
use ui::terminal::TerminalUi;

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn print_banner(directory: &ToolDirectory, config: &AppConfig) {
    println!("\n{}", "=".repeat(60));
    println!("  K8s Chat ({} + MCP tool server)", config.chat.model);
    println!("{}", "=".repeat(60));
    println!("[Tools] Loaded {} tools: {}", directory.len(), directory.names().join(", "));
    println!("\nExamples:");
    println!("  - List all pods in the gsoc namespace");
    println!("  - Show me the API resources");
    println!("  - Describe the xyz pod in gsoc namespace");
    println!("  - What deployments are running?");
    println!(
        "\nType {} to end the conversation\n",
        config.session.exit_keywords.join(" or ")
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = AppConfig::load(args.config.as_deref())?;
    info!(model = %config.chat.model, server = %config.server.url, "configuration loaded");
    let api_key = config.api_key()?;

    println!("[Server] Checking tool server at {} ...", config.server.url);
    let sidecar = Sidecar::ensure_running(
        &HttpProbe::new(&config.server),
        &LaunchSpec::from(&config.server),
    )
    .await
    .context("Tool server is not running and could not be started")?;
    if sidecar.is_managed() {
        println!("[Server] Started {}", config.server.command);
    }

    let server = HttpToolServer::new(&config.server);
    let directory = match load_directory(&server, &config.server.url).await {
        Ok(directory) => directory,
        Err(e) => {
            sidecar.shutdown().await;
            return Err(e);
        }
    };

    let provider = OpenAiCompatibleProvider::new(
        api_key,
        config.chat.api_base.clone(),
        Duration::from_secs(config.chat.timeout_secs),
    );
    let system_prompt = directory.system_prompt(&config.session.system_prompt);
    let mut agent = Agent::new(Box::new(provider), Box::new(server), system_prompt, &config);

    print_banner(&directory, &config);

    let stdin = tokio::io::BufReader::new(tokio::io::stdin());
    let mut ui = TerminalUi::stdout();
    let result = cli::run_chat_loop(&mut agent, stdin, &config.session.prompt, &mut ui).await;

    sidecar.shutdown().await;
    result
}
