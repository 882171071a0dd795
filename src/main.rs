use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::{info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use cli::output::WordStreamer;
use config::Config;
use wikihop::WikihopError;
use wikihop::agent::{Agent, answer_tool_definition, save_transcript};
use wikihop::llm::{GatewayClient, InferenceClient};
use wikihop::tools::ToolRegistry;

fn setup_logging(level: Option<&str>) -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join(format!("{}.log", env!("CARGO_PKG_NAME")));

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    // RUST_LOG wins over the configured level
    let default_filter = level.unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    let registry = ToolRegistry::wikipedia(config.wikipedia_config()).context("Failed to create Wikipedia tools")?;
    let gateway = GatewayClient::new(config.gateway_config()).context("Failed to create gateway client")?;
    let agent = Agent::with_config(Arc::new(gateway), registry, config.agent_config());

    if cli.is_verbose() {
        println!(
            "{} {} ({}), at most {} inferences per question",
            "Gateway:".yellow(),
            config.gateway.url,
            config.gateway.function_name,
            agent.config().max_inferences
        );
    }

    match &cli.command {
        None => {
            let stdin = BufReader::new(tokio::io::stdin());
            run_repl(&agent, config, stdin).await
        }
        Some(Commands::Ask { question }) => ask(&agent, config, &question.join(" ")).await,
        Some(Commands::Tools) => list_tools(agent.registry()),
    }
}

fn list_tools(registry: &ToolRegistry) -> Result<()> {
    let mut definitions = registry.definitions();
    definitions.push(answer_tool_definition());

    for definition in definitions {
        println!("{}", definition.name.cyan().bold());
        println!("  {}", definition.description);
        let parameters =
            serde_json::to_string_pretty(&definition.parameters).context("Failed to render tool parameters")?;
        for line in parameters.lines() {
            println!("  {}", line.dimmed());
        }
    }
    Ok(())
}

/// What one line of interactive input asks for
#[derive(Debug, PartialEq, Eq)]
enum ReplInput<'a> {
    Skip,
    Quit,
    Question(&'a str),
}

fn classify_input(line: &str) -> ReplInput<'_> {
    match line.trim() {
        "" => ReplInput::Skip,
        "exit" | "quit" => ReplInput::Quit,
        question => ReplInput::Question(question),
    }
}

async fn run_repl<C, R>(agent: &Agent<C>, config: &Config, input: R) -> Result<()>
where
    C: InferenceClient,
    R: AsyncBufRead + Unpin,
{
    info!("Entering interactive mode");
    let mut lines = input.lines();

    loop {
        print!("{} ", "Your question:".cyan().bold());
        io::stdout().flush()?;

        let Some(line) = lines.next_line().await.context("Failed to read question")? else {
            println!();
            break;
        };

        match classify_input(&line) {
            ReplInput::Skip => continue,
            ReplInput::Quit => break,
            ReplInput::Question(question) => {
                // The session survives a failed episode
                if let Err(e) = ask(agent, config, question).await {
                    println!("{} {:#}", "Error:".red().bold(), e);
                }
            }
        }
    }

    info!("Leaving interactive mode");
    Ok(())
}

async fn ask<C: InferenceClient>(agent: &Agent<C>, config: &Config, question: &str) -> Result<()> {
    let report = match agent.run_episode(question).await {
        Ok(report) => report,
        Err(e @ WikihopError::BoundedLoopExceeded { .. }) => {
            warn!("{}", e);
            println!("{} {}", "No answer:".yellow().bold(), e);
            return Ok(());
        }
        Err(e) => return Err(e).context("Episode failed"),
    };

    if config.debug.save_transcripts {
        if let Err(e) = save_transcript(&config.debug.transcript_dir, &report) {
            warn!("Failed to save transcript: {}", e);
        }
    }

    let streamer = WordStreamer::new(Duration::from_millis(config.output.stream_delay_ms), config.output.color);
    streamer.stream(&mut io::stdout(), &report.answer).await?;

    info!(
        "Answered in {} inferences using {} tokens",
        report.inferences,
        report.usage.total()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    // Setup logging once the configured level is known
    setup_logging(config.log_level.as_deref()).context("Failed to setup logging")?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, json};
    use wikihop::llm::{ContentBlock, InferenceResponse, MockInferenceClient, ToolCall, ToolInvocation};
    use wikihop::wiki::MemorySource;

    fn answer(id: &str, text: &str) -> InferenceResponse {
        let arguments: Map<String, serde_json::Value> =
            json!({ "answer": text }).as_object().cloned().unwrap();
        InferenceResponse::new(
            "ep-1",
            vec![ContentBlock::ToolCall(ToolInvocation::WellFormed(ToolCall::new(
                id,
                "answer_question",
                arguments,
            )))],
        )
    }

    fn quiet_config() -> Config {
        let mut config = Config::default();
        config.output.stream_delay_ms = 0;
        config.output.color = false;
        config
    }

    #[test]
    fn test_classify_input() {
        assert_eq!(classify_input(""), ReplInput::Skip);
        assert_eq!(classify_input("   "), ReplInput::Skip);
        assert_eq!(classify_input("quit"), ReplInput::Quit);
        assert_eq!(classify_input(" exit "), ReplInput::Quit);
        assert_eq!(
            classify_input("  Where was Marie Curie born? "),
            ReplInput::Question("Where was Marie Curie born?")
        );
    }

    #[tokio::test]
    async fn test_repl_skips_blank_lines_and_stops_at_quit() {
        let client = Arc::new(MockInferenceClient::new(vec![answer("a1", "Warsaw")]));
        let agent = Agent::new(client.clone(), ToolRegistry::standard(Arc::new(MemorySource::new())));
        let input: &[u8] = b"\n   \nWhere was Marie Curie born?\nquit\nnever asked\n";

        run_repl(&agent, &quiet_config(), input).await.unwrap();

        assert_eq!(client.call_count(), 1);
        assert_eq!(
            client.requests()[0].messages,
            vec![wikihop::llm::Turn::user("Where was Marie Curie born?")]
        );
    }

    #[tokio::test]
    async fn test_repl_ends_at_eof_and_survives_failed_episodes() {
        // No scripted responses: every episode fails
        let client = Arc::new(MockInferenceClient::new(Vec::new()));
        let agent = Agent::new(client.clone(), ToolRegistry::standard(Arc::new(MemorySource::new())));
        let input: &[u8] = b"first\nsecond";

        run_repl(&agent, &quiet_config(), input).await.unwrap();

        assert_eq!(client.call_count(), 2);
    }
}
