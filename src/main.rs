//! LLM Decision Core - Main Entry Point
//!
//! Runs one evaluation cycle: assembles the market context (when a feed is
//! configured), then parses and validates a model response and prints the
//! resulting decision batch as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use llm_decision_core::config::load_config;
use llm_decision_core::context::{AssemblerSettings, ContextAssembler, EvaluationContext};
use llm_decision_core::{parse_response_or_wait, CycleInput, FeedRestClient};

/// CLI arguments for the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Log level (trace, debug, info, warn, error); overrides the config
    #[arg(long)]
    log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Path to the cycle input JSON (account, positions, candidates)
    #[arg(long)]
    cycle: String,

    /// Path to the model response text, or "-" for stdin
    #[arg(long, default_value = "-")]
    response: String,
}

fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

fn read_response(path: &str) -> Result<String> {
    if path == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read response from stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read response {}", path))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Load environment variables from .env file if present
    dotenvy::dotenv().ok();

    let config = load_config(Some(args.config.as_str()))?;

    let level = parse_level(args.log_level.as_deref().unwrap_or(&config.settings.log_level));
    let builder = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);
    if args.json_logs {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }

    info!("Configuration file: {}", args.config);

    let cycle_json = std::fs::read_to_string(&args.cycle)
        .with_context(|| format!("failed to read cycle input {}", args.cycle))?;
    let mut input: CycleInput =
        serde_json::from_str(&cycle_json).context("invalid cycle input")?;
    input.leverage = config.risk.leverage_ceilings();

    let context = match FeedRestClient::from_config(&config.feed)? {
        Some(client) => {
            info!("Assembling context from {}", client.base_url());
            let assembler = ContextAssembler::new(
                client.clone(),
                client,
                AssemblerSettings::from(&config.feed),
            );
            assembler.assemble(input).await
        }
        None => EvaluationContext::from_input(input),
    };

    let response = read_response(&args.response)?;
    let limits = context.validation_limits(&config.risk);
    let batch = parse_response_or_wait(&response, &limits);

    info!(
        cycle = context.call_count,
        decisions = batch.decisions.len(),
        "cycle complete"
    );
    println!("{}", serde_json::to_string_pretty(&batch)?);

    Ok(())
}
