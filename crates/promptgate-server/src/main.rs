//! PromptGate: entry point.
//!
//! # Commands
//!
//! - `promptgate serve [--host H] [--port P]`: run the HTTP gateway
//! - `promptgate ask <PROMPT> [-m MODEL]`: one-shot request from the terminal
//! - `promptgate models`: list the model registry
//! - `promptgate status`: show configuration and upstream status
//! - `promptgate init`: write a default config file

mod envelope;
mod gateway;
mod helpers;
mod init;
mod routes;
mod server;
mod status;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use promptgate_core::config::load_config;

use crate::gateway::{Gateway, PromptInput};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// PromptGate: multi-model AI text gateway
#[derive(Parser)]
#[command(name = "promptgate", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Listen port (overrides config and PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,

        /// Emit logs as JSON lines
        #[arg(long, default_value_t = false)]
        json_logs: bool,
    },

    /// Send one prompt and print the answer
    Ask {
        /// Prompt text
        prompt: String,

        /// Model id (see `promptgate models`)
        #[arg(short, long)]
        model: Option<String>,

        /// Sampling temperature forwarded upstream
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Token limit forwarded upstream
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Truncate the answer to this many characters
        #[arg(long)]
        max_chars: Option<usize>,

        /// Print the answer in numbered chunks of this many characters
        #[arg(long)]
        chunk: Option<usize>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// List available models
    Models,

    /// Show configuration and upstream status
    Status,

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            host,
            port,
            logs,
            json_logs,
        } => {
            init_logging(logs, json_logs, "info");
            run_serve(host, port).await
        }
        Commands::Ask {
            prompt,
            model,
            temperature,
            max_tokens,
            max_chars,
            chunk,
            logs,
        } => {
            init_logging(logs, false, "warn");
            let input = PromptInput {
                prompt: Some(prompt),
                model,
                temperature,
                max_tokens,
            };
            run_ask(input, max_chars, chunk).await
        }
        Commands::Models => {
            helpers::print_models(&promptgate_providers::ModelRegistry::builtin());
            Ok(())
        }
        Commands::Status => status::run(),
        Commands::Init { force } => init::run(force),
    }
}

// ─────────────────────────────────────────────
// Commands
// ─────────────────────────────────────────────

async fn run_serve(host: Option<String>, port: Option<u16>) -> Result<()> {
    let mut config = load_config(None);
    if let Some(host) = host {
        config.server.host = host;
    }
    if let Some(port) = port {
        config.server.port = port;
    }

    helpers::print_banner(&config);
    info!(
        host = %config.server.host,
        port = config.server.port,
        budget_secs = config.dispatch.request_timeout_secs,
        "Starting server"
    );
    server::run(&config).await
}

async fn run_ask(input: PromptInput, max_chars: Option<usize>, chunk: Option<usize>) -> Result<()> {
    let config = load_config(None);
    let gateway = Gateway::from_config(&config).context("failed to build provider adapters")?;

    let result = gateway.ask(input).await.context("request failed")?;
    helpers::print_response(&result, max_chars, chunk);
    Ok(())
}

/// Initialize tracing/logging.
///
/// `--logs` forces debug output for our crates; otherwise `RUST_LOG` wins,
/// falling back to `quiet`.
fn init_logging(verbose: bool, json: bool, quiet: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("promptgate=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(quiet))
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.compact().init();
    }
}
