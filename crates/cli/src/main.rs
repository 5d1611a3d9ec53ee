//! Vademecum CLI — the main entry point.
//!
//! Commands:
//! - `init`   — Write a default configuration file
//! - `serve`  — Start the HTTP gateway
//! - `ask`    — Answer one question from the knowledge base
//! - `ingest` — Append text to the knowledge base
//! - `status` — Show configuration and knowledge base size

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "vademecum",
    about = "Vademecum — knowledge-grounded question answering for operational teams",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,

    /// Start the HTTP gateway server
    Serve {
        /// Override the port
        #[arg(short, long, env = "VADEMECUM_PORT")]
        port: Option<u16>,
    },

    /// Ask one question and print the answer (or the refusal)
    Ask {
        /// The question
        question: String,
    },

    /// Append text to the knowledge base
    Ingest {
        /// The text to store (omit when using --file)
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Show configuration and knowledge base size
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init => commands::init::run(config_path)?,
        Commands::Serve { port } => commands::serve::run(config_path, port).await?,
        Commands::Ask { question } => commands::ask::run(config_path, &question).await?,
        Commands::Ingest { text, file } => commands::ingest::run(config_path, text, file).await?,
        Commands::Status => commands::status::run(config_path).await?,
    }

    Ok(())
}
