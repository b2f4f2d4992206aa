//! NoHandCoder CLI — the main entry point.
//!
//! Commands:
//! - `chat`     — Interactive conversation with the coding assistant
//! - `ask`      — Single-turn mode
//! - `read`, `search`, `analyze`, `exec` — Run a workspace tool directly
//! - `config`   — Create or inspect the configuration file

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(
    name = "nohandcoder",
    about = "NoHandCoder — a conversational coding assistant for your workspace",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Workspace root the tools operate in (default: config, then current directory)
    #[arg(short, long, global = true, env = "NOHANDCODER_WORKSPACE")]
    workspace: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant interactively
    Chat,

    /// Send a single message and print the answer
    Ask {
        /// The message to send
        #[arg(required = true, trailing_var_arg = true)]
        message: Vec<String>,
    },

    /// Print a file from the workspace
    Read {
        /// Path relative to the workspace root
        file: String,
    },

    /// Search for text in files matching a glob
    Search {
        /// Glob pattern, e.g. '**/*.rs' (empty string matches every file)
        pattern: String,
        /// Literal text to look for
        text: String,
    },

    /// Summarize the workspace tree
    Analyze,

    /// Run a shell command in the workspace root
    Exec {
        /// The command line, passed to the system shell
        #[arg(required = true, trailing_var_arg = true)]
        command: Vec<String>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration (API key redacted)
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout carries answers and tool output
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let workspace = cli.workspace;
    match cli.command {
        Commands::Chat => commands::chat::run(workspace).await?,
        Commands::Ask { message } => commands::ask::run(workspace, message.join(" ")).await?,
        Commands::Read { file } => commands::tools::read(workspace, &file).await?,
        Commands::Search { pattern, text } => {
            commands::tools::search(workspace, &pattern, &text).await?
        }
        Commands::Analyze => commands::tools::analyze(workspace).await?,
        Commands::Exec { command } => commands::tools::exec(workspace, &command.join(" ")).await?,
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => commands::config_cmd::init(force).await?,
            ConfigAction::Show => commands::config_cmd::show(workspace).await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
