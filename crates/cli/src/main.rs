//! PromptLoom CLI — the main entry point.
//!
//! Commands:
//! - `format` — Render a transcript as a formatted history block
//! - `last`   — Show the newest turn for a speaker
//! - `expand` — Expand {{...}} macros in a template
//! - `init`   — Write a starter config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "promptloom",
    about = "PromptLoom — conversation history formatting for prompt injection",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file path (defaults to ./promptloom.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a transcript as a formatted history block
    Format {
        /// Transcript file (Conversation JSON; plain text with --plain)
        transcript: PathBuf,

        /// Output style: plain, numbered, quoted or bracketed
        #[arg(short, long, default_value = "plain")]
        style: String,

        /// Only render the last N raw turns (bypasses filtering)
        #[arg(short, long)]
        last: Option<usize>,

        /// Parse the transcript as `Name: text` plain text
        #[arg(long)]
        plain: bool,
    },

    /// Show the newest turn for a speaker
    Last {
        /// Which speaker: user or other
        speaker: String,

        /// Transcript file
        transcript: PathBuf,

        /// Render through the formatter instead of printing raw text
        #[arg(short, long)]
        formatted: bool,

        /// Parse the transcript as `Name: text` plain text
        #[arg(long)]
        plain: bool,
    },

    /// Expand {{...}} macros in a template against a transcript
    Expand {
        /// Template file containing {{history}}-style placeholders
        template: PathBuf,

        /// Transcript file
        transcript: PathBuf,

        /// Parse the transcript as `Name: text` plain text
        #[arg(long)]
        plain: bool,
    },

    /// Write a starter promptloom.toml
    Init {
        /// Destination path
        #[arg(default_value = "promptloom.toml")]
        path: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Format {
            transcript,
            style,
            last,
            plain,
        } => commands::format::run(&transcript, &style, last, plain, cli.config.as_deref())?,
        Commands::Last {
            speaker,
            transcript,
            formatted,
            plain,
        } => commands::last::run(
            &speaker,
            &transcript,
            formatted,
            plain,
            cli.config.as_deref(),
        )?,
        Commands::Expand {
            template,
            transcript,
            plain,
        } => commands::expand::run(&template, &transcript, plain, cli.config.as_deref())?,
        Commands::Init { path } => commands::init::run(&path)?,
    }

    Ok(())
}
