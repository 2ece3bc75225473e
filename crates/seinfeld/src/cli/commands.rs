//! CLI argument definitions.

use clap::Parser;
use std::path::PathBuf;

/// Generate a Seinfeld episode script with a retrieval-augmented stage pipeline
#[derive(Parser, Debug)]
#[command(name = "seinfeld")]
#[command(about = "Generate a Seinfeld episode script using AI writing stages", long_about = None)]
#[command(version)]
#[command(after_help = "Examples:
  seinfeld \"Jerry's new girlfriend only speaks in movie quotes\"
  seinfeld \"George discovers he's been pronouncing his own name wrong\"
  seinfeld \"Kramer starts a business selling air from different neighborhoods\"
  seinfeld --interactive")]
pub struct Cli {
    /// The theme for the Seinfeld episode
    pub theme: Option<String>,

    /// Prompt for the theme interactively
    #[arg(short, long)]
    pub interactive: bool,

    /// Output file path (defaults to the plan's destination, then output/seinfeld_script.md)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Use illustrative sample dialogue instead of the dialogue index
    #[arg(long)]
    pub demo: bool,

    /// Stage plan TOML file (defaults to the bundled five-stage plan)
    #[arg(long)]
    pub plan: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,
}

impl Cli {
    /// Whether the theme has to be read from stdin.
    pub fn needs_prompt(&self) -> bool {
        self.interactive || self.theme.as_deref().is_none_or(|t| t.trim().is_empty())
    }
}
