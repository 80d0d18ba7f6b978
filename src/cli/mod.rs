//! CLI module for hatch-server
//!
//! Provides command-line interface parsing and handling for the hatch-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod inspect;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// hatch-server - S-HATCH site backend
///
/// Serves the FAQ chat endpoint and the contact-form email relay.
#[derive(Parser, Debug)]
#[command(
    name = "hatch-server",
    version,
    about = "hatch-server - FAQ chat and contact-form relay for the S-HATCH site",
    long_about = "Serves the site's scripted FAQ chat endpoint and relays contact-form\n\
                  submissions by email.\n\n\
                  Run without arguments to start the server, or use 'init' to scaffold a configuration.",
    after_help = "EXAMPLES:\n    \
                  hatch-server init                      # Scaffold hatch.toml and .env.example\n    \
                  hatch-server                           # Start the server (requires hatch.toml)\n    \
                  hatch-server faq ask \"How can I reach you?\"\n    \
                  hatch-server --config prod.toml config --validate"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "hatch.toml", env = "HATCH_CONFIG", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the HTTP server (default)
    Serve,

    /// Scaffold hatch.toml, .env.example and .gitignore
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files without prompting
        #[arg(short, long)]
        force: bool,

        /// Host address for the server
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port for the server
        #[arg(long, default_value = "3000")]
        port: u16,
    },

    /// Show configuration information
    Config {
        /// Show the full configuration as TOML
        #[arg(short = 'f', long)]
        full: bool,

        /// Validate the configuration file and report warnings
        #[arg(long)]
        validate: bool,
    },

    /// Inspect and try the FAQ table
    #[command(subcommand)]
    Faq(FaqCommands),
}

/// FAQ subcommands
#[derive(Subcommand, Debug)]
pub enum FaqCommands {
    /// List the effective rules in priority order
    List,

    /// Answer a question with the effective rules
    Ask {
        /// The question, as the site visitor would type it
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
