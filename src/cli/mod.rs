//! CLI module for Signal
//!
//! Provides command-line interface parsing and handling for the signal-server binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;
pub mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Signal - multi-perspective news pipeline server
#[derive(Parser, Debug)]
#[command(
    name = "signal-server",
    version,
    about = "Signal - multi-perspective news pipeline server",
    long_about = "Signal runs a staged agent pipeline that turns a topic into a multi-perspective\n\
                  news report, streaming progress to clients over WebSockets.\n\n\
                  Run without arguments to start the server, or use 'init' to create a config file.",
    after_help = "EXAMPLES:\n    \
                  signal-server init                     # Write a default signal.toml\n    \
                  signal-server                          # Start the server\n    \
                  signal-server config --validate        # Check the configuration\n    \
                  signal-server run \"tech layoffs\" --depth 1"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "signal.toml", global = true)]
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
    /// Write a default signal.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Show configuration information
    Config {
        /// Validate the configuration file and referenced secrets
        #[arg(long)]
        validate: bool,
    },

    /// Run one pipeline job in the terminal without storing the report
    Run {
        /// Topic to report on
        topic: String,

        /// Report focus, e.g. "The Clash" or "The Money Trail"
        #[arg(long)]
        focus: Option<String>,

        /// Depth from 1 (quick) to 3 (deep)
        #[arg(long)]
        depth: Option<i64>,

        /// Voice of the final report, e.g. "Gen Z Mode"
        #[arg(long)]
        tone: Option<String>,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
