//! CLI command definitions using clap.
//!
//! Without a subcommand wikihop reads questions interactively. Subcommands:
//! - ask: answer a single question and exit
//! - tools: list the tools offered to the model

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Wikihop - answers questions by letting a model browse Wikipedia
#[derive(Parser, Debug)]
#[command(name = "wikihop")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer one question and exit
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },

    /// List the tools offered to the model
    Tools,
}
