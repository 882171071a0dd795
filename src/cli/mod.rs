//! CLI module for wikihop - command-line interface and terminal output.
//!
//! Provides the argument parser and the word-by-word answer printer.

pub mod commands;
pub mod output;

pub use commands::Cli;
