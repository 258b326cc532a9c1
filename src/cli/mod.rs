//! CLI module - Command-line interface for locallibrary
//!
//! This module provides a structured CLI using clap for argument parsing.

mod commands;

use clap::{Parser, Subcommand};

/// locallibrary - Library catalog service
/// Books, authors, genres, languages and loanable copies
#[derive(Parser)]
#[command(name = "locallibrary")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Show the catalog counts from the home page
    Stats,

    /// List every record of one kind
    #[command(alias = "ls", alias = "l")]
    List {
        /// books, authors, genres, languages or bookinstances
        kind: String,
    },

    /// Show one record with its related rows
    #[command(alias = "i")]
    Info {
        /// books, authors, genres, languages or bookinstances
        kind: String,
        /// Record ID (a UUID for book instances)
        id: String,
    },
}

pub use commands::*;
