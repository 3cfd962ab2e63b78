//! Command line interface
//!
//! - `serve`: run the HTTP server (default)
//! - `migrate`: create or update the PostgreSQL schema and exit

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// RePaired - marketplace for spare earbud and charging-case parts
#[derive(Parser)]
#[command(name = "repaired")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Apply pending database migrations and exit
    Migrate,
}
