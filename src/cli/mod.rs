//! CLI module for the team auth API
//!
//! - `serve`: run the HTTP server (default)
//! - `migrate`: apply or revert PostgreSQL schema migrations

pub mod migrate;
pub mod serve;

use clap::{Parser, Subcommand};

/// Team registry API with JWT sessions
#[derive(Parser)]
#[command(name = "team-auth-api")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve,

    /// Apply pending schema migrations
    Migrate(migrate::MigrateArgs),
}
