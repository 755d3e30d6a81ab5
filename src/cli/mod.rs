//! CLI module for the Forms Gateway
//!
//! - `serve`: run the REST API
//! - `keygen`: print freshly generated API key secrets

pub mod keygen;
pub mod serve;

use clap::{Parser, Subcommand};

/// Forms Gateway - authenticated REST API over forms and submissions
#[derive(Parser)]
#[command(name = "forms-gateway")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the API server
    Serve,

    /// Generate API key secrets
    Keygen(keygen::KeygenArgs),
}
