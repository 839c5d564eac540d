//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{GenerateCommand, ValidateCommand};
use std::ffi::OsString;

/// Log forwarding configuration compiler
#[derive(Debug, Parser, Clone)]
#[command(name = "logfwd")]
#[command(author = "logfwd Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Compiles log forwarding pipelines into collector configuration", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Generate collector configuration from a forwarder spec
    Generate(GenerateCommand),

    /// Validate a forwarder spec
    Validate(ValidateCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}
