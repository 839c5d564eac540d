//! CLI command definitions

use clap::Args;

/// Generate collector configuration
#[derive(Debug, Args, Clone)]
pub struct GenerateCommand {
    /// Path to forwarder spec YAML file
    #[arg(short, long)]
    pub file: String,

    /// Directory holding one subdirectory per secret, one file per field
    #[arg(long)]
    pub secrets_dir: Option<String>,

    /// Write the configuration here instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Validate a forwarder spec
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to forwarder spec YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}
