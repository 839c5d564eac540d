mod cli;
mod core;
mod element;
mod generator;

use anyhow::{Context, Result};
use cli::commands::{GenerateCommand, ValidateCommand};
use cli::output::*;
use cli::{Cli, Command};
use crate::core::config::ForwarderConfig;
use crate::core::secret::SecretStore;
use generator::Generator;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging; stdout is reserved for the generated config
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    match &cli.command {
        Command::Generate(cmd) => generate(cmd)?,
        Command::Validate(cmd) => validate(cmd)?,
    }

    Ok(())
}

fn generate(cmd: &GenerateCommand) -> Result<()> {
    let config = ForwarderConfig::from_file(&cmd.file)
        .context("Failed to load forwarder spec")?;

    let secrets = match &cmd.secrets_dir {
        Some(dir) => SecretStore::from_dir(dir).context("Failed to load secrets")?,
        None => SecretStore::new(),
    };
    info!("Loaded {} secret(s)", secrets.len());

    let generated = Generator::from_config(&config)
        .generate_config(&config, &secrets)
        .context("Failed to generate configuration")?;

    match &cmd.output {
        Some(path) => {
            std::fs::write(path, &generated.conf)
                .with_context(|| format!("Failed to write {}", path))?;
            eprintln!("{} Wrote configuration to {}", INFO, style(path).bold());
        }
        None => print!("{}", generated.conf),
    }

    if !generated.is_complete() {
        for failure in &generated.failures {
            eprintln!("{}", format_failure(failure));
        }
        error!("{} output(s) could not be generated", generated.failures.len());
        std::process::exit(1);
    }

    Ok(())
}

fn validate(cmd: &ValidateCommand) -> Result<()> {
    println!("{} Validating forwarder spec...", INFO);

    match ForwarderConfig::from_file(&cmd.file) {
        Ok(config) => {
            println!("{} Forwarder spec is valid!", CHECK);
            println!("  Outputs: {}", style(config.outputs.len()).cyan());
            println!("  Pipelines: {}", style(config.pipelines.len()).cyan());
            for route in format_routes(&config) {
                println!("    {}", route);
            }

            // Connection details are only checked when an output is built
            let generator = Generator::from_config(&config);
            let mut broken = 0;
            for output in &config.outputs {
                if let Err(e) = generator.build_output(output, None) {
                    println!("{} {}", WARN, style(e).yellow());
                    broken += 1;
                }
            }

            if cmd.json {
                let json = serde_json::to_string_pretty(&config)?;
                println!("\n{}", json);
            }

            if broken > 0 {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(e) => {
            println!("{} Validation failed:", CROSS);
            println!("  {}", style(e).red());
            std::process::exit(1);
        }
    }
}
