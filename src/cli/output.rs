//! CLI output formatting

use crate::core::config::ForwarderConfig;
use crate::generator::GenerateError;
use console::Emoji;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");

/// One line per pipeline: `name → out1, out2`
pub fn format_routes(config: &ForwarderConfig) -> Vec<String> {
    config
        .pipelines
        .iter()
        .map(|p| {
            format!(
                "{} → {}",
                style(&p.name).bold(),
                style(p.output_refs.join(", ")).cyan()
            )
        })
        .collect()
}

/// Describe an output that failed to generate
pub fn format_failure(error: &GenerateError) -> String {
    match error.output() {
        Some(output) => format!("{} {}: {}", CROSS, style(output).red(), style(error).dim()),
        None => format!("{} {}", CROSS, style(error).red()),
    }
}
