//! Code formatting command.

use crate::cli::common::{CliError, CliResult};
use crate::config::MAX_WIDTH;
use crate::formatter::{describe, CodeMapping};
use crate::models::DEFAULT_WIDTH;
use clap::Args;

/// Show how an identifier would appear on the display
#[derive(Debug, Clone, Args)]
pub struct FormatArgs {
    /// Identifier to format (e.g., an airline ICAO code like "ACA")
    #[arg(value_name = "IDENTIFIER")]
    pub identifier: String,

    /// Number of display modules
    #[arg(short, long, default_value_t = DEFAULT_WIDTH)]
    pub width: usize,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl FormatArgs {
    /// Execute the format command
    pub fn execute(&self) -> CliResult<()> {
        if self.width == 0 || self.width > MAX_WIDTH {
            return Err(CliError::validation(format!(
                "Width must be between 1 and {MAX_WIDTH}"
            )));
        }

        let mapping = CodeMapping::airlines();
        let result = describe(&self.identifier, &mapping, self.width);

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&result)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
        } else {
            println!("Input:      {}", result.input);
            println!("Normalized: {}", result.normalized);
            if result.has_mapping {
                println!("Mapped to:  {}", result.short_code);
            } else {
                println!("Mapped to:  (no mapping)");
            }
            println!("Display:    \"{}\"", result.display);
        }

        Ok(())
    }
}
