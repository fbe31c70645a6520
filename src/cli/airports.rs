//! Airport sequence listing command.

use crate::airports::CANADIAN_AIRPORTS;
use crate::cli::common::{CliError, CliResult};
use clap::Args;
use serde::Serialize;

/// List the airports shown in airport cycling mode
#[derive(Debug, Clone, Args)]
pub struct AirportsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct AirportList<'a> {
    airports: &'a [&'a str],
    total: usize,
}

impl AirportsArgs {
    /// Execute the airports command
    pub fn execute(&self) -> CliResult<()> {
        if self.json {
            let list = AirportList {
                airports: CANADIAN_AIRPORTS,
                total: CANADIAN_AIRPORTS.len(),
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&list)
                    .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?
            );
            return Ok(());
        }

        for (index, code) in CANADIAN_AIRPORTS.iter().enumerate() {
            println!("{:>3}. {}", index + 1, code);
        }
        println!();
        println!("{} airports", CANADIAN_AIRPORTS.len());

        Ok(())
    }
}
