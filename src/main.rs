//! Splitflap Control - scheduler daemon and CLI for splitflap displays
//!
//! Drives a splitflap display with a clock, mock flight codes or a rotating
//! list of airports, and exposes a small REST API for remote control.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use splitflap_control::cli::{
    AirportsArgs, CliResult, ConfigArgs, ExitCode, FormatArgs, RunArgs, SendArgs,
};

/// Splitflap Control - scheduler daemon and CLI for splitflap displays
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Connect to the display, run the scheduler and serve the control API
    Run(RunArgs),
    /// Show how an identifier would appear on the display
    Format(FormatArgs),
    /// List the airports used by airport cycling
    Airports(AirportsArgs),
    /// Send text to the display once
    Send(SendArgs),
    /// Show or change configuration
    Config(ConfigArgs),
}

async fn dispatch(command: Command) -> CliResult<()> {
    match command {
        Command::Run(args) => args.execute().await,
        Command::Format(args) => args.execute(),
        Command::Airports(args) => args.execute(),
        Command::Send(args) => args.execute().await,
        Command::Config(args) => args.execute(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = dispatch(cli.command).await {
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code().code());
    }
    std::process::exit(ExitCode::Success.code());
}
