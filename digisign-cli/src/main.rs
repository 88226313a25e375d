//! DigiSign CLI - offline signature image inspection and scoring.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

mod commands;
mod exit_codes;
mod input;

use exit_codes::ExitCode;

const EXIT_CODES_HELP: &str = "Exit codes:
  0   Success
  65  Image data could not be decoded
  66  Input file could not be read";

#[derive(Parser)]
#[command(name = "digisign")]
#[command(author, version, about = "Signature image scoring for the DigiSign backend", long_about = None)]
#[command(after_help = EXIT_CODES_HELP)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a signature image with the placeholder edge-density scorer
    Score {
        /// Image file: raw PNG/JPEG bytes, or a base64 / data-URL text file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Number of independent scoring trials
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=1000))]
        trials: u32,

        /// Disable the random jitter so the score is reproducible
        #[arg(long)]
        no_jitter: bool,
    },

    /// Print decoded dimensions and edge density of a signature image
    Inspect {
        /// Image file: raw PNG/JPEG bytes, or a base64 / data-URL text file
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Score {
            file,
            trials,
            no_jitter,
        } => commands::score::execute(&file, trials, no_jitter),
        Commands::Inspect { file } => commands::inspect::execute(&file),
    };

    let exit = match result {
        Ok(()) => ExitCode::success(),
        Err(err) => ExitCode::from_anyhow(&err),
    };

    if let Some(message) = exit.message {
        eprintln!("{} {}", "error:".red().bold(), message);
    }
    process::exit(exit.code);
}
