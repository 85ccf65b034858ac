mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::cdf::CdfArgs;
use commands::fixed_point::{ToDecimalArgs, ToFixedArgs};
use commands::pricing::{PriceArgs, QuoteArgs};

/// Fixed-point conversion, normal CDF and option values for the FORT contracts
#[derive(Parser)]
#[command(
    name = "fortm",
    version,
    about = "Fixed-point conversion, normal CDF and option values for the FORT contracts",
    long_about = "Off-chain companion to the FORT options contracts. Converts human values \
                  to token-scaled integers and back, evaluates the standard normal CDF the \
                  way the contracts do, and prices drift-adjusted calls and puts, either \
                  from plain parameters or against a registered pricing channel."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log computation details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a human value as a token-scaled integer
    ToFixed(ToFixedArgs),
    /// Render a token-scaled integer as a decimal string
    ToDecimal(ToDecimalArgs),
    /// Evaluate the standard normal CDF (table and/or integration)
    Cdf(CdfArgs),
    /// Drift-adjusted call and put values
    Price(PriceArgs),
    /// Quote an option against a pricing channel's parameters
    Quote(QuoteArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

/// RUST_LOG wins; otherwise warn, or debug with --verbose.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::ToFixed(args) => commands::fixed_point::run_to_fixed(args),
        Commands::ToDecimal(args) => commands::fixed_point::run_to_decimal(args),
        Commands::Cdf(args) => commands::cdf::run_cdf(args),
        Commands::Price(args) => commands::pricing::run_price(args),
        Commands::Quote(args) => commands::pricing::run_quote(args),
        Commands::Version => {
            println!("fortm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
