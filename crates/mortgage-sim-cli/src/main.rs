mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::Level;

use commands::capacity::CapacityArgs;
use commands::loan::SimulateArgs;

/// Mortgage loan simulations
#[derive(Parser)]
#[command(
    name = "msim",
    version,
    about = "Mortgage amortisation and borrowing capacity simulations",
    long_about = "Simulates constant-annuity mortgage loans with decimal precision. \
                  Give any three of principal, rate, duration and monthly payment \
                  to solve the fourth and print the amortisation schedule, or size \
                  the largest loan a monthly budget can carry."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine diagnostics to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve the missing loan parameter and build the amortisation schedule
    Simulate(SimulateArgs),
    /// Maximum principal for a monthly budget
    Capacity(CapacityArgs),
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

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(Level::DEBUG)
            .with_target(false)
            .init();
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Simulate(args) => commands::loan::run_simulate(args),
        Commands::Capacity(args) => commands::capacity::run_capacity(args),
        Commands::Version => {
            println!("msim {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => match output::render(&cli.output, &value) {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("{}: {}", "error".red().bold(), e);
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
