mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::analysis::{AnalysisArgs, BenchmarksArgs};

/// Rule-based financial statement analysis
#[derive(Parser)]
#[command(
    name = "fsa",
    version,
    about = "Rule-based financial statement analysis",
    long_about = "A CLI for analysing a period of financial statements with decimal \
                  precision. Scores statement quality, flags anomalies, computes \
                  ratios against industry benchmarks and compares against a prior period."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis (quality, anomalies, scores, ratios, trends, insights)
    Analyze(AnalysisArgs),
    /// Assess statement quality and reliability grade
    Quality(AnalysisArgs),
    /// Detect statement anomalies
    Anomalies(AnalysisArgs),
    /// Composite health, earnings, balance sheet and cash flow scores
    Scores(AnalysisArgs),
    /// Standard ratios graded against industry benchmarks
    Ratios(AnalysisArgs),
    /// Compare against the most recent prior period
    Trends(AnalysisArgs),
    /// Print the active industry benchmark table
    Benchmarks(BenchmarksArgs),
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

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Analyze(args) => commands::analysis::run_analyze(args),
        Commands::Quality(args) => commands::analysis::run_quality(args),
        Commands::Anomalies(args) => commands::analysis::run_anomalies(args),
        Commands::Scores(args) => commands::analysis::run_scores(args),
        Commands::Ratios(args) => commands::analysis::run_ratios(args),
        Commands::Trends(args) => commands::analysis::run_trends(args),
        Commands::Benchmarks(args) => commands::analysis::run_benchmarks(args),
        Commands::Version => {
            println!("fsa {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
