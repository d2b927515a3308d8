mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing::debug;

use commands::evaluate::{ReportArgs, ScenarioArgs};

/// Buy versus rent net present value calculator
#[derive(Parser)]
#[command(
    name = "bvr",
    version,
    about = "Should I buy? Net present value of buying a property versus renting",
    long_about = "Computes the present value of buying a property instead of continuing to rent: \
                  loan sizing, amortised payment, opportunity cost of the upfront cash, the \
                  marginal monthly cost of owning, sale proceeds net of the outstanding loan, \
                  and a buy / don't-buy verdict. Inputs default to the reference scenario and \
                  can be overridden from a JSON/YAML file, piped stdin or individual flags."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log every stage of the calculation to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a scenario and print every derived quantity with the verdict
    #[command(alias = "eval")]
    Evaluate(ScenarioArgs),
    /// Print the formatted report page (metrics and recommendation)
    Report(ReportArgs),
    /// List the input fields with their defaults, ranges and help text
    Fields,
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
    init_logging(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::evaluate::run_evaluate(args),
        Commands::Report(args) => match commands::evaluate::run_report(args) {
            Ok(None) => return,
            Ok(Some(value)) => Ok(value),
            Err(e) => Err(e),
        },
        Commands::Fields => commands::fields::run_fields(),
        Commands::Version => {
            println!("bvr {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            debug!(format = ?cli.output, "writing output");
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_filter = if verbose {
        "buy_rent_core=debug,bvr=debug"
    } else {
        "error"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if std::env::var("BVR_LOG_JSON").is_ok() {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
    }
}
