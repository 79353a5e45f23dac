use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxq::core::QuoteError;
use fxq::core::log::init_logging;
use std::process::ExitCode;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxq::AppCommand {
    fn from(cmd: Commands) -> fxq::AppCommand {
        match cmd {
            Commands::Quote { pair } => fxq::AppCommand::Quote(pair),
            Commands::Latest { pair } => fxq::AppCommand::Latest(pair),
            Commands::Show { id } => fxq::AppCommand::Show(id),
            Commands::Pairs => fxq::AppCommand::Pairs,
            Commands::Refresh => fxq::AppCommand::Refresh,
            Commands::Watch => fxq::AppCommand::Watch,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Get a fresh quote for a pair, e.g. EUR/USD
    Quote { pair: String },
    /// Show the latest stored quote for a pair, fetching one if the pair is unknown
    Latest { pair: String },
    /// Show a stored quote by id
    Show { id: String },
    /// List registered pairs and their latest quotes
    Pairs,
    /// Refresh every registered pair once
    Refresh,
    /// Refresh every registered pair periodically until Ctrl-C
    Watch,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result: Result<()> = match cli.command {
        Some(Commands::Setup) => fxq::cli::setup::setup(),
        Some(cmd) => fxq::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => Cli::command().print_help().map_err(Into::into),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Application failed");
            eprintln!("Error: {e:#}");
            match e.downcast_ref::<QuoteError>() {
                Some(quote_error) if quote_error.is_client_error() => ExitCode::from(2),
                _ => ExitCode::FAILURE,
            }
        }
    }
}
