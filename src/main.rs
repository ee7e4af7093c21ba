use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use pricefeed::core::log::init_logging;

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

impl From<Commands> for pricefeed::AppCommand {
    fn from(cmd: Commands) -> pricefeed::AppCommand {
        match cmd {
            Commands::Price { symbol, currency } => {
                pricefeed::AppCommand::Price { symbol, currency }
            }
            Commands::Prices { symbols, currency } => {
                pricefeed::AppCommand::Prices { symbols, currency }
            }
            Commands::Coins => pricefeed::AppCommand::Coins,
            Commands::Compare { symbol1, symbol2 } => {
                pricefeed::AppCommand::Compare { symbol1, symbol2 }
            }
            Commands::Above {
                symbol,
                threshold,
                currency,
            } => pricefeed::AppCommand::Above {
                symbol,
                threshold,
                currency,
            },
            Commands::Signal {
                symbol,
                ma_threshold,
            } => pricefeed::AppCommand::Signal {
                symbol,
                ma_threshold,
            },
            Commands::Portfolio => pricefeed::AppCommand::Portfolio,
            Commands::Alerts => pricefeed::AppCommand::Alerts,
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show the current price of a symbol
    Price {
        symbol: String,
        /// Quote currency, defaults to the configured one
        #[arg(long)]
        currency: Option<String>,
    },
    /// Show prices for several symbols at once
    Prices {
        #[arg(required = true)]
        symbols: Vec<String>,
        /// Quote currency, defaults to the configured one
        #[arg(long)]
        currency: Option<String>,
    },
    /// List supported symbols
    Coins,
    /// Compare the prices of two symbols
    Compare { symbol1: String, symbol2: String },
    /// Check whether a price is above a threshold
    Above {
        symbol: String,
        threshold: f64,
        /// Quote currency, defaults to the configured one
        #[arg(long)]
        currency: Option<String>,
    },
    /// Buy signal against a moving-average threshold
    Signal { symbol: String, ma_threshold: f64 },
    /// Value the configured holdings
    Portfolio,
    /// Evaluate the configured price alerts
    Alerts,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => pricefeed::cli::setup::setup(),
        Some(cmd) => pricefeed::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
