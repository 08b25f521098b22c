use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use alert_trade_core::Signal;

mod commands;

#[derive(Parser)]
#[command(name = "alert-trade")]
#[command(about = "Fan out trading alerts into per-account broker orders", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration file and list configured accounts
    Validate {
        /// Config file path
        #[arg(long, default_value = "config/Config.toml")]
        config: String,
    },
    /// Size a hypothetical alert against every active account without
    /// placing anything
    Size {
        /// Config file path
        #[arg(long, default_value = "config/Config.toml")]
        config: String,
        /// Instrument symbol, e.g. RELIANCE
        #[arg(long)]
        ticker: String,
        /// Alert price
        #[arg(long)]
        price: Decimal,
        /// Trade direction
        #[arg(long, value_enum, default_value = "buy")]
        signal: SignalArg,
    },
    /// Run a full alert through dispatch and rebase against an in-process
    /// paper broker
    Simulate {
        /// Config file path
        #[arg(long, default_value = "config/Config.toml")]
        config: String,
        /// Instrument symbol, e.g. RELIANCE
        #[arg(long)]
        ticker: String,
        /// Alert price
        #[arg(long)]
        price: Decimal,
        /// Trade direction
        #[arg(long, value_enum, default_value = "buy")]
        signal: SignalArg,
        /// Simulated execution price (defaults to the alert price)
        #[arg(long)]
        fill_price: Option<Decimal>,
        /// Status polls the paper broker answers "in transit" before filling
        #[arg(long, default_value_t = 0)]
        transit_polls: u32,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SignalArg {
    Buy,
    Sell,
}

impl From<SignalArg> for Signal {
    fn from(arg: SignalArg) -> Self {
        match arg {
            SignalArg::Buy => Signal::Buy,
            SignalArg::Sell => Signal::Sell,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { config } => commands::validate(&config).await,
        Commands::Size {
            config,
            ticker,
            price,
            signal,
        } => commands::size(&config, &ticker, price, signal.into()).await,
        Commands::Simulate {
            config,
            ticker,
            price,
            signal,
            fill_price,
            transit_polls,
        } => {
            commands::simulate(&config, &ticker, price, signal.into(), fill_price, transit_polls)
                .await
        }
    }
}
