use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fxconv::core::log::init_logging;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    /// Snapshot to read rates from: "latest" or YYYY-MM-DD
    #[arg(short, long, global = true)]
    date: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fxconv::AppCommand {
    fn from(cmd: Commands) -> fxconv::AppCommand {
        match cmd {
            Commands::Currencies { filter } => fxconv::AppCommand::Currencies { filter },
            Commands::Convert {
                amount,
                from,
                to,
                reverse,
            } => fxconv::AppCommand::Convert {
                amount,
                from,
                to,
                reverse,
            },
            Commands::Rates { base, to } => fxconv::AppCommand::Rates { base, targets: to },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// List the currencies known to the provider
    Currencies {
        /// Only show currencies whose code or name contains this text
        #[arg(short, long)]
        filter: Option<String>,
    },
    /// Convert an amount from one currency to another
    Convert {
        /// Amount to convert
        #[arg(allow_negative_numbers = true)]
        amount: String,
        /// Base currency code (defaults to the configured base)
        #[arg(short, long)]
        from: Option<String>,
        /// Target currency code (defaults to the configured target)
        #[arg(short, long)]
        to: Option<String>,
        /// Swap the base and target currencies
        #[arg(short, long)]
        reverse: bool,
    },
    /// Show exchange rates for a base currency
    Rates {
        /// Base currency code (defaults to the configured base)
        base: Option<String>,
        /// Only show these target currencies
        #[arg(short, long)]
        to: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let result = match cli.command {
        Some(Commands::Setup) => fxconv::cli::setup::setup(),
        Some(cmd) => {
            fxconv::run_command(cmd.into(), cli.config_path.as_deref(), cli.date.as_deref()).await
        }
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
