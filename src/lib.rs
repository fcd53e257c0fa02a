pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::{ConversionInput, Converter, SnapshotDate};
use crate::providers::CurrencyApiProvider;
use anyhow::Result;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    Currencies {
        filter: Option<String>,
    },
    Convert {
        amount: String,
        from: Option<String>,
        to: Option<String>,
        reverse: bool,
    },
    Rates {
        base: Option<String>,
        targets: Vec<String>,
    },
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    date: Option<&str>,
) -> Result<()> {
    info!("fxconv starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let mut provider = CurrencyApiProvider::new(&config.providers.currency_api)?;
    if let Some(date) = date {
        provider = provider.with_date(date.parse::<SnapshotDate>()?);
    }

    match command {
        AppCommand::Currencies { filter } => {
            cli::currencies::run(&provider, filter.as_deref()).await
        }
        AppCommand::Convert {
            amount,
            from,
            to,
            reverse,
        } => {
            let mut input = ConversionInput::new(
                amount,
                from.unwrap_or_else(|| config.default_base.clone()),
                to.unwrap_or_else(|| config.default_target.clone()),
            );
            if reverse {
                input.swap();
            }
            let converter = Converter::new(provider);
            cli::convert::run(&converter, &input).await
        }
        AppCommand::Rates { base, targets } => {
            let base = base.unwrap_or_else(|| config.default_base.clone());
            cli::rates::run(&provider, &base, &targets).await
        }
    }
}
