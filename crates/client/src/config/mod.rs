use std::time::Duration;

use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Deserialize;

use api_types::transaction::TransactionKind;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/spendly.toml";
const ENV_PREFIX: &str = "SPENDLY";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub timezone: String,
    pub level: String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/api/".to_string(),
            timezone: "UTC".to_string(),
            level: "info".to_string(),
            timeout_secs: 10,
        }
    }
}

impl AppConfig {
    pub fn timezone(&self) -> Result<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|err| AppError::InvalidTimezone(format!("{}: {err}", self.timezone)))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Calendar date right now in `tz`.
pub fn today_in(tz: Tz) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

#[derive(Debug, Parser)]
#[command(name = "spendly", version, about = "Record income and expenses on a Spendly ledger")]
pub struct Args {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override base URL (e.g. http://localhost:8000/api/).
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Override timezone used for "today" (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub level: Option<String>,
    /// Override request timeout in seconds.
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the summary and every recorded transaction.
    Show {
        /// Only list transactions of this kind.
        #[arg(long, value_enum)]
        kind: Option<KindArg>,
    },
    /// Record a new transaction, then show the refreshed summary.
    Add {
        #[arg(long, value_enum, default_value_t = KindArg::Expense)]
        kind: KindArg,
        /// Amount as typed; it is converted to a number before sending.
        #[arg(long, allow_hyphen_values = true)]
        amount: String,
        #[arg(long)]
        description: String,
        /// Entry date (YYYY-MM-DD), defaults to today.
        #[arg(long)]
        date: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Income,
    Expense,
}

impl From<KindArg> for TransactionKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Income => TransactionKind::Income,
            KindArg::Expense => TransactionKind::Expense,
        }
    }
}

/// Layers defaults, the optional TOML file, `SPENDLY_*` variables and finally
/// the command line flags.
pub fn load(args: &Args) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(base_url) = &args.base_url {
        settings.base_url = base_url.clone();
    }
    if let Some(timezone) = &args.timezone {
        settings.timezone = timezone.clone();
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.timeout_secs = timeout_secs;
    }

    Ok(settings)
}
