use std::process::ExitCode;

use clap::Parser;
use spendly_client::{
    Client, SyncController,
    commands::{self, NewEntry},
    config::{self, Args, Command},
    error::Result,
};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let settings = config::load(&args)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "spendly={level},spendly_client={level}",
            level = settings.level
        )))
        .with_writer(std::io::stderr)
        .init();

    let tz = settings.timezone()?;
    let client = Client::new(&settings.base_url, settings.timeout())?;
    tracing::debug!("using ledger at {}", client.base_url());

    let controller = SyncController::builder(client)
        .today(move || config::today_in(tz))
        .build();

    let mut out = std::io::stdout().lock();
    match args.command {
        Command::Show { kind } => {
            commands::show(&controller, kind.map(Into::into), &mut out).await
        }
        Command::Add {
            kind,
            amount,
            description,
            date,
        } => {
            let entry = NewEntry {
                kind: kind.into(),
                amount,
                description,
                date,
            };
            commands::add(&controller, entry, &mut out).await
        }
    }
}
