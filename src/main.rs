use std::{fs::File, path::PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bill_engine::{
    dlq::LogDLQ, engine::Engine, ingestion::CsvReader, repository::InMemoryBills,
    service::BillService, settings::Settings,
};

/// Replays bill operations from a CSV file and prints everyone's balance.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// CSV file with one bill operation per row
    file: PathBuf,

    /// Also print the transfers that settle each bill
    #[arg(long)]
    settlements: bool,

    /// Settings file (defaults to ./bill_engine.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main] // using Tokio runtime for async
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref())?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("bill_engine={}", settings.log.level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let file = File::open(&cli.file)?;

    // Set up the components
    let ingestion = CsvReader::new(file);
    let service = BillService::new(InMemoryBills::new(), settings.limits.clone());
    let mut engine = Engine::new(ingestion, service, LogDLQ::default());

    engine.process().await?;

    let mut stdout = std::io::stdout().lock();
    engine.flush(&mut stdout, cli.settlements)?;

    Ok(())
}
