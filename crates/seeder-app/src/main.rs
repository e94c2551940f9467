use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coordinates::CoordinateTable;
use seeder_app::{AssumeYes, Confirm, SeedReport, Seeder, SeederConfig, StdinConfirm};
use sensor_client::SensorApiClient;

#[derive(Parser, Debug)]
#[command(author, version, about = "Seed the energy monitoring API with simulated sensors", long_about = None)]
struct Cli {
    /// Settings file (TOML, or JSON by extension); falls back to SEEDER_CONFIG
    #[arg(long)]
    config: Option<String>,
    /// District plan to seed from
    #[arg(long)]
    districts: Option<PathBuf>,
    /// Override the API base URL
    #[arg(long)]
    api_url: Option<String>,
    /// Add sensors without asking, even if some already exist
    #[arg(short = 'y', long)]
    yes: bool,
    /// Print the payloads instead of sending them
    #[arg(long)]
    dry_run: bool,
    /// Seed for reproducible coordinates
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = SeederConfig::load_with_path(cli.config).context("load config failed")?;
    if let Some(path) = cli.districts {
        config.districts_path = path;
    }
    if let Some(url) = cli.api_url {
        config.api.base_url = url;
    }
    if let Some(seed) = cli.seed {
        config.rng_seed = Some(seed);
    }
    config.assume_yes |= cli.yes;
    config.dry_run |= cli.dry_run;
    config.validate().context("config validation failed")?;

    let client = SensorApiClient::new(config.api.clone()).context("sensor api client init failed")?;
    let table = CoordinateTable::jakarta();
    let rng = match config.rng_seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let report = if config.assume_yes {
        run_seeder(&client, &table, AssumeYes, rng, &config).await?
    } else {
        run_seeder(&client, &table, StdinConfirm, rng, &config).await?
    };

    info!(
        existing = report.existing,
        aborted = report.aborted,
        created = report.created,
        failed = report.failed,
        "seeder finished"
    );
    Ok(())
}

async fn run_seeder<C: Confirm>(
    client: &SensorApiClient,
    table: &CoordinateTable,
    confirm: C,
    rng: StdRng,
    config: &SeederConfig,
) -> Result<SeedReport> {
    let stdout = io::stdout();
    let mut seeder = Seeder::new(client, table, confirm, rng, stdout.lock()).dry_run(config.dry_run);
    seeder.run(&config.districts_path).await
}
