use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use datagen::config::ServiceConfig;
use datagen::{
    Config, Format, Identity, LocalRecords, Orchestrator, RandomDataApi, S3ObjectStore, StoreType,
    Uploader,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Generate fake datastore records and land them in MinIO/S3
///
/// Examples:
///   datagen all parquet
///   datagen mssql json
///   datagen redis json
#[derive(Parser)]
#[command(name = "datagen", version, verbatim_doc_comment)]
struct Cli {
    /// Datastore to generate records for
    #[arg(value_enum)]
    target: Target,

    /// Format of the landed objects
    #[arg(value_enum)]
    format: Format,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Target {
    Mssql,
    Postgres,
    Mongodb,
    Redis,
    /// mssql, postgres and mongodb in sequence
    All,
}

impl Target {
    fn store_types(self) -> Vec<StoreType> {
        match self {
            Target::Mssql => vec![StoreType::Mssql],
            Target::Postgres => vec![StoreType::Postgres],
            Target::Mongodb => vec![StoreType::Mongodb],
            Target::Redis => vec![StoreType::Redis],
            Target::All => vec![StoreType::Mssql, StoreType::Postgres, StoreType::Mongodb],
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Variables already in the environment win over the .env file
    let env_file = dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load().context("Failed to load configuration")?;

    // Initialize logging
    init_tracing(&config.service);

    if let Some(path) = &env_file {
        info!(path = %path.display(), "Loaded environment file");
    }

    info!(
        service = %config.service.name,
        target = ?cli.target,
        format = %cli.format,
        "Starting datagen"
    );

    let store = Arc::new(
        S3ObjectStore::new(&config.storage)
            .await
            .context("Failed to initialize S3 object store")?,
    );

    let mut orchestrator = Orchestrator::new(
        Box::new(LocalRecords::new()),
        Box::new(Identity::new()),
        Arc::new(RandomDataApi::new(&config.api)),
        Uploader::new(store, &config.storage),
        config.generation.rows,
    );

    for store_type in cli.target.store_types() {
        let report = orchestrator
            .write_file(store_type, cli.format)
            .await
            .with_context(|| format!("Failed to write {store_type} datasets"))?;

        println!("{report}");
    }

    info!("Datagen finished");

    Ok(())
}

/// Initialize tracing/logging
fn init_tracing(service: &ServiceConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&service.log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if service.log_format.eq_ignore_ascii_case("text") {
        registry.with(fmt::layer()).init();
    } else {
        registry.with(fmt::layer().json()).init();
    }
}
