mod config;
mod database;
mod entities;
mod http_server;
mod logging;
mod services;

#[cfg(test)]
mod test_utils;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::{
    config::Config,
    database::Database,
    http_server::app::HttpServerConfig,
    logging::init_tracing,
    services::{
        library_sync::{LibrarySync, SyncReport},
        seed::{CatalogSeeder, SeedReport, SeedSettings},
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "FLIXHUB_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Console log level, overridden by RUST_LOG
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// OTLP gRPC endpoint to export traces to
    #[arg(long, global = true, env = "OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index the images directory and seed the catalog, then serve the REST API
    Serve {
        /// The port to run the server on
        #[arg(short, long, default_value = "8080", env = "PORT")]
        port: u16,

        /// Directory of poster images, overrides the config file
        #[arg(short, long, env = "FLIXHUB_IMAGES_PATH")]
        images_path: Option<PathBuf>,
    },
    /// Index the images directory once
    Sync {
        /// Directory of poster images, overrides the config file
        #[arg(short, long, env = "FLIXHUB_IMAGES_PATH")]
        images_path: Option<PathBuf>,
    },
    /// Run the catalog seeder once
    Seed,
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

async fn run_sync(database: &Arc<Database>, config: &Config, images_path: PathBuf) -> SyncReport {
    let sync = LibrarySync::new(
        database.clone(),
        images_path,
        &config.images_mount(),
        &config.sync.extensions,
    );
    let mut rng = StdRng::from_os_rng();
    sync.run(&mut rng).await
}

async fn run_seed(database: &Arc<Database>, config: &Config) -> Result<SeedReport> {
    CatalogSeeder::new(database.clone(), SeedSettings::from_config(config))
        .ensure_seeded()
        .await
        .wrap_err("Failed to seed catalog")
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let _tracing_guard = init_tracing("flixhub", args.otlp_endpoint.as_deref(), args.log_level)?;

    log::debug!("Loading configuration");
    let config = {
        if let Some(config) = args.config {
            Config::from_file(&config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load flixhub config")?;

    if let Commands::Config(config_commands) = &args.command {
        match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                println!("{}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        }
        return Ok(());
    }

    let database = Arc::new(Database::open(&config.database_path()).await?);

    match args.command {
        Commands::Serve { port, images_path } => {
            let images_path = images_path.unwrap_or_else(|| config.images_path());

            // Indexed files get the default video and a thumbnail URL from the seeder
            run_sync(&database, &config, images_path.clone()).await;
            run_seed(&database, &config).await?;

            log::info!("Starting HTTP server on port: {}", port);
            http_server::app::start(HttpServerConfig {
                port,
                database,
                config,
                images_path,
            })
            .await?;
        }
        Commands::Sync { images_path } => {
            let images_path = images_path.unwrap_or_else(|| config.images_path());
            let report = run_sync(&database, &config, images_path).await;
            println!(
                "Scanned {} files: {} created, {} updated, {} unchanged, {} failed",
                report.scanned, report.created, report.updated, report.unchanged, report.failed
            );
        }
        Commands::Seed => {
            let report = run_seed(&database, &config).await?;
            println!(
                "{} movies backfilled, {} catalog titles upserted",
                report.backfilled, report.upserted
            );
        }
        Commands::Config(_) => {}
    }

    Ok(())
}
