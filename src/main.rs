// ABOUTME: CLI entry point for field-sync
// ABOUTME: Parses commands and routes to the sync and layers handlers

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use field_sync::commands;
use field_sync::engine::{ApplyMode, SyncOptions};

#[derive(Parser)]
#[command(name = "field-sync")]
#[command(about = "Reconcile an offline field-collected dataset with a hosted record service", long_about = None)]
#[command(version)]
struct Cli {
    /// Set the log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log: String,
    /// API key for the hosted service (falls back to FIELD_SYNC_API_KEY env)
    #[arg(long = "api-key", env = "FIELD_SYNC_API_KEY", global = true)]
    api_key: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Push offline inserts and updates to the hosted service (never deletes)
    Sync {
        /// Path to the offline dataset collected in the field
        #[arg(long)]
        offline: PathBuf,
        /// Base URL of the hosted record service
        #[arg(long)]
        service: String,
        /// Field carrying the globally-unique record identifier
        #[arg(long, default_value = "globalid")]
        id_field: String,
        /// Field carrying the last-modified timestamp
        #[arg(long, default_value = "last_edited_date")]
        ts_field: String,
        /// Only reconcile these layers (comma-separated; default: all)
        #[arg(long, value_delimiter = ',')]
        layers: Option<Vec<String>>,
        /// Inspect only: write record copies instead of mutating the service
        #[arg(long)]
        inspect: bool,
        /// Directory for inspection artifacts (with --inspect)
        #[arg(long, default_value = "field-sync-inspection")]
        inspect_dir: PathBuf,
        /// Absolute tolerance for duplicate-geometry comparison
        #[arg(long, default_value_t = 1e-9)]
        geometry_tolerance: f64,
    },
    /// List the layers the hosted service defines
    Layers {
        /// Base URL of the hosted record service
        #[arg(long)]
        service: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --log, which defaults to "info"
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log.clone()));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Sync {
            offline,
            service,
            id_field,
            ts_field,
            layers,
            inspect,
            inspect_dir,
            geometry_tolerance,
        } => {
            let mode = if inspect {
                ApplyMode::Inspect {
                    out_dir: inspect_dir,
                }
            } else {
                ApplyMode::Apply
            };
            let options = SyncOptions {
                id_field,
                ts_field,
                layers: layers.unwrap_or_default(),
                mode,
            };
            commands::sync(
                &offline,
                commands::sync::SyncParams {
                    service_url: service,
                    api_key: cli.api_key,
                    options,
                    geometry_tolerance,
                },
            )
            .await
        }
        Commands::Layers { service } => commands::layers(service, cli.api_key).await,
    }
}
