//! Main entry point for the map-tile-downloader CLI

use clap::Parser;
use map_tile_downloader::cli::{Cli, Commands};
use map_tile_downloader::shutdown::{self, ShutdownSignal};
use tracing::error;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber with optional JSON formatting
fn init_tracing() {
    let json_format = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("map_tile_downloader=info"));

    if json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    // Install the global shutdown handle and the Ctrl+C task.
    let shutdown = ShutdownSignal::shared();
    shutdown::set_global_shutdown(shutdown.clone());
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Ctrl+C received - finishing the current unit...");
                shutdown.request();
            }
        }
    });

    let result = match cli.command {
        Commands::Tiles(ref args) => args.execute(shutdown.clone()).await,
        Commands::Fonts(ref args) => args.execute(shutdown.clone()).await,
        Commands::Batch(ref args) => args.execute(shutdown.clone()).await,
    };

    // A user-requested interruption still exits zero with the partial
    // total; only argument/config/setup failures are fatal.
    let summary = result.inspect_err(|e| error!("{e}"))?;
    if summary.interrupted {
        println!(
            "Interrupted. Total new files downloaded: {}.",
            summary.total_downloaded
        );
    } else {
        println!(
            "Done. Total new files downloaded: {}.",
            summary.total_downloaded
        );
    }
    Ok(())
}
