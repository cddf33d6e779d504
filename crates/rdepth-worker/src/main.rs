//! Sample filtering worker binary.

use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use rdepth_worker::WorkerConfig;

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Colored output for dev, JSON for production
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("rdepth=info,rdepth_worker=info,rdepth_media=info"));

    // Logs go to stderr; stdout carries the JSON-lines output
    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }

    info!("Starting rdepth-worker");

    if let Err(e) = run_main().await {
        error!("Worker failed: {:#}", e);
        std::process::exit(1);
    }

    info!("Worker finished");
}

async fn run_main() -> anyhow::Result<()> {
    use anyhow::Context;

    let config = WorkerConfig::from_env().context("Failed to load worker config")?;
    info!("Worker config: {:?}", config);

    let summary = rdepth_worker::run(&config)
        .await
        .with_context(|| format!("Failed to resolve scenes from {}", config.scenes_path.display()))?;

    if summary.skipped > 0 {
        info!(skipped = summary.skipped, "Some samples were skipped");
    }
    Ok(())
}
