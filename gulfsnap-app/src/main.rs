//! gulfsnap binary entry point.
//!
//! Runs one snapshot pass over the default watchlist and writes the
//! resulting JSON files under the output directory.

use anyhow::Result;
use tracing::info;

use gulfsnap_core::{FetchConfig, HttpFetcher, RunConfig, SnapshotRunner};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = RunConfig::default();
    info!(
        "🚀 Starting snapshot run for {} instruments -> {}",
        config.watchlist.len(),
        config.out_dir.display()
    );

    let fetcher = HttpFetcher::new(FetchConfig::default())?;
    let runner = SnapshotRunner::new(config);
    let summary = runner.run(&fetcher).await?;

    info!(
        "Strategies: {} run, {} failed, {} fields updated",
        summary.strategies_run, summary.strategies_failed, summary.fields_updated
    );
    info!("Done. Data updated: {}", summary.as_of.to_rfc3339());

    Ok(())
}
