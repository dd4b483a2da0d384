//! # Chain Indexer
//!
//! Reads blocks from a JSON-lines file, keeps the sufficiently confirmed
//! ones, and indexes them into a hot cache and a durable key-value store.
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, then `IX_*` environment overrides)
//! 2. Open the store and recover the index tip
//! 3. Run the reader and indexing tasks until the source is exhausted or
//!    Ctrl-C is pressed
//! 4. Replay fixtures when `[test] run = true`
//!
//! ## Usage
//!
//! ```text
//! indexer-runtime indexer.toml
//! indexer-runtime indexer.toml --in-memory
//! RUST_LOG=debug indexer-runtime indexer.toml
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use indexer_runtime::{
    open_store, FixtureHarness, IndexerConfig, IndexerContainer, Pipeline, PipelineError,
};
use ix_01_block_source::BlockReader;

#[derive(Debug, Parser)]
#[command(name = "indexer-runtime", version, about = "Confirmation-gated chain indexer")]
struct Cli {
    /// Path to the TOML configuration file.
    config: PathBuf,

    /// Keep the index in memory only.
    #[arg(long)]
    in_memory: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = IndexerConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    info!(
        source = %config.source.path.display(),
        x_confirmations = config.indexer.x_confirmations,
        "Configuration loaded"
    );

    let store = open_store(&config.indexer, cli.in_memory).context("opening key-value store")?;
    let container =
        IndexerContainer::new(config.cache, store).context("recovering block index")?;
    if let Some(tip) = container.index.read().tip() {
        info!(height = tip.height, "Resuming from indexed tip");
    }

    let source = BlockReader::open(&config.source).context("opening block source")?;
    let pipeline = Pipeline::new(container, &config.indexer);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(true);
        }
    });

    let summary = match pipeline.run(source, shutdown_rx).await {
        Ok(summary) => summary,
        Err(e @ PipelineError::Source { .. }) => {
            warn!(error = %e, "Continuing with the blocks read before the failure");
            e.summary().copied().unwrap_or_default()
        }
        Err(e) => return Err(e).context("indexing pipeline failed"),
    };
    info!(%summary, "Indexing complete");

    if config.test.run {
        let report = FixtureHarness::new(&config.test).run(&pipeline.container().facade());
        if !report.all_passed() {
            bail!(
                "{} of {} fixture cases failed",
                report.failed,
                report.failed + report.passed
            );
        }
        info!(passed = report.passed, "All fixture cases passed");
    }

    Ok(())
}
