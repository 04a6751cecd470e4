//! Equity Analytics - batch DCF valuation and indicator report.
//!
//! Reads the market data snapshot named in the configuration, analyses every
//! configured ticker and prints the report as JSON on stdout.

use anyhow::{Context, Result};
use equity_analytics::{BatchRunner, SnapshotProvider};
use equity_common::config::{config_path, Config};
use equity_common::logging::init_logging_with_exclusions;

fn main() -> Result<()> {
    let startup_start = std::time::Instant::now();

    // Load configuration
    let config = Config::load_and_validate()?;

    // Initialize logging
    init_logging_with_exclusions(
        &config.observability.log_level,
        &config.observability.log_format,
        &config.observability.excluded_targets,
    );

    tracing::info!("Equity Analytics v{}", env!("CARGO_PKG_VERSION"));

    let config_file = config_path();
    if !config_file.exists() {
        tracing::info!(path = %config_file.display(), "Config file not found, using defaults");
    }

    let snapshot_path = config.data.snapshot_path();
    let provider = SnapshotProvider::open_or_empty(&snapshot_path)
        .with_context(|| format!("Failed to open market data snapshot {}", snapshot_path.display()))?;

    let report = BatchRunner::new(&config).run(&provider);

    tracing::info!(
        duration_ms = startup_start.elapsed().as_millis() as u64,
        run_id = %report.run_id,
        "Report ready"
    );

    println!("{}", report.to_json_pretty()?);
    Ok(())
}
