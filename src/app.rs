use crate::config::{Config, load_organizations};
use crate::data_fetcher::{ShutdownFlag, Structure, StructureBuilder};
use crate::error::AppError;
use crate::snapshot::SnapshotWriter;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Run one extraction for `year`.
///
/// - Loads the organizations (fails before any network activity)
/// - Installs a Ctrl+C listener that raises the shutdown flag
/// - Builds the structure and writes the snapshot
/// - Logs the run summary
pub async fn run(config: &Config, year: i32) -> Result<PathBuf, AppError> {
    let shutdown = ShutdownFlag::new();
    let listener = spawn_ctrl_c_listener(shutdown.clone());

    let result = run_with_shutdown(config, year, shutdown).await;
    listener.abort();
    result
}

/// Same as [`run`] with a caller-owned shutdown flag.
pub async fn run_with_shutdown(
    config: &Config,
    year: i32,
    shutdown: ShutdownFlag,
) -> Result<PathBuf, AppError> {
    info!("Starting BSM structure extraction for {year}");
    info!(
        "Retries: {} (backoff unit {}s), delay between organizations: {}s",
        config.max_retries, config.retry_delay_seconds, config.request_delay_seconds
    );

    let organizations = load_organizations(Path::new(&config.organizations_file)).await?;
    info!(
        "Loaded {} organizations from {}",
        organizations.len(),
        config.organizations_file
    );

    let structure = StructureBuilder::from_config(config)?
        .with_shutdown(shutdown)
        .build(&organizations, year)
        .await?;

    let path = SnapshotWriter::new(&config.output_dir)
        .write(&structure)
        .await?;

    log_summary(&structure);
    Ok(path)
}

fn spawn_ctrl_c_listener(shutdown: ShutdownFlag) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, stopping after the current organization");
                shutdown.request();
            }
            Err(e) => warn!("Could not listen for Ctrl+C: {e}"),
        }
    })
}

fn log_summary(structure: &Structure) {
    let metadata = &structure.metadata;
    info!("Extraction complete");
    info!(
        "Successful: {}/{}",
        metadata.successful_organizations, metadata.total_organizations
    );
    if metadata.failed_organizations > 0 {
        warn!("Failed: {}", metadata.failed_organizations);
    }
}
