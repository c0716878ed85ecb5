//! Persists the yearly structure to disk.
//!
//! The document is written to a sibling `.tmp` file and renamed into place,
//! so readers see either the previous snapshot or the complete new one.

use crate::data_fetcher::models::Structure;
use crate::error::AppError;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone)]
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Location of the snapshot for `year`.
    pub fn snapshot_path(&self, year: i32) -> PathBuf {
        self.output_dir.join(format!("bsm-structure-{year}.json"))
    }

    /// Writes `structure` atomically, replacing any earlier snapshot of the same year.
    ///
    /// # Errors
    /// `AppError::SnapshotWrite` if the directory cannot be created, the
    /// document cannot be serialized, or the file cannot be written or renamed.
    #[instrument(skip(self, structure), fields(year = structure.year))]
    pub async fn write(&self, structure: &Structure) -> Result<PathBuf, AppError> {
        let path = self.snapshot_path(structure.year);
        let fail = |message: String| AppError::snapshot_write(path.display().to_string(), message);

        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir)
                .await
                .map_err(|e| fail(format!("cannot create {}: {e}", self.output_dir.display())))?;
            info!("Created directory {}", self.output_dir.display());
        }

        let mut content = serde_json::to_vec_pretty(structure)
            .map_err(|e| fail(format!("serialization failed: {e}")))?;
        content.push(b'\n');

        let temp_path = path.with_extension("json.tmp");
        if let Err(e) = write_and_sync(&temp_path, &content).await {
            remove_temp(&temp_path).await;
            return Err(fail(e.to_string()));
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            remove_temp(&temp_path).await;
            return Err(fail(format!("rename failed: {e}")));
        }

        debug!("Wrote {} bytes", content.len());
        info!("Structure saved to {}", path.display());
        Ok(path)
    }
}

async fn write_and_sync(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(content).await?;
    file.sync_all().await?;
    Ok(())
}

async fn remove_temp(path: &Path) {
    if let Err(e) = fs::remove_file(path).await
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!("Could not remove temporary file {}: {e}", path.display());
    }
}
