use crate::common::file_utils;
use crate::core::camera_source::CameraSource;
use crate::errors::AppError;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tokio::fs::OpenOptions;
use tokio::io::{AsyncWrite, AsyncWriteExt};

#[derive(Debug, Clone)]
pub struct SnapshotFetcher {
    timeout: Duration,
}

impl SnapshotFetcher {
    pub fn new(timeout: Duration) -> Self {
        SnapshotFetcher { timeout }
    }

    /// One bounded snapshot request. Timeouts and empty bodies surface as
    /// `AppError::Snapshot`; the caller picks the fallback.
    pub async fn fetch_snapshot(&self, camera: &dyn CameraSource) -> Result<Vec<u8>, AppError> {
        let name = camera.name();
        let start_time = Instant::now();
        debug!("📸 Requesting snapshot from '{}' (timeout {:?})", name, self.timeout);

        let bytes = match tokio::time::timeout(self.timeout, camera.get_snapshot()).await {
            Ok(Ok(bytes)) => bytes,
            Ok(Err(AppError::Snapshot { details, .. })) => return Err(AppError::snapshot(&name, details)),
            Ok(Err(e)) => return Err(AppError::snapshot(&name, e.to_string())),
            Err(_) => {
                return Err(AppError::snapshot(
                    &name,
                    format!("timed out after {:?}", self.timeout),
                ))
            }
        };
        if bytes.is_empty() {
            return Err(AppError::snapshot(&name, "camera returned an empty image"));
        }
        info!(
            "📸 Snapshot from '{}': {} kb in {:?}",
            name,
            bytes.len() / 1024,
            start_time.elapsed()
        );
        Ok(bytes)
    }
}

/// Writes snapshot bytes to a file no other event can be using. The name is
/// derived from camera + event id + timestamp and opened with `create_new`,
/// so a clash gets a numeric suffix instead of overwriting.
pub async fn persist_snapshot(
    bytes: &[u8],
    dir: &Path,
    camera_name: &str,
    event_id: &str,
    timestamp_format: &str,
) -> Result<PathBuf, AppError> {
    let (extension, _) = file_utils::image_kind(bytes);
    let filename = file_utils::generate_snapshot_filename(camera_name, event_id, timestamp_format, extension);
    tokio::fs::create_dir_all(dir).await?;

    let stem = filename.trim_end_matches(&format!(".{}", extension)).to_string();
    let mut candidate = dir.join(&filename);
    for attempt in 1..=100u32 {
        match OpenOptions::new().write(true).create_new(true).open(&candidate).await {
            Ok(mut file) => {
                write_or_discard(&mut file, bytes, &candidate).await?;
                debug!("💾 Snapshot saved to {}", candidate.display());
                return Ok(candidate);
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                candidate = dir.join(format!("{}-{}.{}", stem, attempt, extension));
            }
            Err(e) => {
                return Err(AppError::Io(format!(
                    "Failed to create snapshot file '{}': {}",
                    candidate.display(),
                    e
                )))
            }
        }
    }
    Err(AppError::Io(format!("Could not find a free snapshot filename for '{}'", filename)))
}

/// Writes the whole image or nothing: a failed write removes the partial file.
async fn write_or_discard<W: AsyncWrite + Unpin>(writer: &mut W, bytes: &[u8], path: &Path) -> Result<(), AppError> {
    let written = async {
        writer.write_all(bytes).await?;
        writer.flush().await
    }
    .await;
    if let Err(e) = written {
        if let Err(remove_err) = tokio::fs::remove_file(path).await {
            warn!("⚠️ Could not remove partial snapshot {}: {}", path.display(), remove_err);
        }
        return Err(AppError::Io(format!("Failed to write snapshot '{}': {}", path.display(), e)));
    }
    Ok(())
}
