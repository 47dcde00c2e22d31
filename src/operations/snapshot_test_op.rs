use crate::core::app_context::AppContext;
use crate::core::camera_manager::CameraManager;
use crate::core::snapshot_fetcher::{persist_snapshot, SnapshotFetcher};
use crate::notification::{deliver, Completion, NotificationRequest, SendOptions};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::PathBuf;
use std::time::{Duration, Instant};

pub const TEST_TITLE: &str = "Test Snapshot";
pub const TEST_MESSAGE: &str = "This is a test snapshot message!";
pub const TEST_FAILED_TITLE: &str = "Test Snapshot Failed";
pub const TEST_FAILED_MESSAGE: &str = "An error occurred trying to get a snapshot!";

/// One snapshot from the selected camera, one notification, then the caller exits
/// with the returned status.
pub async fn handle_snapshot_test_cli(ctx: &AppContext, location_index: usize, camera_index: usize) -> Result<Completion> {
    let op_start_time = Instant::now();
    let app = &ctx.config.app_settings;

    let manager = CameraManager::discover(ctx.service.as_ref())
        .await
        .context("Failed to list locations and cameras")?;
    let target = manager.select(location_index, camera_index)?;
    let camera_name = target.camera.name();
    info!("🧪 Test snapshot from {} '{}' at '{}'.", target.selector(), camera_name, target.location_name);

    let fetcher = SnapshotFetcher::new(Duration::from_secs(app.snapshot_timeout_secs));
    let snapshot = match fetcher.fetch_snapshot(target.camera.as_ref()).await {
        Ok(bytes) => {
            let dir = PathBuf::from(&app.snapshot_dir);
            match persist_snapshot(&bytes, &dir, &camera_name, "test", &app.filename_timestamp_format).await {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("⚠️ Unable to save snapshot: {:#}", e);
                    None
                }
            }
        }
        Err(e) => {
            warn!("⚠️ Unable to get snapshot: {:#}", e);
            None
        }
    };

    let request = match &snapshot {
        Some(path) => NotificationRequest::new(TEST_TITLE, TEST_MESSAGE, Some(path.clone())),
        None => NotificationRequest::new(
            TEST_FAILED_TITLE,
            TEST_FAILED_MESSAGE,
            Some(PathBuf::from(&app.error_image_path)),
        ),
    }
    .with_duration(ctx.config.notification.test_duration_secs);

    let completion = deliver(ctx.sender.as_ref(), &request, SendOptions { exit_after: true }).await;

    if let Some(path) = snapshot.filter(|_| !app.keep_snapshots) {
        if let Err(e) = tokio::fs::remove_file(&path).await {
            debug!("Could not remove snapshot {}: {}", path.display(), e);
        }
    }
    info!("🏁 Test snapshot finished in {:?}.", op_start_time.elapsed());
    Ok(completion)
}
