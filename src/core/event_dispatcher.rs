use crate::app_config::{ApplicationConfig, StreamEndPolicy};
use crate::common::timestamp_utils;
use crate::core::camera_source::{CameraSource, DingEvent, DingKind};
use crate::core::snapshot_fetcher::{persist_snapshot, SnapshotFetcher};
use crate::notification::{deliver, NotificationRequest, NotificationSender, SendOptions};
use log::{debug, error, info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Title and message for an event kind. Total over all kinds.
pub fn notification_text(kind: &DingKind, camera_name: &str) -> (String, String) {
    match kind {
        DingKind::Motion => (
            "Motion Detected".to_string(),
            format!("Motion detected at {}!", camera_name),
        ),
        DingKind::Ding => (
            "Doorbell Ring".to_string(),
            format!("Doorbell rung at {}!", camera_name),
        ),
        DingKind::Other(_) => (
            "Video Started".to_string(),
            format!("Video started at {}", camera_name),
        ),
    }
}

/// Short description for log lines; the only place the subkind shows up.
pub fn describe_event(kind: &DingKind) -> String {
    match kind {
        DingKind::Motion => "Motion detected".to_string(),
        DingKind::Ding => "Doorbell pressed".to_string(),
        DingKind::Other(subkind) => format!("Video started ({})", subkind),
    }
}

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    pub snapshot_dir: PathBuf,
    pub error_image: PathBuf,
    pub snapshot_timeout: Duration,
    pub keep_snapshots: bool,
    pub filename_timestamp_format: String,
    pub stream_end_policy: StreamEndPolicy,
    pub resubscribe_delay: Duration,
}

impl DispatchSettings {
    pub fn from_config(app: &ApplicationConfig) -> Self {
        DispatchSettings {
            snapshot_dir: PathBuf::from(&app.snapshot_dir),
            error_image: PathBuf::from(&app.error_image_path),
            snapshot_timeout: Duration::from_secs(app.snapshot_timeout_secs),
            keep_snapshots: app.keep_snapshots,
            filename_timestamp_format: app.filename_timestamp_format.clone(),
            stream_end_policy: app.stream_end_policy,
            resubscribe_delay: Duration::from_secs(app.resubscribe_delay_secs),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageChoice {
    Snapshot(PathBuf),
    ErrorImage(PathBuf),
}

#[derive(Debug, Clone)]
pub struct DispatchReport {
    pub request: NotificationRequest,
    pub image: ImageChoice,
    pub delivered: bool,
}

/// Turns each ding into exactly one notification.
#[derive(Clone)]
pub struct EventDispatcher {
    sender: Arc<dyn NotificationSender>,
    fetcher: SnapshotFetcher,
    settings: Arc<DispatchSettings>,
}

impl EventDispatcher {
    pub fn new(sender: Arc<dyn NotificationSender>, settings: DispatchSettings) -> Self {
        EventDispatcher {
            sender,
            fetcher: SnapshotFetcher::new(settings.snapshot_timeout),
            settings: Arc::new(settings),
        }
    }

    /// Snapshot, fall back to the error image, send. Nothing in here returns
    /// an error to the caller.
    pub async fn handle_event(&self, camera: &dyn CameraSource, event: &DingEvent) -> DispatchReport {
        let start_time = Instant::now();
        let camera_name = camera.name();
        info!(
            "🔔 {} on {} camera. Ding id {}. Received at {}",
            describe_event(&event.kind),
            camera_name,
            event.id,
            timestamp_utils::arrival_time_str(&event.received_at)
        );

        let (title, message) = notification_text(&event.kind, &camera_name);

        let image = match self.fetcher.fetch_snapshot(camera).await {
            Ok(bytes) => match persist_snapshot(
                &bytes,
                &self.settings.snapshot_dir,
                &camera_name,
                &event.id,
                &self.settings.filename_timestamp_format,
            )
            .await
            {
                Ok(path) => ImageChoice::Snapshot(path),
                Err(e) => {
                    error!("❌ [{}] Could not save snapshot for ding {}: {:#}. Using error image.", camera_name, event.id, e);
                    ImageChoice::ErrorImage(self.settings.error_image.clone())
                }
            },
            Err(e) => {
                warn!("⚠️ [{}] Unable to get snapshot for ding {}: {:#}. Using error image.", camera_name, event.id, e);
                ImageChoice::ErrorImage(self.settings.error_image.clone())
            }
        };

        let image_path = match &image {
            ImageChoice::Snapshot(path) | ImageChoice::ErrorImage(path) => path.clone(),
        };
        let request = NotificationRequest::new(title, message, Some(image_path));
        let completion = deliver(self.sender.as_ref(), &request, SendOptions::default()).await;

        if let ImageChoice::Snapshot(path) = &image {
            if !self.settings.keep_snapshots {
                if let Err(e) = tokio::fs::remove_file(path).await {
                    debug!("Could not remove snapshot {}: {}", path.display(), e);
                }
            }
        }

        debug!("[{}] Ding {} handled in {:?}", camera_name, event.id, start_time.elapsed());
        DispatchReport {
            request,
            image,
            delivered: completion.delivered(),
        }
    }

    /// Consumes a camera's event stream until `cancel` fires. Each event is
    /// handled on its own task registered with `tracker`, so a slow snapshot
    /// never holds up the next event.
    pub async fn run_subscription(&self, camera: Arc<dyn CameraSource>, cancel: CancellationToken, tracker: TaskTracker) {
        let camera_name = camera.name();
        loop {
            let mut stream = camera.subscribe_events(cancel.child_token());
            info!("👂 Subscribed to events from '{}'.", camera_name);

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        info!("🛑 Closing subscription for '{}'.", camera_name);
                        return;
                    }
                    item = stream.recv() => match item {
                        Some(Ok(event)) => {
                            let dispatcher = self.clone();
                            let camera = Arc::clone(&camera);
                            tracker.spawn(async move {
                                dispatcher.handle_event(camera.as_ref(), &event).await;
                            });
                        }
                        Some(Err(e)) => {
                            error!("❌ Event stream error for '{}': {:#}", camera_name, e);
                        }
                        None => {
                            warn!("⚠️ Event stream for '{}' finished unexpectedly.", camera_name);
                            break;
                        }
                    }
                }
            }

            match self.settings.stream_end_policy {
                StreamEndPolicy::Ignore => return,
                StreamEndPolicy::Resubscribe => {
                    info!("🔁 Resubscribing to '{}' in {:?}.", camera_name, self.settings.resubscribe_delay);
                    tokio::select! {
                        _ = cancel.cancelled() => return,
                        _ = tokio::time::sleep(self.settings.resubscribe_delay) => {}
                    }
                }
            }
        }
    }
}
