use crate::core::app_context::AppContext;
use crate::core::camera_manager::CameraManager;
use crate::core::event_dispatcher::{DispatchSettings, EventDispatcher};
use crate::notification::{deliver, NotificationRequest, SendOptions};
use anyhow::{bail, Context, Result};
use futures::future::join_all;
use log::{info, warn};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::task::TaskTracker;

pub const START_TITLE: &str = "ringtv";
pub const START_MESSAGE: &str = "Ring notifications started!";

/// Continuous mode: subscribe to every camera and forward events until
/// `ctx.shutdown` is cancelled, then give in-flight notifications a grace period.
pub async fn handle_watch_cli(ctx: &AppContext) -> Result<()> {
    let op_start_time = Instant::now();
    let app = &ctx.config.app_settings;

    let manager = CameraManager::discover(ctx.service.as_ref())
        .await
        .context("Failed to list locations and cameras")?;
    if manager.is_empty() {
        bail!("No cameras found on this account, nothing to watch.");
    }

    let dispatcher = EventDispatcher::new(Arc::clone(&ctx.sender), DispatchSettings::from_config(app));
    let tracker = TaskTracker::new();

    let subscriptions: Vec<_> = manager
        .all()
        .iter()
        .map(|discovered| {
            info!("🎯 Watching {} '{}' at '{}'.", discovered.selector(), discovered.camera.name(), discovered.location_name);
            let dispatcher = dispatcher.clone();
            let camera = Arc::clone(&discovered.camera);
            let cancel = ctx.shutdown.clone();
            let tracker = tracker.clone();
            tokio::spawn(async move { dispatcher.run_subscription(camera, cancel, tracker).await })
        })
        .collect();

    if app.notify_on_start {
        let request = NotificationRequest::new(START_TITLE, START_MESSAGE, None);
        deliver(ctx.sender.as_ref(), &request, SendOptions::default()).await;
    }

    ctx.shutdown.cancelled().await;
    info!("🛑 Shutdown requested, closing {} subscription(s)...", subscriptions.len());
    for result in join_all(subscriptions).await {
        if let Err(join_err) = result {
            warn!("💀 Subscription task ended abnormally: {}", join_err);
        }
    }

    tracker.close();
    let grace = Duration::from_secs(app.shutdown_grace_secs);
    if tokio::time::timeout(grace, tracker.wait()).await.is_err() {
        warn!("⚠️ {} notification(s) still in flight after {:?}, abandoning them.", tracker.len(), grace);
    }
    info!("🏁 Watch mode finished after {:?}.", op_start_time.elapsed());
    Ok(())
}
