mod common;

use common::{scratch_dir, test_config, FakeCamera, RecordingSender, SnapshotReply};
use ringtv::app_config::StreamEndPolicy;
use ringtv::core::camera_source::{CameraSource, DingEvent, DingKind};
use ringtv::core::event_dispatcher::{DispatchSettings, EventDispatcher, ImageChoice};
use ringtv::errors::AppError;
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

fn settings(dir: &PathBuf) -> DispatchSettings {
    DispatchSettings::from_config(&test_config(dir).app_settings)
}

#[tokio::test]
async fn motion_with_snapshot_sends_snapshot() {
    let dir = scratch_dir("motion");
    let camera = FakeCamera::new("Front Door", "doorbell");
    camera.script_snapshot(SnapshotReply::ok(&[0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3]));
    let sender = RecordingSender::new();
    let dispatcher = EventDispatcher::new(sender.clone(), settings(&dir));

    let report = dispatcher
        .handle_event(camera.as_ref(), &DingEvent::new("6890", DingKind::Motion))
        .await;

    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].request.title, "Motion Detected");
    assert_eq!(sent[0].request.message, "Motion detected at Front Door!");
    let ImageChoice::Snapshot(path) = &report.image else {
        panic!("expected a snapshot, got {:?}", report.image);
    };
    assert_eq!(sent[0].request.image_file.as_ref(), Some(path));
    assert!(path.starts_with(dir.join("snapshots")));
    assert_eq!(sent[0].image_bytes.as_deref(), Some(&[0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3][..]));
    assert!(report.delivered);
    // snapshots are cleaned up once sent
    assert!(!path.exists());
}

#[tokio::test]
async fn ding_with_snapshot_timeout_sends_error_image() {
    let dir = scratch_dir("ding");
    let camera = FakeCamera::new("Front Door", "doorbell");
    camera.script_snapshot(SnapshotReply::fail("timeout"));
    let sender = RecordingSender::new();
    let settings = settings(&dir);
    let error_image = settings.error_image.clone();
    let dispatcher = EventDispatcher::new(sender.clone(), settings);

    let report = dispatcher
        .handle_event(camera.as_ref(), &DingEvent::new("6891", DingKind::Ding))
        .await;

    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].request.title, "Doorbell Ring");
    assert_eq!(sent[0].request.message, "Doorbell rung at Front Door!");
    assert_eq!(sent[0].request.image_file, Some(error_image.clone()));
    assert_eq!(report.image, ImageChoice::ErrorImage(error_image));
}

#[tokio::test(start_paused = true)]
async fn hung_snapshot_is_bounded_by_timeout() {
    let dir = scratch_dir("hung");
    let camera = FakeCamera::new("Garage", "stickup_cam");
    camera.script_snapshot(SnapshotReply::ok(b"late").after(Duration::from_secs(3600)));
    let sender = RecordingSender::new();
    let dispatcher = EventDispatcher::new(sender.clone(), settings(&dir));

    let report = dispatcher
        .handle_event(camera.as_ref(), &DingEvent::new("1", DingKind::Other("on_demand".to_string())))
        .await;

    assert!(matches!(report.image, ImageChoice::ErrorImage(_)));
    let sent = sender.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].request.title, "Video Started");
    assert_eq!(sent[0].request.message, "Video started at Garage");
}

#[tokio::test]
async fn delivery_failure_is_reported_not_raised() {
    let dir = scratch_dir("deliveryfail");
    let camera = FakeCamera::new("Front Door", "doorbell");
    camera.script_snapshot(SnapshotReply::ok(b"jpeg"));
    let sender = RecordingSender::failing();
    let dispatcher = EventDispatcher::new(sender.clone(), settings(&dir));

    let report = dispatcher
        .handle_event(camera.as_ref(), &DingEvent::new("2", DingKind::Motion))
        .await;

    assert!(!report.delivered);
    assert_eq!(sender.sent().len(), 1);
}

#[tokio::test]
async fn back_to_back_events_keep_their_own_images() {
    let dir = scratch_dir("concurrent");
    let camera = FakeCamera::new("Front Door", "doorbell");
    // the first event's snapshot finishes after the second one's
    camera.script_snapshot(SnapshotReply::ok(b"first-image").after(Duration::from_millis(80)));
    camera.script_snapshot(SnapshotReply::ok(b"second-image"));
    let sender = RecordingSender::new();
    let dispatcher = EventDispatcher::new(sender.clone(), settings(&dir));

    let first = DingEvent::new("100", DingKind::Motion);
    let second = DingEvent::new("101", DingKind::Ding);
    let (report_a, report_b) = tokio::join!(
        dispatcher.handle_event(camera.as_ref(), &first),
        dispatcher.handle_event(camera.as_ref(), &second),
    );

    let sent = sender.sent();
    assert_eq!(sent.len(), 2);
    assert_ne!(report_a.request.image_file, report_b.request.image_file);

    let find = |title: &str| sent.iter().find(|s| s.request.title == title).cloned().unwrap();
    let motion = find("Motion Detected");
    let ding = find("Doorbell Ring");
    assert_eq!(motion.image_bytes.as_deref(), Some(&b"first-image"[..]));
    assert_eq!(ding.image_bytes.as_deref(), Some(&b"second-image"[..]));
    assert_eq!(motion.request.image_file, report_a.request.image_file);
    assert_eq!(ding.request.image_file, report_b.request.image_file);
}

#[tokio::test]
async fn stream_errors_do_not_stop_the_subscription() {
    let dir = scratch_dir("streamerr");
    let camera = FakeCamera::new("Front Door", "doorbell");
    let events = camera.script_stream();
    let sender = RecordingSender::new();
    let mut settings = settings(&dir);
    settings.stream_end_policy = StreamEndPolicy::Ignore;
    let dispatcher = EventDispatcher::new(sender.clone(), settings);
    let tracker = TaskTracker::new();

    events.send(Ok(DingEvent::new("1", DingKind::Motion))).await.unwrap();
    events.send(Err(AppError::Auth("access token expired".to_string()))).await.unwrap();
    events.send(Ok(DingEvent::new("2", DingKind::Ding))).await.unwrap();
    drop(events);

    let cam: Arc<dyn CameraSource> = camera.clone();
    dispatcher.run_subscription(cam, CancellationToken::new(), tracker.clone()).await;
    tracker.close();
    tracker.wait().await;

    let sent = sender.sent();
    assert_eq!(sent.len(), 2, "one notification per event, none for the stream error");
    assert!(sent.iter().all(|s| matches!(s.request.image_file, Some(ref p) if p.ends_with("error.png"))));
    assert_eq!(camera.subscribe_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn ended_stream_is_resubscribed_until_cancelled() {
    let dir = scratch_dir("resub");
    let camera = FakeCamera::new("Front Door", "doorbell");
    let first_stream = camera.script_stream();
    let second_stream = camera.script_stream();
    camera.script_snapshot(SnapshotReply::ok(b"a"));
    camera.script_snapshot(SnapshotReply::ok(b"b"));
    let sender = RecordingSender::new();
    let dispatcher = EventDispatcher::new(sender.clone(), settings(&dir));
    let tracker = TaskTracker::new();
    let cancel = CancellationToken::new();

    let cam: Arc<dyn CameraSource> = camera.clone();
    let handle = tokio::spawn({
        let dispatcher = dispatcher.clone();
        let cancel = cancel.clone();
        let tracker = tracker.clone();
        async move { dispatcher.run_subscription(cam, cancel, tracker).await }
    });

    first_stream.send(Ok(DingEvent::new("1", DingKind::Motion))).await.unwrap();
    drop(first_stream);
    assert_eq!(sender.wait_for(1).await.len(), 1);

    second_stream.send(Ok(DingEvent::new("2", DingKind::Motion))).await.unwrap();
    assert_eq!(sender.wait_for(2).await.len(), 2);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(2), handle).await.unwrap().unwrap();
    assert_eq!(camera.subscribe_calls.load(Ordering::SeqCst), 2);
}
