// Shared fakes for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use ringtv::config_loader::MasterConfig;
use ringtv::core::camera_source::{CameraService, CameraSource, DingEvent, EventStream, Location};
use ringtv::errors::AppError;
use ringtv::notification::{NotificationRequest, NotificationSender};
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh directory under the system temp dir, unique per call.
pub fn scratch_dir(tag: &str) -> PathBuf {
    let n = SCRATCH_COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!("ringtv-{}-{}-{}", tag, std::process::id(), n));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

pub fn test_config(dir: &PathBuf) -> MasterConfig {
    let mut config = MasterConfig::default();
    config.app_settings.snapshot_dir = dir.join("snapshots").display().to_string();
    config.app_settings.error_image_path = dir.join("error.png").display().to_string();
    config.app_settings.snapshot_timeout_secs = 2;
    config.app_settings.resubscribe_delay_secs = 0;
    config.app_settings.shutdown_grace_secs = 2;
    config
}

pub struct SnapshotReply {
    pub delay: Duration,
    pub result: Result<Vec<u8>, String>,
}

impl SnapshotReply {
    pub fn ok(bytes: &[u8]) -> Self {
        SnapshotReply { delay: Duration::ZERO, result: Ok(bytes.to_vec()) }
    }

    pub fn fail(details: &str) -> Self {
        SnapshotReply { delay: Duration::ZERO, result: Err(details.to_string()) }
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Camera whose snapshots and event streams are scripted by the test.
pub struct FakeCamera {
    name: String,
    model: String,
    snapshots: Mutex<VecDeque<SnapshotReply>>,
    streams: Mutex<VecDeque<EventStream>>,
    idle_senders: Mutex<Vec<mpsc::Sender<Result<DingEvent, AppError>>>>,
    pub subscribe_calls: AtomicUsize,
}

impl FakeCamera {
    pub fn new(name: &str, model: &str) -> Arc<Self> {
        Arc::new(FakeCamera {
            name: name.to_string(),
            model: model.to_string(),
            snapshots: Mutex::new(VecDeque::new()),
            streams: Mutex::new(VecDeque::new()),
            idle_senders: Mutex::new(Vec::new()),
            subscribe_calls: AtomicUsize::new(0),
        })
    }

    pub fn script_snapshot(&self, reply: SnapshotReply) {
        self.snapshots.lock().unwrap().push_back(reply);
    }

    /// Queues a stream for the next `subscribe_events` call and returns its producer side.
    pub fn script_stream(&self) -> mpsc::Sender<Result<DingEvent, AppError>> {
        let (tx, rx) = mpsc::channel(16);
        self.streams.lock().unwrap().push_back(rx);
        tx
    }
}

#[async_trait]
impl CameraSource for FakeCamera {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn model(&self) -> String {
        self.model.clone()
    }

    async fn get_snapshot(&self) -> Result<Vec<u8>, AppError> {
        let reply = self.snapshots.lock().unwrap().pop_front();
        match reply {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                reply.result.map_err(|details| AppError::snapshot(&self.name, details))
            }
            None => Err(AppError::snapshot(&self.name, "no snapshot scripted")),
        }
    }

    fn subscribe_events(&self, _cancel: CancellationToken) -> EventStream {
        self.subscribe_calls.fetch_add(1, Ordering::SeqCst);
        match self.streams.lock().unwrap().pop_front() {
            Some(rx) => rx,
            None => {
                // unscripted subscriptions never produce anything
                let (tx, rx) = mpsc::channel(1);
                self.idle_senders.lock().unwrap().push(tx);
                rx
            }
        }
    }
}

pub struct FakeService {
    locations: Vec<(String, Vec<Arc<FakeCamera>>)>,
    fail_auth: bool,
}

impl FakeService {
    pub fn new(locations: Vec<(&str, Vec<Arc<FakeCamera>>)>) -> Arc<Self> {
        Arc::new(FakeService {
            locations: locations.into_iter().map(|(n, c)| (n.to_string(), c)).collect(),
            fail_auth: false,
        })
    }

    pub fn expired() -> Arc<Self> {
        Arc::new(FakeService { locations: Vec::new(), fail_auth: true })
    }
}

#[async_trait]
impl CameraService for FakeService {
    async fn list_locations(&self) -> Result<Vec<Location>, AppError> {
        if self.fail_auth {
            return Err(AppError::Auth("refresh token expired".to_string()));
        }
        Ok(self
            .locations
            .iter()
            .map(|(name, cameras)| Location {
                name: name.clone(),
                cameras: cameras.iter().map(|c| Arc::clone(c) as Arc<dyn CameraSource>).collect(),
            })
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct Sent {
    pub request: NotificationRequest,
    pub image_bytes: Option<Vec<u8>>,
}

/// Records every request together with the image bytes as they were at send time.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<Sent>>,
    pub fail: bool,
}

impl RecordingSender {
    pub fn new() -> Arc<Self> {
        Arc::new(RecordingSender::default())
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(RecordingSender { sent: Mutex::new(Vec::new()), fail: true })
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub async fn wait_for(&self, count: usize) -> Vec<Sent> {
        for _ in 0..200 {
            if self.sent.lock().unwrap().len() >= count {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        self.sent()
    }
}

#[async_trait]
impl NotificationSender for RecordingSender {
    async fn send(&self, request: &NotificationRequest) -> Result<(), AppError> {
        let image_bytes = request.image_file.as_ref().and_then(|p| std::fs::read(p).ok());
        self.sent.lock().unwrap().push(Sent { request: request.clone(), image_bytes });
        if self.fail {
            Err(AppError::Delivery("TV unreachable".to_string()))
        } else {
            Ok(())
        }
    }
}
