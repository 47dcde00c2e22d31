use crate::config_loader::MasterConfig;
use crate::core::camera_source::CameraService;
use crate::notification::NotificationSender;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything a run mode needs, created once in `main` and dropped on exit.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<MasterConfig>,
    pub service: Arc<dyn CameraService>,
    pub sender: Arc<dyn NotificationSender>,
    pub shutdown: CancellationToken,
}

impl AppContext {
    pub fn new(config: MasterConfig, service: Arc<dyn CameraService>, sender: Arc<dyn NotificationSender>) -> Self {
        AppContext {
            config: Arc::new(config),
            service,
            sender,
            shutdown: CancellationToken::new(),
        }
    }
}
