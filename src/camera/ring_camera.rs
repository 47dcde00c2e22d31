use crate::camera::ring_session::RingClient;
use crate::camera::ring_types::RingDevice;
use crate::core::camera_source::{CameraSource, DingEvent, DingKind, EventStream};
use crate::errors::AppError;
use async_trait::async_trait;
use log::debug;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

const EVENT_BUFFER: usize = 32;

pub struct RingCamera {
    client: Arc<RingClient>,
    device: RingDevice,
}

impl RingCamera {
    pub fn new(client: Arc<RingClient>, device: RingDevice) -> Self {
        RingCamera { client, device }
    }
}

#[async_trait]
impl CameraSource for RingCamera {
    fn name(&self) -> String {
        self.device.description.clone()
    }

    fn model(&self) -> String {
        if self.device.kind.is_empty() {
            "unknown".to_string()
        } else {
            self.device.kind.clone()
        }
    }

    async fn get_snapshot(&self) -> Result<Vec<u8>, AppError> {
        debug!("Ring Cam [{}]: requesting snapshot for device {}", self.device.description, self.device.id);
        self.client
            .snapshot(self.device.id)
            .await
            .map_err(|e| AppError::snapshot(&self.device.description, e.to_string()))
    }

    /// Polls the active dings list and forwards the ones for this camera that
    /// were not active on the previous poll. Dings already active when the
    /// subscription starts are treated as seen.
    fn subscribe_events(&self, cancel: CancellationToken) -> EventStream {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        let client = Arc::clone(&self.client);
        let device_id = self.device.id;
        let name = self.device.description.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(client.poll_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut seen: HashSet<String> = HashSet::new();
            let mut primed = false;

            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {}
                }

                match client.active_dings().await {
                    Ok(dings) => {
                        let current: HashSet<String> = dings
                            .iter()
                            .filter(|d| d.doorbot_id == device_id)
                            .map(|d| d.id_string())
                            .collect();
                        if primed {
                            let mut emitted = HashSet::new();
                            for ding in dings.iter().filter(|d| d.doorbot_id == device_id) {
                                let id = ding.id_string();
                                if seen.contains(&id) || !emitted.insert(id.clone()) {
                                    continue;
                                }
                                let event = DingEvent::new(id, DingKind::from_wire(&ding.kind));
                                if tx.send(Ok(event)).await.is_err() {
                                    debug!("Ring Cam [{}]: subscriber gone, stopping poller.", name);
                                    return;
                                }
                            }
                        }
                        seen = current;
                        primed = true;
                    }
                    Err(e) => {
                        if tx.send(Err(e)).await.is_err() {
                            return;
                        }
                    }
                }
            }
            debug!("Ring Cam [{}]: poller cancelled.", name);
        });

        rx
    }
}
