use crate::errors::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Local};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// What triggered a ding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DingKind {
    Motion,
    Ding,
    Other(String), // e.g. "on_demand" when someone opens live view
}

impl DingKind {
    pub fn from_wire(kind: &str) -> Self {
        match kind {
            "motion" => DingKind::Motion,
            "ding" => DingKind::Ding,
            other => DingKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DingKind::Motion => "motion",
            DingKind::Ding => "ding",
            DingKind::Other(kind) => kind,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DingEvent {
    pub id: String,
    pub kind: DingKind,
    pub received_at: DateTime<Local>,
}

impl DingEvent {
    pub fn new(id: impl Into<String>, kind: DingKind) -> Self {
        DingEvent {
            id: id.into(),
            kind,
            received_at: Local::now(),
        }
    }
}

/// Items on a camera's event stream. An `Err` is a stream-level problem
/// (auth expiry, transport); the channel closing means the stream ended.
pub type EventStream = mpsc::Receiver<Result<DingEvent, AppError>>;

#[async_trait]
pub trait CameraSource: Send + Sync {
    fn name(&self) -> String;
    fn model(&self) -> String;

    /// Requests one still image. No retries; callers bound the wait.
    async fn get_snapshot(&self) -> Result<Vec<u8>, AppError>;

    /// Starts producing events until `cancel` fires or the receiver is dropped.
    fn subscribe_events(&self, cancel: CancellationToken) -> EventStream;
}

pub struct Location {
    pub name: String,
    pub cameras: Vec<Arc<dyn CameraSource>>,
}

/// The authenticated cloud session.
#[async_trait]
pub trait CameraService: Send + Sync {
    async fn list_locations(&self) -> Result<Vec<Location>, AppError>;
}

#[cfg(test)]
mod tests {
    use super::DingKind;

    #[test]
    fn wire_kinds_map_to_variants() {
        assert_eq!(DingKind::from_wire("motion"), DingKind::Motion);
        assert_eq!(DingKind::from_wire("ding"), DingKind::Ding);
        assert_eq!(DingKind::from_wire("on_demand"), DingKind::Other("on_demand".to_string()));
        assert_eq!(DingKind::from_wire("on_demand").as_str(), "on_demand");
    }
}
