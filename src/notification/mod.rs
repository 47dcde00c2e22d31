pub mod pipup_sender;

use crate::errors::AppError;
use async_trait::async_trait;
use log::{error, info};
use std::path::PathBuf;
use std::time::Instant;

/// One popup to show on the TV. Built per event and dropped after sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRequest {
    pub title: String,
    pub message: String,
    pub image_file: Option<PathBuf>,
    pub duration_secs: Option<u32>, // overrides the configured display time
}

impl NotificationRequest {
    pub fn new(title: impl Into<String>, message: impl Into<String>, image_file: Option<PathBuf>) -> Self {
        NotificationRequest {
            title: title.into(),
            message: message.into(),
            image_file,
            duration_secs: None,
        }
    }

    pub fn with_duration(mut self, secs: u32) -> Self {
        self.duration_secs = Some(secs);
        self
    }
}

#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// Single attempt; transport failures and non-2xx replies are `AppError::Delivery`.
    async fn send(&self, request: &NotificationRequest) -> Result<(), AppError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SendOptions {
    /// One-shot invocations ask for the process to end once the send settles.
    pub exit_after: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Continue { delivered: bool },
    Exit { code: i32 },
}

impl Completion {
    pub fn delivered(&self) -> bool {
        matches!(self, Completion::Continue { delivered: true } | Completion::Exit { code: 0 })
    }
}

/// Sends and logs the outcome. Never returns the error: delivery problems are
/// reported through the returned `Completion` only.
pub async fn deliver(sender: &dyn NotificationSender, request: &NotificationRequest, options: SendOptions) -> Completion {
    let start_time = Instant::now();
    let delivered = match sender.send(request).await {
        Ok(()) => {
            info!("📺 Sent notification '{}' successfully in {:?}.", request.title, start_time.elapsed());
            true
        }
        Err(e) => {
            error!("❌ Error sending notification '{}' after {:?}: {:#}", request.title, start_time.elapsed(), e);
            false
        }
    };
    if options.exit_after {
        Completion::Exit { code: if delivered { 0 } else { 1 } }
    } else {
        Completion::Continue { delivered }
    }
}
