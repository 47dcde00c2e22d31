use crate::app_config::NotificationConfig;
use crate::common::file_utils;
use crate::errors::AppError;
use crate::notification::{NotificationRequest, NotificationSender};
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

/// Posts notifications to the PiPup app (`http://{tv_host}:7979/notify`).
pub struct PipupSender {
    client: Client,
    endpoint: String,
    config: NotificationConfig,
}

impl PipupSender {
    pub fn new(config: &NotificationConfig) -> Result<Self, AppError> {
        Self::with_endpoint(config, config.endpoint_url())
    }

    pub fn with_endpoint(config: &NotificationConfig, endpoint: String) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(PipupSender {
            client,
            endpoint,
            config: config.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn build_form(&self, request: &NotificationRequest) -> Result<Form, AppError> {
        let cfg = &self.config;
        let duration = request.duration_secs.unwrap_or(cfg.duration_secs);
        let mut form = Form::new()
            .text("duration", duration.to_string())
            .text("position", cfg.position.to_string())
            .text("title", request.title.clone())
            .text("titleColor", cfg.title_color.clone())
            .text("titleSize", cfg.title_size.to_string())
            .text("message", request.message.clone())
            .text("messageColor", cfg.message_color.clone())
            .text("messageSize", cfg.message_size.to_string())
            .text("backgroundColor", cfg.background_color.clone());

        if let Some(path) = &request.image_file {
            match tokio::fs::read(path).await {
                Ok(bytes) => {
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_else(|| "snapshot.jpg".to_string());
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(file_utils::mime_for_path(path))
                        .map_err(|e| AppError::Unexpected(format!("Invalid MIME type: {}", e)))?;
                    form = form.part("image", part);
                }
                Err(e) => {
                    // the popup still goes out, just without a picture
                    warn!("⚠️ Could not read image '{}', sending '{}' without it: {}", path.display(), request.title, e);
                }
            }
        }

        Ok(form.text("imageWidth", cfg.image_width.to_string()))
    }
}

#[async_trait]
impl NotificationSender for PipupSender {
    async fn send(&self, request: &NotificationRequest) -> Result<(), AppError> {
        debug!("📨 POST {} title='{}' image={:?}", self.endpoint, request.title, request.image_file);
        let form = self.build_form(request).await?;
        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::Delivery(format!("POST {} failed: {}", self.endpoint, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Delivery(format!(
                "PiPup at {} answered {}: {}",
                self.endpoint,
                status,
                body.trim()
            )));
        }
        Ok(())
    }
}
