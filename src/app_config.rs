use serde::Deserialize;

/// What continuous mode does when a camera's event stream ends.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StreamEndPolicy {
    Resubscribe,
    Ignore,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApplicationConfig {
    pub log_level: Option<String>, // Making it optional to potentially use CLI or env var as primary
    pub token_file: String,
    pub token_env_var: String,
    pub snapshot_dir: String,
    pub error_image_path: String,
    pub keep_snapshots: bool,
    pub snapshot_timeout_secs: u64,
    pub notify_on_start: bool,
    pub shutdown_grace_secs: u64,
    pub stream_end_policy: StreamEndPolicy,
    pub resubscribe_delay_secs: u64,
    pub filename_timestamp_format: String, // strftime format string
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        ApplicationConfig {
            log_level: Some("info".to_string()),
            token_file: "token.txt".to_string(),
            token_env_var: "RING_REFRESH_TOKEN".to_string(),
            snapshot_dir: "./snapshots".to_string(),
            error_image_path: "error.png".to_string(),
            keep_snapshots: false,
            snapshot_timeout_secs: 15,
            notify_on_start: true,
            shutdown_grace_secs: 10,
            stream_end_policy: StreamEndPolicy::Resubscribe,
            resubscribe_delay_secs: 5,
            filename_timestamp_format: "%Y%m%d_%H%M%S%3f".to_string(),
        }
    }
}

/// Settings for the PiPup overlay receiver on the TV.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct NotificationConfig {
    pub tv_host: String,
    pub tv_port: u16,
    pub duration_secs: u32,
    pub test_duration_secs: u32,
    pub position: u8,
    pub title_color: String,
    pub title_size: u32,
    pub message_color: String,
    pub message_size: u32,
    pub background_color: String,
    pub image_width: u32,
    pub request_timeout_secs: u64,
}

impl NotificationConfig {
    pub fn endpoint_url(&self) -> String {
        format!("http://{}:{}/notify", self.tv_host, self.tv_port)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        NotificationConfig {
            tv_host: "192.168.1.11".to_string(),
            tv_port: 7979,
            duration_secs: 12,
            test_duration_secs: 20,
            position: 0,
            title_color: "#0066cc".to_string(),
            title_size: 20,
            message_color: "#000000".to_string(),
            message_size: 14,
            background_color: "#ffffff".to_string(),
            image_width: 640,
            request_timeout_secs: 10,
        }
    }
}
