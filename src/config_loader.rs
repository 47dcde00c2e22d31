use serde::Deserialize;
use std::fs;
use std::path::Path;
use crate::app_config::{ApplicationConfig, NotificationConfig};
use crate::camera_config::RingApiConfig;
use anyhow::{Result, Context, bail};
use chrono::format::{Item, StrftimeItems};
use log::{debug, info, warn};
use std::time::Instant;

pub const DEFAULT_CONFIG_PATH: &str = "config/ringtv.yaml";
pub const TV_HOST_ENV: &str = "RINGTV_TV_HOST";
pub const DISPLAY_DURATION_ENV: &str = "RINGTV_DISPLAY_DURATION";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct MasterConfig {
    #[serde(rename = "application")]
    pub app_settings: ApplicationConfig,
    pub notification: NotificationConfig,
    pub ring: RingApiConfig,
}

/// Loads, overrides from the environment and validates the configuration.
///
/// A missing file is only tolerated when `explicit` is false, i.e. the user
/// did not pass `--config` and we looked at the default location.
pub fn load_config(path: &str, explicit: bool) -> Result<MasterConfig> {
    debug!("📄 Attempting to load config from: {}", path);
    let start_time = Instant::now();

    let mut config = if !explicit && !Path::new(path).exists() {
        warn!("⚠️ No configuration file at '{}', using built-in defaults.", path);
        MasterConfig::default()
    } else {
        let config_str = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file '{}'. 📖", path))?;
        serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse YAML configuration from '{}'. 💔", path))?
    };
    debug!("Read config in {:?}", start_time.elapsed());

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;

    validate_master_config(&config).with_context(|| "Master configuration validation failed 👎")?;

    info!("✅ Configuration ready (source '{}') in {:?}", path, start_time.elapsed());
    Ok(config)
}

pub fn apply_env_overrides<F>(config: &mut MasterConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(TV_HOST_ENV) {
        debug!("Overriding TV host from {}: {}", TV_HOST_ENV, host);
        config.notification.tv_host = host.trim().to_string();
    }
    if let Some(duration) = lookup(DISPLAY_DURATION_ENV) {
        config.notification.duration_secs = duration
            .trim()
            .parse()
            .with_context(|| format!("{} must be a whole number of seconds, got '{}'", DISPLAY_DURATION_ENV, duration))?;
        debug!("Overriding display duration from {}: {}s", DISPLAY_DURATION_ENV, config.notification.duration_secs);
    }
    Ok(())
}

pub fn validate_master_config(config: &MasterConfig) -> Result<()> {
    debug!("🕵️ Validating master configuration...");
    let app = &config.app_settings;
    let notify = &config.notification;
    let ring = &config.ring;

    if notify.tv_host.trim().is_empty() {
        bail!("❌ notification.tv_host cannot be empty.");
    }
    if notify.tv_host.contains(|c: char| c.is_whitespace() || c == '/') {
        bail!("❌ Invalid TV host '{}'.", notify.tv_host);
    }
    if notify.tv_port == 0 {
        bail!("❌ notification.tv_port cannot be 0.");
    }
    if notify.duration_secs == 0 || notify.test_duration_secs == 0 {
        bail!("❌ Notification display durations must be at least one second.");
    }
    for (field, value) in [
        ("title_color", &notify.title_color),
        ("message_color", &notify.message_color),
        ("background_color", &notify.background_color),
    ] {
        if !is_hex_color(value) {
            bail!("❌ notification.{} '{}' is not a #RRGGBB or #AARRGGBB color.", field, value);
        }
    }

    if app.token_file.is_empty() && app.token_env_var.is_empty() {
        bail!("❌ Either application.token_file or application.token_env_var must be set.");
    }
    if app.snapshot_dir.is_empty() {
        bail!("❌ application.snapshot_dir cannot be empty.");
    }
    if app.error_image_path.is_empty() {
        bail!("❌ application.error_image_path cannot be empty.");
    }
    if app.snapshot_timeout_secs == 0 {
        bail!("❌ application.snapshot_timeout_secs must be greater than zero.");
    }
    // chrono panics when an invalid item is rendered, so reject it here
    if StrftimeItems::new(&app.filename_timestamp_format).any(|item| matches!(item, Item::Error)) {
        bail!(
            "❌ application.filename_timestamp_format '{}' is not a valid strftime format.",
            app.filename_timestamp_format
        );
    }

    if ring.poll_interval_secs == 0 {
        bail!("❌ ring.poll_interval_secs must be greater than zero.");
    }
    for (field, value) in [
        ("oauth_url", &ring.oauth_url),
        ("api_base_url", &ring.api_base_url),
        ("snapshot_base_url", &ring.snapshot_base_url),
    ] {
        reqwest::Url::parse(value)
            .with_context(|| format!("❌ ring.{} '{}' is not a valid URL.", field, value))?;
    }

    info!("👍 Master configuration validated successfully.");
    Ok(())
}

fn is_hex_color(value: &str) -> bool {
    match value.strip_prefix('#') {
        Some(hex) => (hex.len() == 6 || hex.len() == 8) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}
