use crate::camera::ring_camera::RingCamera;
use crate::camera::ring_types::{
    ActiveDing, DevicesResponse, LocationsResponse, RefreshTokenRequest, RingDevice, TokenResponse,
};
use crate::camera_config::RingApiConfig;
use crate::core::camera_source::{CameraService, CameraSource, Location};
use crate::errors::AppError;
use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

const CLIENT_ID: &str = "ring_official_android";
const TOKEN_SLACK: Duration = Duration::from_secs(60);
const MAX_TOKEN_LIFETIME: Duration = Duration::from_secs(24 * 60 * 60);

struct TokenState {
    access_token: String,
    refresh_token: String,
    expires_at: Instant,
}

/// HTTP plumbing shared by the session and every camera handle.
pub struct RingClient {
    http: Client,
    config: RingApiConfig,
    tokens: Mutex<TokenState>,
    token_file: Option<PathBuf>, // where rotated refresh tokens are written back
}

impl RingClient {
    async fn request_token(http: &Client, config: &RingApiConfig, refresh_token: &str) -> Result<TokenState, AppError> {
        let body = RefreshTokenRequest {
            client_id: CLIENT_ID,
            grant_type: "refresh_token",
            refresh_token,
            scope: "client",
        };
        let response = http
            .post(&config.oauth_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("Token request to {} failed: {}", config.oauth_url, e)))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST || status == StatusCode::FORBIDDEN {
            let details = response.text().await.unwrap_or_default();
            return Err(AppError::Auth(format!(
                "Refresh token rejected ({}): {}. Generate a new token and try again.",
                status,
                details.trim()
            )));
        }
        if !status.is_success() {
            return Err(AppError::Network(format!("Token endpoint answered {}", status)));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Malformed token response: {}", e)))?;
        Ok(TokenState {
            access_token: token.access_token,
            refresh_token: token.refresh_token.unwrap_or_else(|| refresh_token.to_string()),
            expires_at: token_expiry(Instant::now(), token.expires_in),
        })
    }

    async fn save_rotated_token(&self, previous: &str, current: &str) {
        if let Some(path) = &self.token_file {
            save_refresh_token(path, previous, current).await;
        }
    }

    /// Current bearer token, renewed once if it is about to expire.
    async fn access_token(&self) -> Result<String, AppError> {
        let mut tokens = self.tokens.lock().await;
        if Instant::now() + TOKEN_SLACK >= tokens.expires_at {
            debug!("🔑 Access token expired, renewing session.");
            let renewed = Self::request_token(&self.http, &self.config, &tokens.refresh_token).await?;
            self.save_rotated_token(&tokens.refresh_token, &renewed.refresh_token).await;
            *tokens = renewed;
        }
        Ok(tokens.access_token.clone())
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response, AppError> {
        let token = self.access_token().await?;
        let response = self
            .http
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("GET {} failed: {}", url, e)))?;
        match response.status() {
            StatusCode::UNAUTHORIZED => Err(AppError::Auth(format!("GET {} was rejected as unauthorized", url))),
            status if !status.is_success() => Err(AppError::Network(format!("GET {} answered {}", url, status))),
            _ => Ok(response),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, AppError> {
        self.get(url)
            .await?
            .json()
            .await
            .map_err(|e| AppError::Network(format!("Unexpected response from {}: {}", url, e)))
    }

    pub async fn locations(&self) -> Result<LocationsResponse, AppError> {
        self.get_json(&format!("{}/devices/v1/locations", self.config.api_base_url)).await
    }

    pub async fn devices(&self) -> Result<DevicesResponse, AppError> {
        self.get_json(&format!("{}/clients_api/ring_devices", self.config.api_base_url)).await
    }

    pub async fn active_dings(&self) -> Result<Vec<ActiveDing>, AppError> {
        self.get_json(&format!("{}/clients_api/dings/active", self.config.api_base_url)).await
    }

    pub async fn snapshot(&self, device_id: u64) -> Result<Vec<u8>, AppError> {
        let url = format!("{}/snapshots/next/{}", self.config.snapshot_base_url, device_id);
        let bytes = self
            .get(&url)
            .await?
            .bytes()
            .await
            .map_err(|e| AppError::Network(format!("Failed to read snapshot body from {}: {}", url, e)))?;
        Ok(bytes.to_vec())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.config.poll_interval_secs)
    }
}

/// Expiry instant for a token lifetime, clamped to a day so absurd values
/// from the server cannot overflow `Instant`.
fn token_expiry(now: Instant, expires_in_secs: u64) -> Instant {
    let lifetime = Duration::from_secs(expires_in_secs).min(MAX_TOKEN_LIFETIME);
    now.checked_add(lifetime).unwrap_or(now)
}

async fn save_refresh_token(path: &Path, previous: &str, current: &str) {
    if previous == current {
        return;
    }
    match tokio::fs::write(path, format!("{}\n", current)).await {
        Ok(()) => info!("🔑 Saved rotated refresh token to {}", path.display()),
        Err(e) => warn!("⚠️ Could not save rotated refresh token to {}: {}", path.display(), e),
    }
}

/// Authenticated session against the Ring cloud. Lives for the whole process.
#[derive(Clone)]
pub struct RingSession {
    client: Arc<RingClient>,
}

impl RingSession {
    /// Exchanges the refresh token for a session. When `token_file` is given,
    /// every rotated refresh token is written back to it.
    pub async fn authenticate(
        config: &RingApiConfig,
        refresh_token: &str,
        token_file: Option<&Path>,
    ) -> Result<Self, AppError> {
        let start_time = Instant::now();
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(format!("android:{}", config.client_display_name))
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        let tokens = RingClient::request_token(&http, config, refresh_token).await?;
        info!("🔐 Authenticated with Ring in {:?}.", start_time.elapsed());
        if let Some(path) = token_file {
            save_refresh_token(path, refresh_token, &tokens.refresh_token).await;
        }
        let client = RingClient {
            http,
            config: config.clone(),
            tokens: Mutex::new(tokens),
            token_file: token_file.map(Path::to_path_buf),
        };
        Ok(RingSession { client: Arc::new(client) })
    }

    fn camera_handle(&self, device: RingDevice) -> Arc<dyn CameraSource> {
        Arc::new(RingCamera::new(Arc::clone(&self.client), device))
    }
}

#[async_trait]
impl CameraService for RingSession {
    async fn list_locations(&self) -> Result<Vec<Location>, AppError> {
        let locations = self.client.locations().await?.user_locations;
        let devices = self.client.devices().await?.into_cameras();
        debug!("Ring reports {} location(s) and {} camera(s).", locations.len(), devices.len());

        let mut result: Vec<Location> = locations
            .iter()
            .map(|loc| Location {
                name: loc.name.clone(),
                cameras: devices
                    .iter()
                    .filter(|d| d.location_id.as_deref() == Some(loc.location_id.as_str()))
                    .cloned()
                    .map(|d| self.camera_handle(d))
                    .collect(),
            })
            .collect();

        let unassigned: Vec<RingDevice> = devices
            .into_iter()
            .filter(|d| {
                d.location_id
                    .as_deref()
                    .map(|id| !locations.iter().any(|loc| loc.location_id == id))
                    .unwrap_or(true)
            })
            .collect();
        if !unassigned.is_empty() {
            result.push(Location {
                name: "Unassigned".to_string(),
                cameras: unassigned.into_iter().map(|d| self.camera_handle(d)).collect(),
            });
        }
        Ok(result)
    }
}
