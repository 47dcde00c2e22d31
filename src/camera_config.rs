use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RingApiConfig {
    pub oauth_url: String,
    pub api_base_url: String,
    pub snapshot_base_url: String,
    pub poll_interval_secs: u64, // dings polling cadence per camera
    pub client_display_name: String,
    pub request_timeout_secs: u64,
}

impl Default for RingApiConfig {
    fn default() -> Self {
        RingApiConfig {
            oauth_url: "https://oauth.ring.com/oauth/token".to_string(),
            api_base_url: "https://api.ring.com".to_string(),
            snapshot_base_url: "https://app-snaps.ring.com".to_string(),
            poll_interval_secs: 2,
            client_display_name: "ringtv".to_string(),
            request_timeout_secs: 20,
        }
    }
}
