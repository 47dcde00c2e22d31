use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest<'a> {
    pub client_id: &'a str,
    pub grant_type: &'a str,
    pub refresh_token: &'a str,
    pub scope: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    pub expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
pub struct LocationsResponse {
    #[serde(default)]
    pub user_locations: Vec<RingLocation>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RingLocation {
    pub location_id: String,
    pub name: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct DevicesResponse {
    #[serde(default)]
    pub doorbots: Vec<RingDevice>,
    #[serde(default)]
    pub authorized_doorbots: Vec<RingDevice>,
    #[serde(default)]
    pub stickup_cams: Vec<RingDevice>,
}

impl DevicesResponse {
    pub fn into_cameras(self) -> Vec<RingDevice> {
        self.doorbots
            .into_iter()
            .chain(self.authorized_doorbots)
            .chain(self.stickup_cams)
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RingDevice {
    pub id: u64,
    pub description: String,
    #[serde(default)]
    pub kind: String,
    pub location_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ActiveDing {
    pub id: u64,
    pub id_str: Option<String>,
    pub kind: String,
    pub doorbot_id: u64,
}

impl ActiveDing {
    pub fn id_string(&self) -> String {
        self.id_str.clone().unwrap_or_else(|| self.id.to_string())
    }
}
