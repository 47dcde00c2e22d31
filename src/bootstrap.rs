use crate::app_config::ApplicationConfig;
use crate::camera::ring_session::RingSession;
use crate::config_loader::MasterConfig;
use crate::errors::AppError;
use log::{debug, info};
use std::path::{Path, PathBuf};

pub struct LoadedToken {
    pub value: String,
    /// Set when the token was read from disk; rotated tokens go back there.
    pub file: Option<PathBuf>,
}

impl std::fmt::Debug for LoadedToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedToken").field("value", &"<redacted>").field("file", &self.file).finish()
    }
}

/// Picks the refresh token: a non-empty environment value wins over the file.
pub fn load_token(env_value: Option<String>, token_file: &Path) -> Result<LoadedToken, AppError> {
    if let Some(token) = env_value.map(|t| t.trim().to_string()).filter(|t| !t.is_empty()) {
        debug!("🔑 Using refresh token from environment.");
        return Ok(LoadedToken { value: token, file: None });
    }
    let contents = std::fs::read_to_string(token_file).map_err(|e| {
        AppError::Auth(format!(
            "Unable to read API token from '{}' ({}). Ensure you have an API token before running.",
            token_file.display(),
            e
        ))
    })?;
    let token = contents.trim();
    if token.is_empty() {
        return Err(AppError::Auth(format!("Token file '{}' is empty.", token_file.display())));
    }
    debug!("🔑 Using refresh token from '{}'.", token_file.display());
    Ok(LoadedToken {
        value: token.to_string(),
        file: Some(token_file.to_path_buf()),
    })
}

pub fn load_token_from_config(app: &ApplicationConfig) -> Result<LoadedToken, AppError> {
    let env_value = if app.token_env_var.is_empty() {
        None
    } else {
        std::env::var(&app.token_env_var).ok()
    };
    load_token(env_value, Path::new(&app.token_file))
}

/// Credential + authentication. Any error here is fatal to the process.
pub async fn establish_session(config: &MasterConfig) -> Result<RingSession, AppError> {
    let token = load_token_from_config(&config.app_settings)?;
    let session = RingSession::authenticate(&config.ring, &token.value, token.file.as_deref()).await?;
    info!("✅ Ring session established.");
    Ok(session)
}
