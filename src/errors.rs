use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Authentication Failed: {0}")]
    Auth(String),

    #[error("Network Error: {0}")]
    Network(String),

    #[error("Snapshot Error for camera {camera}: {details}")]
    Snapshot { camera: String, details: String },

    #[error("Notification Delivery Error: {0}")]
    Delivery(String),

    #[error("File I/O Error: {0}")]
    Io(String),

    #[error("Resource Not Found: {0}")]
    NotFound(String),

    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn snapshot(camera: &str, details: impl Into<String>) -> Self {
        AppError::Snapshot {
            camera: camera.to_string(),
            details: details.into(),
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, AppError::Auth(_))
    }
}

// Allow conversion from std::io::Error to AppError::Io
impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}
