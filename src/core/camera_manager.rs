use crate::core::camera_source::{CameraService, CameraSource};
use crate::errors::AppError;
use log::{debug, info};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct DiscoveredCamera {
    pub location_index: usize,
    pub camera_index: usize,
    pub location_name: String,
    pub camera: Arc<dyn CameraSource>,
}

impl DiscoveredCamera {
    /// The `loc,cam` selector accepted by `--test`.
    pub fn selector(&self) -> String {
        format!("{},{}", self.location_index, self.camera_index)
    }
}

/// Enumerates every camera of every location behind the session, in order.
/// Read-only; errors are returned untouched so the caller decides whether to exit.
pub async fn list_cameras(service: &dyn CameraService) -> Result<Vec<DiscoveredCamera>, AppError> {
    let start_time = Instant::now();
    let locations = service.list_locations().await?;
    let mut cameras = Vec::new();
    for (location_index, location) in locations.into_iter().enumerate() {
        debug!("  Location #{} '{}' has {} camera(s)", location_index, location.name, location.cameras.len());
        for (camera_index, camera) in location.cameras.into_iter().enumerate() {
            cameras.push(DiscoveredCamera {
                location_index,
                camera_index,
                location_name: location.name.clone(),
                camera,
            });
        }
    }
    debug!("Discovered {} camera(s) in {:?}", cameras.len(), start_time.elapsed());
    Ok(cameras)
}

pub struct CameraManager {
    cameras: Vec<DiscoveredCamera>,
}

impl CameraManager {
    pub async fn discover(service: &dyn CameraService) -> Result<Self, AppError> {
        debug!("🛠️ Discovering cameras...");
        let cameras = list_cameras(service).await?;
        info!("✅ CameraManager initialized with {} camera(s).", cameras.len());
        Ok(CameraManager { cameras })
    }

    pub fn all(&self) -> &[DiscoveredCamera] {
        &self.cameras
    }

    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    pub fn select(&self, location_index: usize, camera_index: usize) -> Result<&DiscoveredCamera, AppError> {
        self.cameras
            .iter()
            .find(|c| c.location_index == location_index && c.camera_index == camera_index)
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "No camera at location {} index {} ({} camera(s) discovered)",
                    location_index,
                    camera_index,
                    self.cameras.len()
                ))
            })
    }

    pub fn listing_lines(&self) -> Vec<String> {
        self.cameras
            .iter()
            .map(|c| format!("{}: {} / {} ({})", c.selector(), c.location_name, c.camera.name(), c.camera.model()))
            .collect()
    }
}

/// Parses a `loc,cam` selector such as "0,1".
pub fn parse_camera_selector(selector: &str) -> Result<(usize, usize), AppError> {
    let mut parts = selector.split(',').map(str::trim);
    let parsed = match (parts.next(), parts.next(), parts.next()) {
        (Some(loc), Some(cam), None) => loc.parse::<usize>().ok().zip(cam.parse::<usize>().ok()),
        _ => None,
    };
    parsed.ok_or_else(|| {
        AppError::Config(format!(
            "Invalid camera selector '{}', expected '<locationIndex>,<cameraIndex>' such as 0,0",
            selector
        ))
    })
}
