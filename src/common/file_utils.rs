use crate::common::timestamp_utils;
use crate::errors::AppError;
use image::{ImageFormat, Rgb, RgbImage};
use log::info;
use std::path::Path;

/// Lowercase, filesystem-safe version of a camera name ("Front Door" -> "front-door").
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let trimmed = slug.trim_matches('-');
    if trimmed.is_empty() {
        "camera".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Per-event snapshot filename. The event id keeps concurrent events apart,
/// the timestamp keeps repeated ids (e.g. test mode) apart.
pub fn generate_snapshot_filename(
    camera_name: &str,
    event_id: &str,
    timestamp_format: &str, // from config, e.g. "%Y%m%d_%H%M%S%3f"
    extension: &str,
) -> String {
    let timestamp = timestamp_utils::current_local_timestamp_str(timestamp_format);
    format!("{}_{}_{}.{}", slugify(camera_name), slugify(event_id), timestamp, extension)
}

/// Extension and MIME type for snapshot bytes, sniffed from the header.
pub fn image_kind(bytes: &[u8]) -> (&'static str, &'static str) {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => ("png", "image/png"),
        Ok(ImageFormat::Gif) => ("gif", "image/gif"),
        Ok(ImageFormat::WebP) => ("webp", "image/webp"),
        _ => ("jpg", "image/jpeg"),
    }
}

pub fn mime_for_path(path: &Path) -> &'static str {
    match path.extension().and_then(|e| e.to_str()).map(|e| e.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

/// Makes sure the fallback image exists, drawing a plain grey placeholder if not.
pub fn ensure_error_image(path: &Path) -> Result<(), AppError> {
    if path.is_file() {
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let placeholder = RgbImage::from_pixel(640, 360, Rgb([64, 64, 64]));
    placeholder
        .save_with_format(path, ImageFormat::Png)
        .map_err(|e| AppError::Io(format!("Failed to write placeholder error image '{}': {}", path.display(), e)))?;
    info!("🖼️ Generated placeholder error image at {}", path.display());
    Ok(())
}
