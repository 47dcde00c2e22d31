use crate::core::app_context::AppContext;
use crate::core::camera_manager::CameraManager;
use anyhow::{Context, Result};
use log::{info, warn};

/// Lines printed by `--list`, one per camera, prefixed with its `--test` selector.
pub async fn list_camera_lines(ctx: &AppContext) -> Result<Vec<String>> {
    let manager = CameraManager::discover(ctx.service.as_ref())
        .await
        .context("Failed to list locations and cameras")?;
    if manager.is_empty() {
        warn!("⚠️ The account has no cameras.");
    }
    Ok(manager.listing_lines())
}

pub async fn handle_list_cli(ctx: &AppContext) -> Result<()> {
    let lines = list_camera_lines(ctx).await?;
    for line in &lines {
        println!("{}", line);
    }
    info!("📋 Listed {} camera(s).", lines.len());
    Ok(())
}
