use anyhow::{bail, Context, Result};
use log::{debug, error, info, warn};
use ringtv::bootstrap;
use ringtv::cli::{self, RunMode};
use ringtv::common::{file_utils, logging_setup};
use ringtv::config_loader::{self, DEFAULT_CONFIG_PATH};
use ringtv::core::app_context::AppContext;
use ringtv::notification::pipup_sender::PipupSender;
use ringtv::notification::Completion;
use ringtv::operations::{list_op, snapshot_test_op, watch_op};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let main_start_time = Instant::now();
    let matches = cli::build_cli().get_matches();

    let explicit_config = matches.get_one::<String>("config");
    let config_path = explicit_config.map(|s| s.as_str()).unwrap_or(DEFAULT_CONFIG_PATH);

    let master_config = match config_loader::load_config(config_path, explicit_config.is_some()) {
        Ok(cfg) => {
            logging_setup::initialize_logging(Some(&cfg), &matches);
            cfg
        }
        Err(e) => {
            logging_setup::initialize_logging(None, &matches);
            error!("❌ Failed to load configuration from '{}': {:#}. Exiting.", config_path, e);
            return Err(e.context(format!("Failed to load configuration from '{}'", config_path)));
        }
    };

    let mode = cli::run_mode(&matches)?;
    debug!("🎬 Run mode: {:?}", mode);

    if let Err(e) = file_utils::ensure_error_image(Path::new(&master_config.app_settings.error_image_path)) {
        warn!("⚠️ No usable error image, failed snapshots will be sent without a picture: {:#}", e);
    }

    let session = match bootstrap::establish_session(&master_config).await {
        Ok(session) => session,
        Err(e) => {
            error!("❌ Could not start a Ring session: {:#}", e);
            return Err(e).context("Startup failed before any subscription");
        }
    };
    let sender = PipupSender::new(&master_config.notification).context("Failed to create notification sender")?;
    info!("📺 Notifications go to {}", sender.endpoint());

    let ctx = AppContext::new(master_config, Arc::new(session), Arc::new(sender));

    match mode {
        RunMode::List => list_op::handle_list_cli(&ctx).await?,
        RunMode::Test { location_index, camera_index } => {
            match snapshot_test_op::handle_snapshot_test_cli(&ctx, location_index, camera_index).await? {
                Completion::Exit { code } if code != 0 => bail!("Test notification was not delivered (exit code {})", code),
                _ => {}
            }
        }
        RunMode::Watch => {
            let shutdown = ctx.shutdown.clone();
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("🛑 Interrupt received.");
                        shutdown.cancel();
                    }
                    Err(e) => error!("❌ Failed to listen for shutdown signal: {}", e),
                }
            });
            watch_op::handle_watch_cli(&ctx).await?;
        }
    }

    info!("🏁 ringtv finished in {:?}.", main_start_time.elapsed());
    Ok(())
}
