use env_logger::Builder;
use log::LevelFilter;
use crate::config_loader::MasterConfig;

pub fn initialize_logging(config: Option<&MasterConfig>, cli_matches: &clap::ArgMatches) {
    let mut builder = Builder::new();

    // Determine log level from CLI, then config, then default
    let log_level_str = if cli_matches.get_flag("debug") {
        "debug".to_string()
    } else {
        config
            .and_then(|c| c.app_settings.log_level.clone())
            .unwrap_or_else(|| "info".to_string())
    };

    let (level, recognized) = parse_level(&log_level_str);
    builder.filter_level(level);
    // reqwest/hyper are chatty at debug
    builder.filter_module("hyper", LevelFilter::Warn);
    builder.filter_module("reqwest", LevelFilter::Warn);

    builder.try_init().unwrap_or_else(|e| {
        eprintln!("Failed to initialize logger: {}. Logging might not work as expected.", e);
    });

    if !recognized {
        log::warn!("Unrecognized log level '{}', defaulting to info.", log_level_str);
    }
}

fn parse_level(level: &str) -> (LevelFilter, bool) {
    match level.to_lowercase().as_str() {
        "error" => (LevelFilter::Error, true),
        "warn" => (LevelFilter::Warn, true),
        "info" => (LevelFilter::Info, true),
        "debug" => (LevelFilter::Debug, true),
        "trace" => (LevelFilter::Trace, true),
        _ => (LevelFilter::Info, false),
    }
}
