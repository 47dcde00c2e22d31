use crate::core::camera_manager::parse_camera_selector;
use crate::errors::AppError;
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Default: poll every camera and forward events until interrupted.
    Watch,
    Test { location_index: usize, camera_index: usize },
    List,
}

pub fn build_cli() -> Command {
    debug!("⚙️ Building CLI interface...");
    Command::new("ringtv")
        .version("0.1.0")
        .about("Forwards Ring camera events with a snapshot to a PiPup overlay on Android TV.")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Sets a custom configuration file")
                .action(ArgAction::Set)
        )
        .arg(
            Arg::new("debug")
                .short('d')
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("test")
                .long("test")
                .value_name("LOC,CAM")
                .help("Send one test snapshot from the given camera (default 0,0) and exit")
                .num_args(0..=1)
                .default_missing_value("0,0")
                .conflicts_with("list")
                .action(ArgAction::Set)
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("List locations and cameras with their indices and exit")
                .action(ArgAction::SetTrue)
        )
}

pub fn run_mode(matches: &ArgMatches) -> Result<RunMode, AppError> {
    if matches.get_flag("list") {
        return Ok(RunMode::List);
    }
    if let Some(selector) = matches.get_one::<String>("test") {
        let (location_index, camera_index) = parse_camera_selector(selector)?;
        return Ok(RunMode::Test { location_index, camera_index });
    }
    Ok(RunMode::Watch)
}
