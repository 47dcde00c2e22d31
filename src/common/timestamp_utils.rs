use chrono::{DateTime, Local};

// Get current local timestamp as a formatted string
pub fn current_local_timestamp_str(format_str: &str) -> String {
    let now: DateTime<Local> = Local::now();
    now.format(format_str).to_string()
}

/// Human readable arrival time used in event log lines.
pub fn arrival_time_str(at: &DateTime<Local>) -> String {
    at.format("%a %b %e %Y %H:%M:%S").to_string()
}
