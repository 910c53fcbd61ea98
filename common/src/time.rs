use chrono::{DateTime, Local};

/// Wall-clock format used in messages and console output.
pub const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub fn now() -> DateTime<Local> {
    Local::now()
}

pub fn display(ts: &DateTime<Local>) -> String {
    ts.format(DISPLAY_FORMAT).to_string()
}
