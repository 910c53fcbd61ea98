//! Message bodies, rendered for Telegram's HTML parse mode.
//!
//! Every function here is pure: same inputs, same text.

use chrono::{DateTime, Local};
use common::MonitorConfig;
use common::time::display;

pub fn threshold_alert(config: &MonitorConfig, value: f64, checked_at: &DateTime<Local>) -> String {
    format!(
        "🔔 <b>Liquidity alert</b>\n\n\
         📊 Asset: {asset}\n\
         💰 Current liquidity: <b>{value}</b>\n\
         📈 Threshold: {threshold}\n\
         🔗 <a href='{url}'>View details</a>\n\n\
         ⏰ Checked at: {at}",
        asset = escape(&config.asset_name),
        value = usd(value),
        threshold = usd(config.liquidity_threshold),
        url = escape(&config.url),
        at = display(checked_at),
    )
}

pub fn failure_alert(
    config: &MonitorConfig,
    consecutive_failures: u32,
    last_success: Option<&DateTime<Local>>,
    now: &DateTime<Local>,
) -> String {
    format!(
        "⚠️ <b>Liquidity monitor failing</b>\n\n\
         ❌ {consecutive_failures} consecutive checks failed\n\
         📊 Asset: {asset}\n\
         🔗 <a href='{url}'>Open page</a>\n\
         ✅ Last success: {last}\n\n\
         ⏰ Time: {at}",
        asset = escape(&config.asset_name),
        url = escape(&config.url),
        last = last_success.map(display).unwrap_or_else(|| "never".to_string()),
        at = display(now),
    )
}

pub fn heartbeat(
    config: &MonitorConfig,
    last_success: Option<&DateTime<Local>>,
    now: &DateTime<Local>,
) -> String {
    format!(
        "💓 <b>Liquidity monitor heartbeat</b>\n\n\
         📊 Asset: {asset}\n\
         ⏱ Check interval: {interval}\n\
         📈 Threshold: {threshold}\n\
         ✅ Last success: {last}\n\n\
         ⏰ Time: {at}",
        asset = escape(&config.asset_name),
        interval = interval(config.check_interval_secs),
        threshold = usd(config.liquidity_threshold),
        last = last_success.map(display).unwrap_or_else(|| "never".to_string()),
        at = display(now),
    )
}

pub fn startup_notice(config: &MonitorConfig, started_at: &DateTime<Local>) -> String {
    format!(
        "🚀 <b>Liquidity monitor started</b>\n\n\
         📊 Asset: {asset}\n\
         ⏱ Check interval: {interval}\n\
         📈 Threshold: {threshold}\n\n\
         ⏰ Started at: {at}",
        asset = escape(&config.asset_name),
        interval = interval(config.check_interval_secs),
        threshold = usd(config.liquidity_threshold),
        at = display(started_at),
    )
}

pub fn connection_test() -> String {
    "🔔 <b>Liquidity monitor test</b>\n\nConnection OK!".to_string()
}

fn usd(v: f64) -> String {
    format!("${v:.2}")
}

fn interval(secs: u64) -> String {
    match secs {
        s if s % 3600 == 0 => format!("{s} s ({} h)", s / 3600),
        s if s % 60 == 0 => format!("{s} s ({} min)", s / 60),
        s => format!("{s} s"),
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('\'', "&#39;")
}
