use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },

    #[error("could not load .env: {0}")]
    EnvFile(String),
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub telegram: TelegramConfig,
    pub monitor: MonitorConfig,
}

/// Credentials and endpoint for the Telegram Bot API.
#[derive(Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    pub chat_id: String,

    /// Base URL of the Bot API. Overridable so a local stub can stand in.
    pub api_base: String,
}

// The token must never end up in logs.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct MonitorConfig {
    /// Page that renders the asset table.
    pub url: String,

    /// Asset name as it appears in the table row, e.g. `satUSD-v1`.
    ///
    /// Also used as the marker text the extractor waits for before scanning.
    pub asset_name: String,

    /// Liquidity (USD) strictly above which an alert fires.
    pub liquidity_threshold: f64,

    // =========================
    // Cadence
    // =========================
    /// Seconds between poll cycles in continuous mode.
    pub check_interval_secs: u64,

    /// Navigation timeout per extraction attempt.
    pub page_timeout_secs: u64,

    /// Hours between "still alive" messages in continuous mode.
    pub heartbeat_interval_hours: u64,

    // =========================
    // Notification policy
    // =========================
    /// When true, only the rising edge (below/unknown -> above) notifies.
    /// When false, every poll above the threshold notifies.
    pub notify_on_change_only: bool,

    /// A failure alert goes out when the failure streak reaches this value
    /// and again at every multiple of it.
    pub max_failures_before_alert: u32,
}

impl MonitorConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }

    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_secs)
    }

    pub fn heartbeat_interval(&self) -> chrono::Duration {
        chrono::Duration::hours(self.heartbeat_interval_hours as i64)
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: "https://app.segment.finance/#/".to_string(),
            asset_name: "satUSD-v1".to_string(),
            liquidity_threshold: 100.0,

            // Every 30 minutes; one navigation may take up to a minute.
            check_interval_secs: 1800,
            page_timeout_secs: 60,
            heartbeat_interval_hours: 72,

            notify_on_change_only: false,
            max_failures_before_alert: 3,
        }
    }
}

impl AppConfig {
    /// Reads the process environment, after loading `.env` if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        env_file_loaded(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = MonitorConfig::default();

        let telegram = TelegramConfig {
            bot_token: required(&lookup, "TELEGRAM_BOT_TOKEN")?,
            chat_id: required(&lookup, "TELEGRAM_CHAT_ID")?,
            api_base: lookup("TELEGRAM_API_BASE")
                .map(|s| s.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.telegram.org".to_string()),
        };

        let monitor = MonitorConfig {
            url: lookup("MONITOR_URL").unwrap_or(defaults.url),
            asset_name: lookup("MONITOR_ASSET_NAME").unwrap_or(defaults.asset_name),
            liquidity_threshold: parsed(
                &lookup,
                "MONITOR_LIQUIDITY_THRESHOLD",
                defaults.liquidity_threshold,
            )?,
            check_interval_secs: positive(
                &lookup,
                "MONITOR_CHECK_INTERVAL_SECS",
                defaults.check_interval_secs,
            )?,
            page_timeout_secs: positive(
                &lookup,
                "MONITOR_PAGE_TIMEOUT_SECS",
                defaults.page_timeout_secs,
            )?,
            heartbeat_interval_hours: positive(
                &lookup,
                "MONITOR_HEARTBEAT_INTERVAL_HOURS",
                defaults.heartbeat_interval_hours,
            )?,
            notify_on_change_only: flag(
                &lookup,
                "MONITOR_NOTIFY_ON_CHANGE_ONLY",
                defaults.notify_on_change_only,
            )?,
            max_failures_before_alert: positive(
                &lookup,
                "MONITOR_MAX_FAILURES_BEFORE_ALERT",
                defaults.max_failures_before_alert as u64,
            )? as u32,
        };

        if !monitor.liquidity_threshold.is_finite() {
            return Err(ConfigError::Invalid {
                key: "MONITOR_LIQUIDITY_THRESHOLD",
                value: monitor.liquidity_threshold.to_string(),
            });
        }

        Ok(Self { telegram, monitor })
    }
}

/// A missing `.env` is the normal case in production; anything else is not.
fn env_file_loaded<T>(result: Result<T, dotenvy::Error>) -> Result<(), ConfigError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(ConfigError::EnvFile(e.to_string())),
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn parsed<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid { key, value: raw }),
    }
}

fn positive<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let v: u64 = parsed(lookup, key, default)?;
    if v == 0 || v > u32::MAX as u64 {
        return Err(ConfigError::Invalid {
            key,
            value: v.to_string(),
        });
    }
    Ok(v)
}

fn flag<F>(lookup: &F, key: &'static str, default: bool) -> Result<bool, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value: raw }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const CREDS: [(&str, &str); 2] = [("TELEGRAM_BOT_TOKEN", "123:abc"), ("TELEGRAM_CHAT_ID", "-100")];

    #[test]
    fn defaults_apply_when_only_credentials_are_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&CREDS)).unwrap();

        assert_eq!(cfg.monitor, MonitorConfig::default());
        assert_eq!(cfg.telegram.api_base, "https://api.telegram.org");
        assert_eq!(cfg.monitor.check_interval(), Duration::from_secs(1800));
        assert_eq!(cfg.monitor.heartbeat_interval(), chrono::Duration::hours(72));
    }

    #[test]
    fn missing_token_is_reported_by_name() {
        let err = AppConfig::from_lookup(lookup_from(&[("TELEGRAM_CHAT_ID", "1")])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("TELEGRAM_BOT_TOKEN"));
    }

    #[test]
    fn overrides_are_parsed() {
        let mut pairs = CREDS.to_vec();
        pairs.extend([
            ("MONITOR_LIQUIDITY_THRESHOLD", "2500.5"),
            ("MONITOR_NOTIFY_ON_CHANGE_ONLY", "yes"),
            ("MONITOR_CHECK_INTERVAL_SECS", "60"),
            ("TELEGRAM_API_BASE", "http://localhost:8081/"),
        ]);
        let cfg = AppConfig::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(cfg.monitor.liquidity_threshold, 2500.5);
        assert!(cfg.monitor.notify_on_change_only);
        assert_eq!(cfg.monitor.check_interval_secs, 60);
        assert_eq!(cfg.telegram.api_base, "http://localhost:8081");
    }

    #[test]
    fn bad_numbers_and_zero_intervals_are_rejected() {
        let mut pairs = CREDS.to_vec();
        pairs.push(("MONITOR_LIQUIDITY_THRESHOLD", "lots"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { key: "MONITOR_LIQUIDITY_THRESHOLD", .. })
        ));

        let mut pairs = CREDS.to_vec();
        pairs.push(("MONITOR_CHECK_INTERVAL_SECS", "0"));
        assert!(matches!(
            AppConfig::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { key: "MONITOR_CHECK_INTERVAL_SECS", .. })
        ));
    }

    #[test]
    fn only_a_missing_env_file_is_ignored() {
        let missing = std::io::Error::from(std::io::ErrorKind::NotFound);
        assert_eq!(env_file_loaded::<()>(Err(dotenvy::Error::Io(missing))), Ok(()));

        let malformed = dotenvy::Error::LineParse("TELEGRAM_CHAT_ID 'unterminated".into(), 17);
        assert!(matches!(
            env_file_loaded::<()>(Err(malformed)),
            Err(ConfigError::EnvFile(_))
        ));
    }

    #[test]
    fn debug_output_hides_the_token() {
        let cfg = AppConfig::from_lookup(lookup_from(&CREDS)).unwrap();
        let dbg = format!("{:?}", cfg.telegram);
        assert!(!dbg.contains("123:abc"));
        assert!(dbg.contains("<redacted>"));
    }
}
