pub mod config;
pub mod logger;
pub mod time;

pub use config::{AppConfig, ConfigError, MonitorConfig, TelegramConfig};
