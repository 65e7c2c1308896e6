use std::{collections::HashMap, fs, time::Duration};

use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001";
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_QUOTE_INTERVAL: Duration = Duration::from_secs(30);

pub const SNAPSHOT_PATH: &str = "/api/vitals";
pub const STREAM_PATH: &str = "/api/vitals-stream";

#[derive(Debug, Clone)]
pub struct Settings {
    pub base_url: String,
    pub reconnect_delay: Duration,
    pub quote_interval: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            quote_interval: DEFAULT_QUOTE_INTERVAL,
        }
    }
}

impl Settings {
    pub fn snapshot_url(&self) -> String {
        format!("{}{SNAPSHOT_PATH}", self.base_url.trim_end_matches('/'))
    }

    pub fn stream_url(&self) -> String {
        format!("{}{STREAM_PATH}", self.base_url.trim_end_matches('/'))
    }

    /// Validates the configured base URL. Called once at startup so a typo
    /// fails fast instead of surfacing as endless reconnect churn.
    pub fn parsed_base_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.base_url)
    }
}

/// Layered settings load: compiled defaults, then `dashboard.toml` in the
/// working directory, then environment variables.
pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string("dashboard.toml") {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(&raw) {
            if let Some(v) = file_cfg.get("base_url") {
                settings.base_url = v.clone();
            }
            if let Some(v) = file_cfg.get("reconnect_seconds") {
                if let Ok(parsed) = v.parse::<u64>() {
                    settings.reconnect_delay = Duration::from_secs(parsed);
                }
            }
            if let Some(v) = file_cfg.get("quote_seconds") {
                if let Ok(parsed) = v.parse::<u64>() {
                    settings.quote_interval = Duration::from_secs(parsed);
                }
            }
        }
    }

    if let Ok(v) = std::env::var("VITALS_BASE_URL") {
        settings.base_url = v;
    }
    if let Ok(v) = std::env::var("VITALS_RECONNECT_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.reconnect_delay = Duration::from_secs(parsed);
        }
    }
    if let Ok(v) = std::env::var("VITALS_QUOTE_SECONDS") {
        if let Ok(parsed) = v.parse::<u64>() {
            settings.quote_interval = Duration::from_secs(parsed);
        }
    }

    settings
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_target_localhost_5001() {
        let settings = Settings::default();
        assert_eq!(settings.snapshot_url(), "http://localhost:5001/api/vitals");
        assert_eq!(
            settings.stream_url(),
            "http://localhost:5001/api/vitals-stream"
        );
        assert_eq!(settings.reconnect_delay, Duration::from_secs(5));
        assert_eq!(settings.quote_interval, Duration::from_secs(30));
    }

    #[test]
    fn endpoint_urls_tolerate_trailing_slash() {
        let settings = Settings {
            base_url: "http://vitals.internal:8080/".into(),
            ..Settings::default()
        };
        assert_eq!(
            settings.snapshot_url(),
            "http://vitals.internal:8080/api/vitals"
        );
    }

    #[test]
    fn rejects_unparseable_base_url() {
        let settings = Settings {
            base_url: "not a url".into(),
            ..Settings::default()
        };
        assert!(settings.parsed_base_url().is_err());
        assert!(Settings::default().parsed_base_url().is_ok());
    }
}
