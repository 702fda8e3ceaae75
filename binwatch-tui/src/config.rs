use std::env;
use std::path::PathBuf;
use std::time::Duration;

use binwatch_core::sync::DEFAULT_POLL_INTERVAL;
use binwatch_provider_firebase::DEFAULT_BASE_URL;
use thiserror::Error;

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
pub(crate) struct AppConfig {
    pub base_url: String,
    pub poll_interval: Duration,
    pub http_timeout: Duration,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone)]
pub(crate) struct LoggingConfig {
    pub level: String,
    pub dir: PathBuf,
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("invalid value for {key}: {value:?} (expected milliseconds)")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}

impl AppConfig {
    pub(crate) fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let base_url = var("BINWATCH_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_owned());
        let poll_interval = parse_millis(
            "BINWATCH_POLL_INTERVAL_MS",
            var("BINWATCH_POLL_INTERVAL_MS"),
            DEFAULT_POLL_INTERVAL,
        )?;
        let http_timeout = parse_millis(
            "BINWATCH_HTTP_TIMEOUT_MS",
            var("BINWATCH_HTTP_TIMEOUT_MS"),
            DEFAULT_HTTP_TIMEOUT,
        )?;

        let logging = LoggingConfig {
            level: var("BINWATCH_LOG_LEVEL").unwrap_or_else(|| "info".to_owned()),
            dir: var("BINWATCH_LOG_DIR").map_or_else(|| PathBuf::from("logs"), PathBuf::from),
        };

        Ok(Self {
            base_url,
            poll_interval,
            http_timeout,
            logging,
        })
    }
}

fn parse_millis(
    key: &'static str,
    raw: Option<String>,
    default: Duration,
) -> Result<Duration, ConfigError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let millis = raw
        .trim()
        .parse::<u64>()
        .map_err(|_err| ConfigError::InvalidNumber { key, value: raw.clone() })?;
    if millis == 0 {
        return Err(ConfigError::Zero(key));
    }
    Ok(Duration::from_millis(millis))
}
