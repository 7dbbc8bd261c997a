use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// URL probed by the dashboard variant when `URLS_TO_MONITOR` is not set.
pub const FALLBACK_URL: &str = "https://www.google.com";

pub const ENV_URLS: &str = "URLS_TO_MONITOR";
pub const ENV_CONFIG_FILE: &str = "KEEPWARM_CONFIG";
pub const ENV_PING_INTERVAL: &str = "PING_INTERVAL_SECS";
pub const ENV_REQUEST_TIMEOUT: &str = "REQUEST_TIMEOUT_SECS";
pub const ENV_TARGET_SPACING: &str = "TARGET_SPACING_MS";
pub const ENV_PORT: &str = "PORT";

/// Which entry point is running. The two differ in their defaults and in how
/// they treat a missing target list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Prober plus web dashboard. Falls back to [`FALLBACK_URL`].
    Dashboard,
    /// Prober only. Refuses to start without targets.
    Standalone,
}

impl Variant {
    fn default_interval_secs(self) -> u64 {
        match self {
            Variant::Dashboard => 60,
            Variant::Standalone => 30,
        }
    }

    fn default_timeout_secs(self) -> u64 {
        match self {
            Variant::Dashboard => 15,
            Variant::Standalone => 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no URLs configured; set URLS_TO_MONITOR to a comma-separated list")]
    NoTargets,
    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}")]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Optional JSON file overlay. Every field may be omitted.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    urls: Vec<String>,
    ping_interval_secs: Option<u64>,
    request_timeout_secs: Option<u64>,
    target_spacing_ms: Option<u64>,
    api_port: Option<u16>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub urls: Vec<String>,
    pub ping_interval_secs: u64,
    pub request_timeout_secs: u64,
    pub target_spacing_ms: u64,
    pub api_port: u16,
}

fn default_api_port() -> u16 { 8080 }
fn default_target_spacing_ms() -> u64 { 1000 }

impl MonitorConfig {
    /// Variant defaults with no targets.
    pub fn defaults(variant: Variant) -> Self {
        Self {
            urls: Vec::new(),
            ping_interval_secs: variant.default_interval_secs(),
            request_timeout_secs: variant.default_timeout_secs(),
            target_spacing_ms: default_target_spacing_ms(),
            api_port: default_api_port(),
        }
    }

    /// Resolves the configuration from the process environment.
    pub fn from_env(variant: Variant) -> Result<Self, ConfigError> {
        Self::from_lookup(variant, |key| std::env::var(key).ok())
    }

    /// Resolves the configuration from defaults, the optional file named by
    /// `KEEPWARM_CONFIG` and environment overrides, in that order.
    pub fn from_lookup<F>(variant: Variant, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::defaults(variant);

        if let Some(path) = lookup(ENV_CONFIG_FILE).filter(|p| !p.trim().is_empty()) {
            config.apply_file(PathBuf::from(path))?;
        }

        if let Some(raw) = lookup(ENV_URLS) {
            let urls = parse_url_list(&raw);
            if !urls.is_empty() {
                config.urls = urls;
            }
        }
        if let Some(v) = parse_env(&lookup, ENV_PING_INTERVAL)? {
            config.ping_interval_secs = non_zero(ENV_PING_INTERVAL, v)?;
        }
        if let Some(v) = parse_env(&lookup, ENV_REQUEST_TIMEOUT)? {
            config.request_timeout_secs = non_zero(ENV_REQUEST_TIMEOUT, v)?;
        }
        if let Some(v) = parse_env(&lookup, ENV_TARGET_SPACING)? {
            config.target_spacing_ms = v;
        }
        if let Some(v) = parse_env(&lookup, ENV_PORT)? {
            config.api_port = v;
        }

        if config.urls.is_empty() {
            match variant {
                Variant::Standalone => return Err(ConfigError::NoTargets),
                Variant::Dashboard => {
                    tracing::warn!(
                        "{} is not set; monitoring the sample URL {}",
                        ENV_URLS,
                        FALLBACK_URL
                    );
                    config.urls = vec![FALLBACK_URL.to_string()];
                }
            }
        }

        Ok(config)
    }

    fn apply_file(&mut self, path: PathBuf) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadFile {
            path: path.clone(),
            source,
        })?;
        let file: FileConfig = serde_json::from_str(&content)
            .map_err(|source| ConfigError::ParseFile { path, source })?;

        let urls: Vec<String> = file
            .urls
            .iter()
            .map(|u| u.trim())
            .filter(|u| !u.is_empty())
            .map(String::from)
            .collect();
        if !urls.is_empty() {
            self.urls = urls;
        }
        if let Some(v) = file.ping_interval_secs {
            self.ping_interval_secs = non_zero("ping_interval_secs", v)?;
        }
        if let Some(v) = file.request_timeout_secs {
            self.request_timeout_secs = non_zero("request_timeout_secs", v)?;
        }
        if let Some(v) = file.target_spacing_ms {
            self.target_spacing_ms = v;
        }
        if let Some(v) = file.api_port {
            self.api_port = v;
        }
        Ok(())
    }

    pub fn ping_interval(&self) -> Duration {
        Duration::from_secs(self.ping_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn target_spacing(&self) -> Duration {
        Duration::from_millis(self.target_spacing_ms)
    }
}

/// Splits a comma-separated URL list, trimming entries and dropping blanks.
pub fn parse_url_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(String::from)
        .collect()
}

/// A zero timeout fails every request and a zero interval spins the loop.
fn non_zero(key: &'static str, value: u64) -> Result<u64, ConfigError> {
    if value == 0 {
        return Err(ConfigError::InvalidValue {
            key,
            value: value.to_string(),
        });
    }
    Ok(value)
}

fn parse_env<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}
