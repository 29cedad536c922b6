use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf, time::Duration};

pub const API_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";
pub const UPSTREAM_BASE_URL_ENV: &str = "OPENWEATHERMAP_BASE_URL";
pub const UPSTREAM_TIMEOUT_ENV: &str = "OPENWEATHERMAP_TIMEOUT_SECS";
pub const DISABLE_TLS_VERIFY_ENV: &str = "OPENWEATHERMAP_DISABLE_SSL_VERIFY";
pub const BIND_ENV: &str = "WEATHERLY_BIND";
pub const API_BASE_URL_ENV: &str = "WEATHERLY_API_BASE_URL";

pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";

/// Settings for the HTTP listener of the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: DEFAULT_BIND.to_string() }
    }
}

/// Settings for calls to OpenWeatherMap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    pub base_url: String,
    pub timeout_secs: u64,

    /// Skips TLS certificate verification. Local development only.
    pub accept_invalid_certs: bool,
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            accept_invalid_certs: false,
        }
    }
}

/// Settings for the terminal client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL the gateway's `/weather` route hangs off, e.g. `http://localhost:8000/api`.
    pub api_base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self { api_base_url: DEFAULT_API_BASE_URL.to_string() }
    }
}

/// Process-wide configuration, loaded once at startup and read-only afterwards.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
///
/// [server]
/// bind = "0.0.0.0:8000"
///
/// [upstream]
/// timeout_secs = 10
/// ```
#[derive(Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub client: ClientConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("server", &self.server)
            .field("upstream", &self.upstream)
            .field("client", &self.client)
            .finish()
    }
}

impl Config {
    /// Returns the upstream API key; an empty value counts as unset.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Load the config file (if any) and apply environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut cfg = Self::load()?;
        cfg.apply_env(|name| std::env::var(name).ok())?;
        Ok(cfg)
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let cfg: Self = toml::from_str(contents)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values that would make every lookup fail.
    pub fn validate(&self) -> Result<()> {
        if self.upstream.timeout_secs == 0 {
            return Err(anyhow!("upstream timeout must be at least 1 second"));
        }
        Ok(())
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherly", "weatherly")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override fields from environment variables, read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(url) = lookup(UPSTREAM_BASE_URL_ENV) {
            self.upstream.base_url = url;
        }
        if let Some(secs) = lookup(UPSTREAM_TIMEOUT_ENV) {
            self.upstream.timeout_secs = secs
                .trim()
                .parse()
                .ok()
                .filter(|&s: &u64| s > 0)
                .ok_or_else(|| {
                    anyhow!("{UPSTREAM_TIMEOUT_ENV} must be a positive whole number of seconds, got '{secs}'")
                })?;
        }
        if let Some(flag) = lookup(DISABLE_TLS_VERIFY_ENV) {
            self.upstream.accept_invalid_certs = parse_flag(&flag)
                .ok_or_else(|| anyhow!("{DISABLE_TLS_VERIFY_ENV} must be true or false, got '{flag}'"))?;
        }
        if let Some(bind) = lookup(BIND_ENV) {
            self.server.bind = bind;
        }
        if let Some(url) = lookup(API_BASE_URL_ENV) {
            self.client.api_base_url = url;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
