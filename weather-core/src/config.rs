use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::{fmt, fs, path::PathBuf};

pub const DEFAULT_BASE_URL: &str = "https://api.weatherapi.com/v1";

pub const API_KEY_ENV: &str = "WEATHERAPI_KEY";
pub const BASE_URL_ENV: &str = "WEATHERAPI_BASE_URL";

/// Immutable settings a [`WeatherClient`](crate::WeatherClient) is built with.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub api_key: String,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self { base_url: DEFAULT_BASE_URL.to_string(), api_key: api_key.into() }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// base_url = "https://api.weatherapi.com/v1"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    pub api_key: Option<String>,

    /// Overrides [`DEFAULT_BASE_URL`], mainly for pointing at a stub server.
    pub base_url: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
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

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "city-weather", "weather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// `None` or an empty string resets to the default endpoint.
    pub fn set_base_url(&mut self, base_url: Option<String>) {
        self.base_url = base_url.filter(|s| !s.trim().is_empty());
    }

    /// Overlay values from the process environment.
    pub fn apply_env(self) -> Self {
        self.with_env_overrides(|name| std::env::var(name).ok())
    }

    /// Non-empty values returned by `lookup` for [`API_KEY_ENV`] and
    /// [`BASE_URL_ENV`] replace the stored ones.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(key) = non_empty(API_KEY_ENV) {
            self.api_key = Some(key);
        }
        if let Some(url) = non_empty(BASE_URL_ENV) {
            self.base_url = Some(url);
        }
        self
    }

    /// Resolve into a [`ClientConfig`], checking that a key is present and the
    /// endpoint is a usable http(s) URL.
    pub fn client_config(&self) -> Result<ClientConfig> {
        let api_key = self.api_key.as_deref().filter(|k| !k.trim().is_empty()).ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `weather configure` or set {API_KEY_ENV}."
            )
        })?;

        let base_url = self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let parsed =
            Url::parse(base_url).with_context(|| format!("Invalid base URL '{base_url}'"))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            bail!("Invalid base URL '{base_url}': scheme must be http or https");
        }

        Ok(ClientConfig::new(api_key).with_base_url(base_url))
    }
}
