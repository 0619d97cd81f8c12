use std::path::Path;

use anyhow::anyhow;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { base_url: default_base_url() }
    }
}

/// Where the logged-in user id survives between runs.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_store_path")]
    pub store_path: String,
    #[serde(default = "default_session_key")]
    pub key: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { store_path: default_store_path(), key: default_session_key() }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { format: LogFormat::default(), filter: default_log_filter() }
    }
}

fn default_base_url() -> String { "http://127.0.0.1:5000".into() }
fn default_store_path() -> String { "data/session.json".into() }
fn default_session_key() -> String { "loggedInUserId".into() }
fn default_log_filter() -> String { "warn".into() }

/// Path from `CONFIG_PATH`, falling back to `config.toml`.
pub fn default_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

/// Load the file if it exists; a missing file means built-in defaults.
pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(AppConfig::default());
    }
    load_from_file(path)
}

pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    AppConfig::from_toml_str(&content)
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let cfg: AppConfig = toml::from_str(content)?;
        Ok(cfg)
    }

    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(default_path())
    }

    pub fn load_and_validate_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut cfg = load_or_default(path)?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.apply_env_overrides(|key| std::env::var(key).ok());
        self.validate()
    }

    /// `API_BASE_URL` and `SESSION_STORE_PATH` win over the file.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("API_BASE_URL").filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(path) = lookup("SESSION_STORE_PATH").filter(|v| !v.trim().is_empty()) {
            self.session.store_path = path;
        }
    }

    pub fn validate(&mut self) -> Result<()> {
        self.api.normalize()?;
        self.session.validate()?;
        Ok(())
    }
}

impl ApiConfig {
    fn normalize(&mut self) -> Result<()> {
        let trimmed = self.base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(anyhow!("api.base_url is empty; set it in config.toml or API_BASE_URL"));
        }
        let lower = trimmed.to_lowercase();
        if !(lower.starts_with("http://") || lower.starts_with("https://")) {
            return Err(anyhow!("api.base_url must start with http:// or https://"));
        }
        self.base_url = trimmed.to_string();
        Ok(())
    }
}

impl SessionConfig {
    fn validate(&self) -> Result<()> {
        if self.key.trim().is_empty() {
            return Err(anyhow!("session.key must not be empty"));
        }
        if self.store_path.trim().is_empty() {
            return Err(anyhow!("session.store_path must not be empty"));
        }
        Ok(())
    }
}
