// Application settings
// Loaded from ~/.config/mentordesk/settings.json, then overridden by
// MENTORDESK_* environment variables.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const ENV_API_BASE_URL: &str = "MENTORDESK_API_BASE_URL";
pub const ENV_IMAGE_BASE_URL: &str = "MENTORDESK_IMAGE_BASE_URL";
pub const ENV_APP_TITLE: &str = "MENTORDESK_APP_TITLE";

const DEFAULT_API_BASE_URL: &str = "http://localhost:8000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("{field} is not a valid URL ({value}): {reason}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// REST backend root, e.g. "https://api.example.com/api"
    #[serde(rename = "api.baseUrl")]
    pub api_base_url: String,

    /// Host that serves uploaded assets (testimony photos, static assets)
    #[serde(rename = "assets.baseUrl", skip_serializing_if = "Option::is_none")]
    pub image_base_url: Option<String>,

    #[serde(rename = "app.title", skip_serializing_if = "Option::is_none")]
    pub app_title: Option<String>,

    /// Transport timeout per HTTP call
    #[serde(rename = "http.timeoutSecs")]
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            image_base_url: None,
            app_title: None,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mentordesk")
            .join("settings.json")
    }

    /// Load settings from the default location plus environment overrides.
    ///
    /// A missing file is not an error. A malformed one is logged and
    /// replaced by defaults so the CLI stays usable.
    pub fn load() -> Self {
        let path = Self::config_path();
        let mut settings = match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("{}; using default settings", e);
                Self::default()
            }
        };
        settings.apply_env();
        settings
    }

    /// Load settings from an explicit path. Missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        // Strip comments (lines starting with //)
        let cleaned: String = contents
            .lines()
            .filter(|line| !line.trim().starts_with("//"))
            .collect::<Vec<_>>()
            .join("\n");

        let settings: Self = serde_json::from_str(&cleaned).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Apply MENTORDESK_* overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary lookup. Empty values count as unset.
    pub fn apply_env_with(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(ENV_API_BASE_URL) {
            self.api_base_url = v;
        }
        if let Some(v) = get(ENV_IMAGE_BASE_URL) {
            self.image_base_url = Some(v);
        }
        if let Some(v) = get(ENV_APP_TITLE) {
            self.app_title = Some(v);
        }
    }

    /// Check that configured URLs parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("api.baseUrl", &self.api_base_url)?;
        if let Some(ref image) = self.image_base_url {
            check_url("assets.baseUrl", image)?;
        }
        Ok(())
    }

    /// API base without a trailing slash, ready for `format!("{}{}", base, path)`.
    pub fn api_base(&self) -> &str {
        self.api_base_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }

    /// Save current settings to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |source| ConfigError::Write {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(write_err)?;
        }

        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(write_err)
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    url::Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidUrl {
            field,
            value: value.to_string(),
            reason: e.to_string(),
        })
}
