//! Sitrep configuration.
//!
//! Loaded from `~/.sitrep/config.toml`. A missing file is a valid empty
//! config — only the drafting and tracker commands need their sections,
//! and they fail with setup instructions when unconfigured. API keys and
//! tokens are never stored in the file; the config names the environment
//! variables that hold them.

use std::path::PathBuf;
use std::{env, fs};

use serde::Deserialize;

/// Sitrep configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub ai: Option<AiConfig>,
    pub tracker: Option<TrackerConfig>,
}

/// Drafting model configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AiConfig {
    /// Base URL of an OpenAI-compatible API.
    #[serde(default = "default_host")]
    pub host: String,

    /// Model name passed through to the API.
    pub model: String,

    /// Environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Issue-tracker configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrackerConfig {
    /// Base URL of the tracker, e.g. `https://example.atlassian.net`.
    pub base_url: String,

    /// Environment variable holding the access token.
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_host() -> String {
    "https://api.openai.com".to_string()
}

fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_token_env() -> String {
    "SITREP_TRACKER_TOKEN".to_string()
}

impl Config {
    /// Load config from `~/.sitrep/config.toml`.
    ///
    /// A missing file yields the empty default; an unparseable one is an
    /// error.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::path() else {
            return Err("could not determine home directory".to_string());
        };

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        toml::from_str(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// The config file path: `~/.sitrep/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".sitrep").join("config.toml"))
    }

    /// The drafting section, or setup instructions.
    pub fn ai(&self) -> Result<&AiConfig, String> {
        self.ai.as_ref().ok_or_else(|| {
            "drafting is not configured\n\
             Add to ~/.sitrep/config.toml:\n\n\
             [ai]\n\
             model = \"gpt-4o\"\n\
             # host = \"https://api.openai.com\"\n\
             # api-key-env = \"OPENAI_API_KEY\""
                .to_string()
        })
    }

    /// The tracker section, or setup instructions.
    pub fn tracker(&self) -> Result<&TrackerConfig, String> {
        self.tracker.as_ref().ok_or_else(|| {
            "no issue tracker configured\n\
             Add to ~/.sitrep/config.toml:\n\n\
             [tracker]\n\
             base-url = \"https://example.atlassian.net\"\n\
             # token-env = \"SITREP_TRACKER_TOKEN\""
                .to_string()
        })
    }
}

impl AiConfig {
    /// Reads the API key from the configured environment variable.
    pub fn api_key(&self) -> Result<String, String> {
        env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| format!("set {} to your API key", self.api_key_env))
    }
}

impl TrackerConfig {
    /// Reads the access token from the configured environment variable.
    pub fn token(&self) -> Result<String, String> {
        env::var(&self.token_env)
            .ok()
            .filter(|token| !token.is_empty())
            .ok_or_else(|| format!("set {} to your tracker token", self.token_env))
    }
}
