//! Evernote Bridge
//!
//! The note side of a Telegram → Evernote bot:
//! - ENML content synthesis from text, HTML and attached files
//! - An async Evernote client running blocking store calls on a bounded worker pool
//! - Appending new content to an existing note
//! - OAuth 1.0a account linking

pub mod enml;
pub mod error;
pub mod evernote;
pub mod oauth;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use error::{EvernoteError, StoreError};

use anyhow::Result;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

// ============================================================================
// YAML config structs (deserialization targets)
// ============================================================================

/// Top-level YAML configuration file structure
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: ServerYamlConfig,
    pub telegram: TelegramYamlConfig,
    pub evernote: EvernoteYamlConfig,
}

/// Server configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerYamlConfig {
    /// Public host the OAuth redirect reaches (no scheme)
    pub host: String,
}

impl Default for ServerYamlConfig {
    fn default() -> Self {
        Self {
            host: "localhost".into(),
        }
    }
}

/// Telegram configuration section
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TelegramYamlConfig {
    pub token: String,
    pub webhook_url: String,
}

/// Evernote configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvernoteYamlConfig {
    pub sandbox: bool,
    /// Size of the worker pool for blocking store calls
    pub max_workers: usize,
    /// Consumer credentials per access type (e.g. `basic`, `full`)
    pub access: HashMap<String, AccessCredentials>,
}

impl Default for EvernoteYamlConfig {
    fn default() -> Self {
        Self {
            sandbox: false,
            max_workers: evernote::pool::DEFAULT_POOL_SIZE,
            access: HashMap::new(),
        }
    }
}

/// Evernote API consumer key and secret
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AccessCredentials {
    pub key: String,
    pub secret: String,
}

// ============================================================================
// Runtime config (what the application actually uses)
// ============================================================================

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub webhook_url: String,
    pub telegram_token: String,
    pub sandbox: bool,
    pub max_workers: usize,
    pub access: HashMap<String, AccessCredentials>,
}

impl Config {
    /// Load configuration from environment variables only.
    /// Equivalent to from_yaml_and_env(None).
    pub fn from_env() -> Result<Self> {
        Self::from_yaml_and_env(None)
    }

    /// Load configuration from an optional YAML file, then override with env vars.
    ///
    /// Priority: env var > YAML > default
    ///
    /// If `yaml_path` is None, tries `DEFAULT_CONFIG_FILE` in CWD.
    pub fn from_yaml_and_env(yaml_path: Option<&Path>) -> Result<Self> {
        let yaml = Self::load_yaml(yaml_path);

        Ok(Self {
            host: std::env::var("PUBLIC_HOST").unwrap_or(yaml.server.host),
            webhook_url: std::env::var("WEBHOOK_URL").unwrap_or(yaml.telegram.webhook_url),
            telegram_token: std::env::var("TELEGRAM_TOKEN").unwrap_or(yaml.telegram.token),
            sandbox: std::env::var("EVERNOTE_SANDBOX")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(yaml.evernote.sandbox),
            max_workers: std::env::var("EVERNOTE_MAX_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(yaml.evernote.max_workers),
            access: yaml.evernote.access,
        })
    }

    /// Consumer credentials for an access type
    pub fn access_credentials(&self, access: &str) -> Option<&AccessCredentials> {
        self.access.get(access)
    }

    /// Read the bridge's YAML config. A missing or malformed file yields defaults.
    fn load_yaml(yaml_path: Option<&Path>) -> YamlConfig {
        let path = yaml_path.unwrap_or(Path::new(DEFAULT_CONFIG_FILE));

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                tracing::debug!(path = %path.display(), error = %e, "Bridge config not readable, using env vars / defaults");
                return YamlConfig::default();
            }
        };
        serde_yaml::from_str(&contents).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Invalid bridge config, using defaults");
            YamlConfig::default()
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================
