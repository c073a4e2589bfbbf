//! Configuration management for blockcoach
//!
//! Stores settings in ~/.config/blockcoach/config.json

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// lmdeploy's api_server listens on 23333 by default
pub const DEFAULT_ENDPOINT: &str = "http://localhost:23333/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "OpenGVLab/InternVL3-14B";
pub const DEFAULT_HISTORY_MAX_CHARS: usize = 3000;
pub const DEFAULT_PROBLEM: &str =
    "Problem: Compute the required sum using a loop. Student uses block code in the image.";

const API_KEY_ENV: &str = "BLOCKCOACH_API_KEY";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenAI-compatible chat-completions URL of the vision model server
    pub endpoint: String,
    pub model: String,
    /// Transcript characters passed to each prompt
    pub history_max_chars: usize,
    /// Optional deadline for a single model call
    pub request_timeout_secs: Option<u64>,
    /// Problem statement used at startup and after a reset
    pub default_problem: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            history_max_chars: DEFAULT_HISTORY_MAX_CHARS,
            request_timeout_secs: None,
            default_problem: DEFAULT_PROBLEM.to_string(),
        }
    }
}

impl Config {
    /// Get the config directory path
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("blockcoach"))
    }

    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.json"))
    }

    /// Load config from disk, or return default
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                preserve_corrupt_config(path, &content);
                warn!(
                    path = %path.display(),
                    "config file was corrupted ({}); a backup was saved and defaults were loaded",
                    err
                );
                Self::default()
            }
        }
    }

    /// Save config to disk
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path().context("Could not determine config directory")?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// API key for the model server: environment first, then the system keychain.
    /// Local servers usually need none.
    pub fn api_key(&self) -> Option<String> {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.trim().is_empty() {
                return Some(key);
            }
        }
        crate::keyring::get_api_key()
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

fn preserve_corrupt_config(path: &Path, content: &str) {
    let backup = path.with_extension("json.bak");
    if let Err(err) = fs::write(&backup, content) {
        warn!(path = %backup.display(), "failed to back up corrupt config: {}", err);
    }
}
