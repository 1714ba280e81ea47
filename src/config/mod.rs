// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for NeuroSync

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    /// Language model endpoint used for coaching content
    #[serde(default)]
    pub llm: LlmConfig,

    /// Web UI settings
    #[serde(default)]
    pub web: WebConfig,

    /// Wearable simulation settings
    #[serde(default)]
    pub wearable: WearableConfig,

    /// Insight generation settings
    #[serde(default)]
    pub insights: InsightConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API (without `/chat/completions`)
    #[serde(default = "default_llm_url")]
    pub url: String,
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Explicit API key; takes priority over `api_key_env`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub retries: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_host")]
    pub host: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// User shown when a page is requested without `?user=`
    #[serde(default = "default_user")]
    pub default_user: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WearableConfig {
    #[serde(default = "default_device")]
    pub default_device: String,
    /// Fixed seed for mock data; random when unset
    #[serde(default)]
    pub mock_seed: Option<u64>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct InsightConfig {
    #[serde(default = "default_timeframe")]
    pub progress_timeframe_days: u32,
}

// Default value functions
fn default_llm_url() -> String { "https://api.openai.com/v1".to_string() }
fn default_model() -> String { "gpt-4o".to_string() }
fn default_api_key_env() -> String { "OPENAI_API_KEY".to_string() }
fn default_timeout() -> u64 { 60 }
fn default_web_host() -> String { "127.0.0.1".to_string() }
fn default_web_port() -> u16 { 8501 }
fn default_user() -> String { "guest".to_string() }
fn default_device() -> String { "Apple Watch".to_string() }
fn default_timeframe() -> u32 { 30 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            url: default_llm_url(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            api_key: None,
            timeout_secs: default_timeout(),
            retries: 0,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_web_host(),
            port: default_web_port(),
            default_user: default_user(),
        }
    }
}

impl Default for WearableConfig {
    fn default() -> Self {
        Self {
            default_device: default_device(),
            mock_seed: None,
        }
    }
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            progress_timeframe_days: default_timeframe(),
        }
    }
}

impl LlmConfig {
    /// Resolve the API key from config or environment. Blank keys count as absent.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(&self.api_key_env).ok())
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| crate::NeuroSyncError::Config(format!("Failed to parse config: {}", e)))?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.llm.url.trim().is_empty() {
            return Err(crate::NeuroSyncError::Config("llm.url must not be empty".to_string()));
        }
        if self.web.default_user.trim().is_empty() {
            return Err(crate::NeuroSyncError::Config("web.default_user must not be empty".to_string()));
        }
        if self.insights.progress_timeframe_days == 0 {
            return Err(crate::NeuroSyncError::Config(
                "insights.progress_timeframe_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.json")).unwrap();
        assert_eq!(config.web.port, 8501);
        assert_eq!(config.llm.model, "gpt-4o");
        assert_eq!(config.llm.retries, 0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = AppConfig::default();
        config.web.port = 9000;
        config.wearable.mock_seed = Some(7);
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.web.port, 9000);
        assert_eq!(loaded.wearable.mock_seed, Some(7));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "web": { "port": 3000 } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.web.port, 3000);
        assert_eq!(config.web.default_user, "guest");
        assert_eq!(config.insights.progress_timeframe_days, 30);
    }

    #[test]
    fn test_invalid_timeframe_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "insights": { "progress_timeframe_days": 0 } }"#).unwrap();
        assert!(AppConfig::load(&path).is_err());
    }

    #[test]
    fn test_explicit_key_wins_and_blank_is_absent() {
        let mut llm = LlmConfig {
            api_key_env: "NEUROSYNC_TEST_KEY_UNSET".to_string(),
            ..LlmConfig::default()
        };
        assert_eq!(llm.resolve_api_key(), None);

        llm.api_key = Some("   ".to_string());
        assert_eq!(llm.resolve_api_key(), None);

        llm.api_key = Some(" sk-test ".to_string());
        assert_eq!(llm.resolve_api_key().as_deref(), Some("sk-test"));
    }
}
