//! Configuration management
//!
//! Loads configuration from config.toml with support for:
//! - Sign-in and GraphQL endpoints
//! - Location of the session database
//! - HTTP timeout

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_CONFIG: &str = include_str!("../config.toml");

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub endpoints: EndpointsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointsConfig {
    /// Sign-in endpoint returning the session token
    pub auth: String,
    /// GraphQL endpoint for the profile query
    pub graphql: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    /// SQLite file holding the session slot. Empty uses the platform data directory.
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load from config.toml or use defaults
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load from specific path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let content = std::fs::read_to_string(path).context("Failed to read config file")?;
            toml::from_str(&content).context("Failed to parse config file")
        } else {
            toml::from_str(DEFAULT_CONFIG).context("Failed to parse default config")
        }
    }

    /// Sign-in endpoint (AUTH_API takes precedence)
    pub fn auth_url(&self) -> String {
        env_or("AUTH_API", &self.endpoints.auth)
    }

    /// GraphQL endpoint (GRAPHQL_API takes precedence)
    pub fn graphql_url(&self) -> String {
        env_or("GRAPHQL_API", &self.endpoints.graphql)
    }

    /// Session database path (PROFILE_SESSION_DB takes precedence)
    pub fn session_path(&self) -> Result<PathBuf> {
        let configured = env_or("PROFILE_SESSION_DB", &self.session.path);
        if !configured.is_empty() {
            return Ok(PathBuf::from(configured));
        }
        let dirs = directories::ProjectDirs::from("", "", "profile-insight")
            .context("Could not determine a data directory for the session database")?;
        Ok(dirs.data_dir().join("session.db"))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

fn env_or(var: &str, fallback: &str) -> String {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => value,
        _ => fallback.to_string(),
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG).unwrap_or_else(|_| Self {
            endpoints: EndpointsConfig {
                auth: "https://learn.reboot01.com/api/auth/signin".to_string(),
                graphql: "https://learn.reboot01.com/api/graphql-engine/v1/graphql".to_string(),
            },
            session: SessionConfig::default(),
            http: HttpConfig::default(),
        })
    }
}
