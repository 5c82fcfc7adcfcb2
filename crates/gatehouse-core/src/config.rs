//! Configuration management for Gatehouse

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::credential::Credential;
use crate::error::{GatehouseError, Result};
use crate::policy::{DEFAULT_PRIVILEGED_KEYWORDS, DEFAULT_RESTRICTED_KEYWORDS};
use gatehouse_types::{Endpoint, Role};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration file names to search for
pub const CONFIG_FILE_NAMES: &[&str] = &["gatehouse.yaml", "gatehouse.yml", "gatehouse.json"];

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatehouseConfig {
    pub backend: BackendConfig,
    pub cache: CacheConfig,
    pub access: AccessConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<AuthConfig>,
}

/// Where the lazily-constructed backend lives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    pub host: String,
    pub port: u16,
    /// Simulated cost of establishing the connection
    pub connect_delay_ms: u64,
    /// Simulated cost of each executed command
    pub query_delay_ms: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            connect_delay_ms: 0,
            query_delay_ms: 0,
        }
    }
}

impl BackendConfig {
    pub fn endpoint(&self) -> Endpoint {
        Endpoint::new(self.host.clone(), self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    pub restricted_keywords: Vec<String>,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            restricted_keywords: to_strings(DEFAULT_RESTRICTED_KEYWORDS),
        }
    }
}

/// Credential and role policy for the authenticating proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    #[serde(default = "default_role")]
    pub role: Role,
    #[serde(default = "default_privileged_keywords")]
    pub privileged_keywords: Vec<String>,
    /// Lock the proxy after this many consecutive failed logins
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lockout_after: Option<u32>,
}

fn default_role() -> Role {
    Role::Admin
}

fn default_privileged_keywords() -> Vec<String> {
    to_strings(DEFAULT_PRIVILEGED_KEYWORDS)
}

fn to_strings(keywords: &[&str]) -> Vec<String> {
    keywords.iter().map(|k| k.to_string()).collect()
}

impl AuthConfig {
    pub fn new(username: impl Into<String>, password: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            password: Some(password.into()),
            password_hash: None,
            role,
            privileged_keywords: default_privileged_keywords(),
            lockout_after: None,
        }
    }

    /// Build the credential this section describes
    pub fn credential(&self) -> Result<Credential> {
        match (&self.password, &self.password_hash) {
            (Some(password), None) => Ok(Credential::plain(&self.username, password, self.role)),
            (None, Some(hash)) => Credential::hashed(&self.username, hash, self.role),
            (Some(_), Some(_)) => Err(GatehouseError::InvalidConfig(
                "auth: set either password or password_hash, not both".to_string(),
            )),
            (None, None) => Err(GatehouseError::InvalidConfig(
                "auth: password or password_hash is required".to_string(),
            )),
        }
    }
}

impl GatehouseConfig {
    /// Override selected fields from `GATEHOUSE_*` environment variables
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(host) = std::env::var("GATEHOUSE_HOST") {
            self.backend.host = host;
        }
        if let Ok(port) = std::env::var("GATEHOUSE_PORT") {
            self.backend.port = port
                .parse()
                .map_err(|_| GatehouseError::Config(format!("GATEHOUSE_PORT is not a port: {}", port)))?;
        }
        if let Ok(capacity) = std::env::var("GATEHOUSE_CACHE_CAPACITY") {
            self.cache.capacity = capacity.parse().map_err(|_| {
                GatehouseError::Config(format!(
                    "GATEHOUSE_CACHE_CAPACITY is not a number: {}",
                    capacity
                ))
            })?;
        }
        Ok(())
    }

    /// Check the configuration, reporting every problem at once
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        if self.backend.host.trim().is_empty() {
            problems.push("backend.host must not be empty".to_string());
        }
        if self.backend.port == 0 {
            problems.push("backend.port must be non-zero".to_string());
        }
        if self.cache.capacity == 0 {
            problems.push("cache.capacity must be at least 1".to_string());
        }
        if self.access.restricted_keywords.iter().any(|k| k.trim().is_empty()) {
            problems.push("access.restricted_keywords contains an empty keyword".to_string());
        }

        if let Some(auth) = &self.auth {
            if auth.username.trim().is_empty() {
                problems.push("auth.username must not be empty".to_string());
            }
            if let Err(e) = auth.credential() {
                problems.push(e.to_string());
            }
            if auth.privileged_keywords.iter().any(|k| k.trim().is_empty()) {
                problems.push("auth.privileged_keywords contains an empty keyword".to_string());
            }
            if auth.lockout_after == Some(0) {
                problems.push("auth.lockout_after must be at least 1".to_string());
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(GatehouseError::InvalidConfig(problems.join("; ")))
        }
    }
}

/// Locates and parses configuration files
///
/// Every call reads the file afresh, so edits are picked up on the next load.
pub struct ConfigManager;

impl ConfigManager {
    /// Find configuration file in a directory
    pub fn find_config_file(dir: &Path) -> Option<PathBuf> {
        for name in CONFIG_FILE_NAMES {
            let path = dir.join(name);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }

    /// Load configuration from a file, as YAML unless it ends in `.json`
    pub fn load(config_path: &Path) -> Result<GatehouseConfig> {
        let content = std::fs::read_to_string(config_path)?;
        let config = if config_path
            .extension()
            .map(|e| e == "json")
            .unwrap_or(false)
        {
            serde_json::from_str(&content)?
        } else {
            serde_yaml::from_str(&content)?
        };
        Ok(config)
    }

    /// Load configuration from a directory (searches for config files)
    pub fn load_from_directory(dir: &Path) -> Result<(GatehouseConfig, PathBuf)> {
        let config_path = Self::find_config_file(dir)
            .ok_or_else(|| GatehouseError::ConfigNotFound(dir.display().to_string()))?;

        let config = Self::load(&config_path)?;
        Ok((config, config_path))
    }
}
