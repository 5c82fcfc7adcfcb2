//! Configuration loading for the CLI

use anyhow::{Context, Result};
use gatehouse_core::{ConfigManager, GatehouseConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Get the gatehouse home directory (~/.gatehouse)
    pub fn gatehouse_home() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("GATEHOUSE_HOME") {
            return Ok(PathBuf::from(path));
        }
        let home = dirs::home_dir().context("Could not find home directory")?;
        Ok(home.join(".gatehouse"))
    }

    /// Find the configuration file to use, if any
    ///
    /// An explicit path wins; otherwise the current directory is searched,
    /// then the gatehouse home directory.
    pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
            return Ok(Some(path.to_path_buf()));
        }

        let cwd = std::env::current_dir()?;
        if let Some(path) = ConfigManager::find_config_file(&cwd) {
            return Ok(Some(path));
        }

        let home = Self::gatehouse_home()?;
        Ok(ConfigManager::find_config_file(&home))
    }

    /// Load the effective configuration: file (or defaults), then env overrides
    pub fn load(explicit: Option<&Path>) -> Result<GatehouseConfig> {
        let mut config = match Self::locate(explicit)? {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                ConfigManager::load(&path)
                    .with_context(|| format!("Failed to load configuration from {:?}", path))?
            }
            None => {
                debug!("No configuration file found, using defaults");
                GatehouseConfig::default()
            }
        };

        config
            .apply_env_overrides()
            .context("Failed to apply environment overrides")?;
        Ok(config)
    }

    /// Load and validate
    pub fn load_valid(explicit: Option<&Path>) -> Result<GatehouseConfig> {
        let config = Self::load(explicit)?;
        config.validate()?;
        Ok(config)
    }
}
