//! Config commands

use crate::config::ConfigLoader;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

pub fn show(config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load(config_path)?;

    match ConfigLoader::locate(config_path)? {
        Some(path) => println!("{} {}", "📁 Config file:".cyan(), path.display().to_string().dimmed()),
        None => println!("{}", "📁 No config file found, showing defaults".cyan()),
    }
    println!();

    let mut shown = config.clone();
    if let Some(auth) = shown.auth.as_mut() {
        if auth.password.is_some() {
            auth.password = Some("********".to_string());
        }
    }
    print!("{}", serde_yaml::to_string(&shown)?);
    Ok(())
}

pub fn validate(config_path: Option<&Path>) -> Result<()> {
    println!("{}", "🔍 Validating Gatehouse configuration...".cyan().bold());

    let config = ConfigLoader::load(config_path)?;
    match config.validate() {
        Ok(()) => {
            println!("  {} Configuration is valid", "✅".green());
            Ok(())
        }
        Err(e) => {
            println!("  {} {}", "❌".red(), e.to_string().red());
            Err(anyhow::anyhow!("Validation failed"))
        }
    }
}
