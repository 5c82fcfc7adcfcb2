//! Shell command - Interactive loop over the proxy chain

use crate::config::ConfigLoader;
use crate::session::Session;
use anyhow::Result;
use colored::Colorize;
use gatehouse_types::Command;
use std::path::Path;

use super::{print_outcome, print_stats};

const HELP: &str = "\
  :stats            show cache statistics
  :info             show connection info
  :clear            clear the result cache
  :login [user]     authenticate
  :logout           end the session
  :help             show this help
  :quit             exit";

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let config = ConfigLoader::load_valid(config_path)?;
    let session = Session::open(&config)?;

    println!("{}", "🔹 Gatehouse shell".blue().bold());
    println!(
        "   Backend: {} {}",
        config.backend.endpoint().to_string().cyan(),
        "(connects on first uncached command)".dimmed()
    );
    if session.requires_login() {
        println!("   {}", "Authentication required: use :login".yellow());
    }
    println!("   Type :help for commands");
    println!();

    loop {
        let line: String = dialoguer::Input::new()
            .with_prompt("gatehouse")
            .allow_empty(true)
            .interact_text()?;
        let command = Command::from(line.trim());
        if command.is_empty() {
            continue;
        }
        let line = command.as_str();

        let mut parts = line.split_whitespace();
        match parts.next() {
            Some(":quit") | Some(":exit") => break,
            Some(":help") => println!("{}", HELP),
            Some(":stats") => print_stats(&session.cache_stats().await),
            Some(":info") => {
                let info = session.connection_info().await;
                println!("{}", serde_json::to_string_pretty(&info)?);
            }
            Some(":clear") => {
                session.clear_cache().await;
                println!("  {} Cache cleared", "🧹".green());
            }
            Some(":logout") => {
                session.logout().await;
                println!("  {} Logged out", "👋".green());
            }
            Some(":login") => {
                let user = match parts.next() {
                    Some(u) => u.to_string(),
                    None => dialoguer::Input::new()
                        .with_prompt("Username")
                        .interact_text()?,
                };
                let password: String = dialoguer::Password::new()
                    .with_prompt("Password")
                    .interact()?;

                match session.login(&user, &password).await {
                    Ok(true) => println!("  {} Authenticated as {}", "✅".green(), user.cyan()),
                    Ok(false) => println!("  {} Authentication failed for {}", "❌".red(), user),
                    Err(e) => println!("  {} {}", "⚠️".yellow(), e),
                }
            }
            Some(other) if other.starts_with(':') => {
                println!("  Unknown shell command {}; try :help", other.yellow());
            }
            _ => {
                let outcome = session.execute(line).await;
                print_outcome(line, &outcome);
            }
        }
    }

    Ok(())
}
