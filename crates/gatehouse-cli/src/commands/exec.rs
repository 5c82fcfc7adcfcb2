//! Exec command - Run commands through the proxy chain

use crate::config::ConfigLoader;
use crate::session::Session;
use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use super::{print_outcome, print_stats};

pub async fn run(
    config_path: Option<&Path>,
    commands: Vec<String>,
    user: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let config = ConfigLoader::load_valid(config_path)?;
    let session = Session::open(&config)?;

    if let Some(user) = user {
        let password = match password {
            Some(p) => p,
            None => dialoguer::Password::new()
                .with_prompt(format!("Password for {}", user))
                .interact()?,
        };

        if session.login(&user, &password).await? {
            println!("{} Authenticated as {}", "🔐".green(), user.cyan());
        } else {
            anyhow::bail!("Authentication failed for {}", user);
        }
    } else if session.requires_login() {
        println!(
            "{}",
            "⚠️  Auth is configured but no --user given; commands will be refused".yellow()
        );
    }

    println!();
    let mut failures = 0;
    for command in &commands {
        let outcome = session.execute(command).await;
        if matches!(outcome, Err(ref e) if !e.is_rejection()) {
            failures += 1;
        }
        print_outcome(command, &outcome);
    }

    println!();
    print_stats(&session.cache_stats().await);
    println!("  Backend connections: {}", session.connect_count());

    if failures > 0 {
        anyhow::bail!("{} command(s) failed", failures);
    }
    Ok(())
}
