//! Hash-password command

use anyhow::Result;
use colored::Colorize;

pub fn run() -> Result<()> {
    let password: String = dialoguer::Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()?;

    let hash = gatehouse_core::hash_password(&password)?;

    println!();
    println!("{}", "Add this to the auth section of gatehouse.yaml:".dimmed());
    println!("  password_hash: \"{}\"", hash.green());
    Ok(())
}
