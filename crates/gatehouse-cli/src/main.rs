//! Gatehouse CLI
//!
//! Drives the lazy caching proxy and the authenticating proxy against a
//! simulated database backend.

mod commands;
mod config;
mod session;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(author, version, about = "Gatehouse - lazy, caching, access-controlled resource proxy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to gatehouse.yaml in the current directory or ~/.gatehouse)
    #[arg(short, long, global = true, env = "GATEHOUSE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Walk through lazy loading, caching, access control and authentication
    Demo {
        /// Simulated connection setup time in milliseconds
        #[arg(long, default_value_t = 200)]
        connect_delay_ms: u64,

        /// Simulated per-query time in milliseconds
        #[arg(long, default_value_t = 100)]
        query_delay_ms: u64,
    },

    /// Run commands through the configured proxy chain
    Exec {
        /// Commands to run, in order
        #[arg(required = true)]
        commands: Vec<String>,

        /// Username for the authenticating proxy
        #[arg(short, long)]
        user: Option<String>,

        /// Password (prompted for if a user is given without one)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Show connection info without connecting to the backend
    Info,

    /// Interactive shell over the configured proxy chain
    Shell,

    /// Hash a password for use as auth.password_hash
    #[command(name = "hash-password")]
    HashPassword,

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Validate the configuration
    Validate,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(if cli.verbose {
            "gatehouse=debug,gatehouse_core=debug,gatehouse_backends=debug"
        } else {
            "gatehouse=info,gatehouse_core=warn,gatehouse_backends=info"
        })
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    info!("Starting Gatehouse CLI");

    let config_path = cli.config.as_deref();
    let result = match cli.command {
        Commands::Demo {
            connect_delay_ms,
            query_delay_ms,
        } => commands::demo::run(connect_delay_ms, query_delay_ms).await,
        Commands::Exec {
            commands: queries,
            user,
            password,
        } => commands::exec::run(config_path, queries, user, password).await,
        Commands::Info => commands::info::run(config_path).await,
        Commands::Shell => commands::shell::run(config_path).await,
        Commands::HashPassword => commands::hash::run(),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(config_path),
            ConfigAction::Validate => commands::config::validate(config_path),
        },
    };

    if let Err(ref e) = result {
        error!("Command failed: {}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    result
}
