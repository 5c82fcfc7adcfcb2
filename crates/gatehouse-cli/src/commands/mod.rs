//! CLI command implementations

pub mod config;
pub mod demo;
pub mod exec;
pub mod hash;
pub mod info;
pub mod shell;

use colored::Colorize;
use gatehouse_core::GatehouseError;
use gatehouse_types::CacheStats;

/// Print the outcome of one command
pub fn print_outcome(command: &str, outcome: &Result<String, GatehouseError>) {
    match outcome {
        Ok(result) => println!("  {} {} {}", "✅".green(), command.cyan(), result),
        Err(e) if e.is_rejection() => println!("  {} {} {}", "⛔".yellow(), command.cyan(), e.to_string().yellow()),
        Err(e) => println!("  {} {} {}", "❌".red(), command.cyan(), e.to_string().red()),
    }
}

pub fn print_stats(stats: &CacheStats) {
    println!("{}", "📊 Cache statistics:".yellow());
    println!("  Requests:  {}", stats.access_count);
    println!("  Cached:    {}", stats.cache_size);
    for (i, command) in stats.cached_commands.iter().enumerate() {
        println!("    {}. {}", i + 1, command.preview(50).dimmed());
    }
}
