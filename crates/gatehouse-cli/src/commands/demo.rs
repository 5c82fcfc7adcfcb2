//! Demo command - Walk through every proxy behaviour with a simulated backend

use anyhow::Result;
use colored::Colorize;
use gatehouse_backends::{SimulatedConnector, SimulatedDatabase};
use gatehouse_core::{AuthenticatingProxy, Credential, LazyResourceProxy, Resource};
use gatehouse_types::{Command, Endpoint, Role};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{print_outcome, print_stats};

pub async fn run(connect_delay_ms: u64, query_delay_ms: u64) -> Result<()> {
    let connect_delay = Duration::from_millis(connect_delay_ms);
    let query_delay = Duration::from_millis(query_delay_ms);

    println!("{}", "🔹 Gatehouse demo".blue().bold());
    println!();

    // 1. Lazy construction and caching
    section("1. Lazy initialization and caching");
    let connector = SimulatedConnector::new()
        .with_connect_delay(connect_delay)
        .with_query_delay(query_delay);
    let proxy = LazyResourceProxy::new(Endpoint::new("localhost", 5432), Arc::new(connector.clone()));

    let info = proxy.connection_info().await;
    println!("  Before first query: {}", serde_json::to_string(&info)?.dimmed());

    for command in [
        "SELECT * FROM users WHERE age > 18",
        "SELECT * FROM users WHERE age > 18",
        "INSERT INTO users VALUES ('John', 25)",
        "DROP TABLE users",
    ] {
        timed(&proxy, command).await;
    }
    println!();
    print_stats(&proxy.cache_stats().await);
    println!("  Backend connections: {}", connector.connect_count());
    println!();

    // 2. Authentication and roles over one shared backend
    section("2. Authenticating proxy");
    let shared = Arc::new(
        SimulatedDatabase::connect(Endpoint::new("db.example.com", 3306), connect_delay, query_delay).await,
    );
    let admin = AuthenticatingProxy::new(shared.clone(), Credential::plain("admin", "secret123", Role::Admin));

    println!("  Query without authentication:");
    report(&admin, "SELECT * FROM products").await;

    println!("  Login with wrong password:");
    login(&admin, "admin", "wrongpassword").await;
    println!("  Login with correct password:");
    login(&admin, "admin", "secret123").await;
    report(&admin, "SELECT * FROM products").await;

    println!("  Regular user attempting an admin command:");
    let user = AuthenticatingProxy::new(shared.clone(), Credential::plain("user", "user123", Role::User));
    login(&user, "user", "user123").await;
    report(&user, "CREATE TABLE test (id INT)").await;
    println!();

    // 3. Same workload against the raw backend and the proxy
    section("3. Transparent substitution");
    println!("  {}", "Raw database:".bold());
    run_workload(shared.as_ref()).await?;
    println!("  {}", "Caching proxy:".bold());
    run_workload(&proxy).await?;

    shared.close();
    println!();
    println!("{}", "✅ Demo complete".green().bold());
    Ok(())
}

fn section(title: &str) {
    println!("{}", title.yellow().bold());
    println!("{}", "=".repeat(60).dimmed());
}

async fn timed(resource: &dyn Resource, command: &str) {
    let started = Instant::now();
    let outcome = resource.execute(&Command::from(command)).await;
    print_outcome(command, &outcome);
    println!("      {}", format!("{} ms", started.elapsed().as_millis()).dimmed());
}

async fn report(resource: &dyn Resource, command: &str) {
    let outcome = resource.execute(&Command::from(command)).await;
    print_outcome(command, &outcome);
}

async fn login<R: Resource>(proxy: &AuthenticatingProxy<R>, username: &str, password: &str) {
    if proxy.authenticate(username, password).await {
        println!("  {} {} authenticated", "✅".green(), username.cyan());
    } else {
        println!("  {} authentication failed for {}", "❌".red(), username);
    }
}

/// Works with any resource; it cannot tell a proxy from the real thing
async fn run_workload(resource: &dyn Resource) -> Result<()> {
    let info = resource.connection_info().await;
    println!("    Connection: {}", serde_json::to_string(&info)?.dimmed());

    for command in [
        "SELECT * FROM orders",
        "UPDATE products SET price = price * 1.1",
        "SELECT * FROM orders",
    ] {
        let outcome = resource.execute(&Command::from(command)).await;
        print_outcome(&Command::from(command).preview(30), &outcome);
    }
    Ok(())
}
