//! Millwright server binary
//!
//! Starts the HTTP query agent over the plant database.

use millwright_server::{config::ServerConfig, start_server};
use std::env;
use std::process;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    let config = if args.len() > 2 && args[1] == "--config" {
        ServerConfig::from_file(&args[2])?
    } else if args.len() > 1 && args[1] == "--help" {
        print_help();
        process::exit(0);
    } else {
        eprintln!("Warning: no config file specified, using the local default");
        eprintln!("Usage: millwright-server --config <path-to-config.toml>");
        eprintln!();
        ServerConfig::default_local_config()
    };

    start_server(config).await?;

    Ok(())
}

fn print_help() {
    println!("Millwright - grounded query agent for plant-floor data");
    println!();
    println!("USAGE:");
    println!("    millwright-server --config <path-to-config.toml>");
    println!();
    println!("OPTIONS:");
    println!("    --config <file>    Load configuration from TOML file");
    println!("    --help             Print this help message");
    println!();
    println!("CONFIGURATION:");
    println!("    bind_address        IP address to bind (e.g., '127.0.0.1')");
    println!("    bind_port           Port number (e.g., 8080)");
    println!("    database_path       SQLite database path (omit for demo seed)");
    println!("    budget_secs         Fan-out timeout budget (default: 20)");
    println!("    sweep_interval_secs Cache sweep interval (default: 300)");
    println!();
}
