//! Standalone web server binary
//!
//! Usage: cargo run -p hitstand_web --bin hitstand-web-server -- --port 8080

use clap::Parser;
use hitstand_web::{AppSettings, ServerConfig, WebServer};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hitstand-web-server", about = "Blackjack over HTTP", version)]
struct Args {
    /// Address to bind
    #[arg(long, env = "HITSTAND_HOST", default_value = "127.0.0.1")]
    host: String,
    /// Port to bind (0 picks a free port)
    #[arg(short, long, env = "HITSTAND_PORT", default_value_t = 8080)]
    port: u16,
    /// TOML settings file
    #[arg(short, long, env = "HITSTAND_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // .env is optional
    dotenvy::dotenv().ok();
    let args = Args::parse();
    hitstand_web::init_logging()?;

    let settings = AppSettings::load(args.config.as_deref())?;
    tracing::info!(
        host = %args.host,
        port = args.port,
        min_bet = settings.min_bet,
        max_bet = settings.max_bet,
        split_policy = %settings.split_policy,
        database = ?settings.database,
        "starting hitstand web server"
    );

    let server = WebServer::new(ServerConfig::new(args.host, args.port), settings)?;
    let handle = server.start().await?;
    println!("Server running at http://{}", handle.address());
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    tracing::info!("shutting down");
    handle.shutdown().await?;
    Ok(())
}
