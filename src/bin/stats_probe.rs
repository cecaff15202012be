//! stats-probe — print what `/stats` would answer, without Discord
//!
//! Handy for checking a FACEIT API key or a nickname before deploying.
//!
//! Run:
//!   FACEIT_API_KEY=... cargo run --bin stats-probe -- UNCRKING
//!   cargo run --bin stats-probe -- UNCRKING --json

use anyhow::{Context, Result};
use dotenv::dotenv;
use faceit_api::FaceitClient;
use notify_format::{stats_response, CommandResponse};
use player_stats::compute_stats;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let as_json = args.iter().any(|a| a == "--json");
    let nickname = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .cloned()
        .or_else(|| std::env::var("TARGET_PLAYER").ok())
        .unwrap_or_else(|| "UNCRKING".to_string());

    let api_key = std::env::var("FACEIT_API_KEY").context("missing FACEIT_API_KEY")?;
    let base_url = std::env::var("FACEIT_API_URL")
        .unwrap_or_else(|_| faceit_api::DEFAULT_BASE_URL.to_string());
    let client = FaceitClient::with_base_url(api_key, base_url)?;

    let stats = compute_stats(&client, &nickname).await;
    match stats_response(&nickname, stats.as_ref()) {
        CommandResponse::Embed(payload) if as_json => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        CommandResponse::Embed(payload) => {
            println!("{}", payload.title);
            for field in &payload.fields {
                println!("  {:<24} {}", field.name, field.value.replace("**", ""));
            }
        }
        CommandResponse::Failure(message) => {
            println!("{message}");
            std::process::exit(1);
        }
    }
    Ok(())
}
