/// faceit-watch — FACEIT match watcher bot
///
/// What it does:
///   1. Every 120s checks whether the tracked player started a FACEIT match
///   2. New match → embed into the Discord channel, then 5 min cooldown
///   3. `/stats` (or `!stats`) → winrate, K/D, ELO over the last 30 matches
///   4. GET / and /ping for uptime monitors
///
/// Run:
///   DISCORD_TOKEN=... FACEIT_API_KEY=... CHANNEL_ID=... cargo run --bin faceit-bot

mod commands;
mod config;
mod discord;
mod health;

use anyhow::{Context as _, Result};
use config::BotConfig;
use discord::DiscordNotifier;
use dotenv::dotenv;
use faceit_api::FaceitClient;
use logger::EventLogger;
use match_watcher::MatchWatcher;
use poise::serenity_prelude as serenity;
use std::env;
use std::fs::File;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

/// Shared with every command invocation. Read-only.
pub struct Data {
    pub faceit:        Arc<FaceitClient>,
    pub target_player: String,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    info!("🚀 Starting FACEIT watcher bot with health endpoint...");

    let config = BotConfig::from_env()?;

    // Two instances would announce every match twice
    let lock_file_path = env::temp_dir().join("faceit_watch.lock");
    let lock_file = File::create(&lock_file_path)
        .with_context(|| format!("create lock file {:?}", lock_file_path))?;
    let mut lock = fd_lock::RwLock::new(lock_file);
    let _write_guard = match lock.try_write() {
        Ok(guard) => {
            info!("Acquired single-instance lock.");
            guard
        }
        Err(_) => {
            warn!("Another faceit-bot instance is already running! Exiting.");
            return Ok(());
        }
    };

    {
        let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
        tokio::spawn(async move {
            if let Err(e) = health::start(addr).await {
                warn!("health endpoint stopped: {e}");
            }
        });
    }

    let faceit = Arc::new(
        FaceitClient::with_base_url(config.faceit_api_key.as_str(), config.faceit_api_url.as_str())
            .context("FACEIT client")?,
    );
    let token = config.discord_token.clone();
    let intents = serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: commands::all(),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                info!("✅ Bot {} is up", ready.user.name);
                info!("📡 Tracking player: {}", config.target_player);
                match config.channel_id {
                    Some(id) => info!("📢 Notification channel: {}", id),
                    None => warn!("📢 CHANNEL_ID not set"),
                }

                // Started once, after the gateway is ready
                let notifier = DiscordNotifier::new(ctx.http.clone(), config.channel_id);
                let watcher = MatchWatcher::new(Arc::clone(&faceit), notifier, config.watcher.clone())
                    .with_event_log(EventLogger::new(config.log_dir.clone()));
                tokio::spawn(async move {
                    if let Err(e) = watcher.run().await {
                        error!("Match watcher stopped: {e}");
                    }
                });

                Ok(Data {
                    faceit,
                    target_player: config.target_player.clone(),
                })
            })
        })
        .build();

    let client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await;
    client
        .context("Discord client build failed")?
        .start()
        .await
        .context("Discord client stopped")?;

    Ok(())
}
