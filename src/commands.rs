//! Slash/prefix commands.

use crate::discord::to_embed;
use crate::{Context, Data, Error};
use faceit_api::FaceitClient;
use notify_format::{stats_response, CommandResponse};
use player_stats::compute_stats;
use tracing::info;

pub fn all() -> Vec<poise::Command<Data, Error>> {
    vec![stats()]
}

pub async fn stats_reply(client: &FaceitClient, nickname: &str) -> CommandResponse {
    let stats = compute_stats(client, nickname).await;
    stats_response(nickname, stats.as_ref())
}

/// Recent stats of the tracked FACEIT player
#[poise::command(slash_command, prefix_command)]
pub async fn stats(ctx: Context<'_>) -> Result<(), Error> {
    ctx.defer().await?;
    let data = ctx.data();
    info!("/stats requested by {}", ctx.author().name);

    match stats_reply(&data.faceit, &data.target_player).await {
        CommandResponse::Embed(payload) => {
            ctx.send(poise::CreateReply::default().embed(to_embed(&payload))).await?;
        }
        CommandResponse::Failure(message) => {
            ctx.say(message).await?;
        }
    }
    Ok(())
}
