//! Discord side of notifications: payload → embed, embed → channel.

use async_trait::async_trait;
use match_watcher::{Notifier, NotifyError};
use notify_format::NotificationPayload;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

pub fn to_embed(payload: &NotificationPayload) -> serenity::CreateEmbed {
    let mut embed = serenity::CreateEmbed::new()
        .title(payload.title.as_str())
        .colour(payload.color);

    if let Some(description) = &payload.description {
        embed = embed.description(description.as_str());
    }
    if let Some(url) = &payload.url {
        embed = embed.url(url.as_str());
    }
    for field in &payload.fields {
        embed = embed.field(field.name.as_str(), field.value.as_str(), field.inline);
    }
    if let Some(footer) = &payload.footer {
        embed = embed.footer(serenity::CreateEmbedFooter::new(footer.as_str()));
    }
    if let Ok(ts) = serenity::Timestamp::from_unix_timestamp(payload.timestamp.timestamp()) {
        embed = embed.timestamp(ts);
    }
    embed
}

pub struct DiscordNotifier {
    http:       Arc<serenity::Http>,
    channel_id: Option<serenity::ChannelId>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<serenity::Http>, channel_id: Option<u64>) -> Self {
        Self {
            http,
            channel_id: channel_id.filter(|id| *id != 0).map(serenity::ChannelId::new),
        }
    }

    fn channel(&self) -> Result<serenity::ChannelId, NotifyError> {
        self.channel_id
            .ok_or_else(|| NotifyError::Destination("CHANNEL_ID is not set".to_string()))
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn ensure_destination(&self) -> Result<(), NotifyError> {
        let channel_id = self.channel()?;
        channel_id
            .to_channel(&self.http)
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Destination(format!("channel {channel_id} not found: {e}")))
    }

    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        let channel_id = self.channel()?;
        channel_id
            .send_message(&self.http, serenity::CreateMessage::new().embed(to_embed(payload)))
            .await
            .map(|_| ())
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}
