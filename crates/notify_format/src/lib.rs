/// faceit-watch — Notification Formatter
///
/// Turns a match snapshot or a stats set into a transport-neutral embed.
/// No I/O here; the Discord layer maps `NotificationPayload` onto its own
/// embed builder.

use chrono::{DateTime, Utc};
use faceit_api::{MatchSnapshot, Team};
use player_stats::PlayerStats;
use serde::Serialize;

pub const MATCH_COLOR: u32 = 0x00FF00;
pub const STATS_COLOR: u32 = 0xFF5500;
pub const PROFILE_URL_BASE: &str = "https://www.faceit.com/ru/players";
pub const STATS_FAILURE_MESSAGE: &str = "❌ Could not fetch player stats";
const EMPTY_ROSTER: &str = "❌ No data";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayloadField {
    pub name:   String,
    pub value:  String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationPayload {
    pub title:       String,
    pub description: Option<String>,
    pub url:         Option<String>,
    pub color:       u32,
    pub fields:      Vec<PayloadField>,
    pub footer:      Option<String>,
    pub timestamp:   DateTime<Utc>,
}

impl NotificationPayload {
    fn new(title: String, color: u32) -> Self {
        Self {
            title,
            description: None,
            url: None,
            color,
            fields: Vec::new(),
            footer: None,
            timestamp: Utc::now(),
        }
    }

    fn field(mut self, name: &str, value: impl Into<String>, inline: bool) -> Self {
        self.fields.push(PayloadField {
            name: name.to_string(),
            value: value.into(),
            inline,
        });
        self
    }
}

/// What the `/stats` command answers with.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResponse {
    Embed(NotificationPayload),
    Failure(String),
}

fn roster_text(team: &Team) -> String {
    if team.is_empty() {
        return EMPTY_ROSTER.to_string();
    }
    team.iter()
        .enumerate()
        .map(|(i, p)| format!("{}. **{}** - {} LVL\n", i + 1, p.nickname, p.skill_label()))
        .collect()
}

pub fn match_payload(nickname: &str, snapshot: &MatchSnapshot) -> NotificationPayload {
    let mut payload = NotificationPayload::new(format!("🎮 {nickname} started a match!"), MATCH_COLOR)
        .field("🗺️ Map", snapshot.map.as_str(), true)
        .field("🌍 Server", snapshot.server_region.as_str(), true)
        .field("👥 Team 1", roster_text(&snapshot.teams[0]), true)
        .field("👥 Team 2", roster_text(&snapshot.teams[1]), true);
    payload.description = Some(format!("[Match room link]({})", snapshot.room_url));
    payload.url = Some(snapshot.room_url.clone());
    payload
}

pub fn profile_url(nickname: &str) -> String {
    format!("{PROFILE_URL_BASE}/{nickname}")
}

pub fn stats_payload(nickname: &str, stats: &PlayerStats) -> NotificationPayload {
    let mut payload = NotificationPayload::new(format!("📊 {nickname} stats"), STATS_COLOR)
        .field("🎮 Level", format!("**{}**", stats.level), true)
        .field("⭐ ELO", format!("**{}**", stats.elo), true)
        .field("📈 Winrate (30 matches)", format!("**{:.1}%**", stats.winrate), true)
        .field("⚔️ K/D (30 matches)", format!("**{:.2}**", stats.kd), true)
        .field("📅 Matches today", format!("**{}**", stats.matches_today), true)
        .field("🎯 Total matches", format!("**{}**", stats.total_matches), true)
        .field(
            "🔗 Links",
            format!("[FACEIT profile]({})", profile_url(nickname)),
            false,
        );
    payload.footer = Some("Data refreshed".to_string());
    payload
}

/// The generic failure never says why; details stay in the logs.
pub fn stats_response(nickname: &str, stats: Option<&PlayerStats>) -> CommandResponse {
    match stats {
        Some(s) => CommandResponse::Embed(stats_payload(nickname, s)),
        None => CommandResponse::Failure(STATS_FAILURE_MESSAGE.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faceit_api::{RosterPlayer, SkillLevel};

    fn snapshot() -> MatchSnapshot {
        MatchSnapshot {
            match_id: "1-xyz".to_string(),
            room_url: "https://www.faceit.com/ru/cs2/room/1-xyz".to_string(),
            map: "de_dust2".to_string(),
            server_region: "Europe".to_string(),
            teams: [
                vec![
                    RosterPlayer { nickname: "UNCRKING".to_string(), skill_level: Some(SkillLevel::Num(10)) },
                    RosterPlayer { nickname: "mate".to_string(), skill_level: None },
                ],
                Vec::new(),
            ],
        }
    }

    #[test]
    fn match_payload_lists_fields_in_order() {
        let p = match_payload("UNCRKING", &snapshot());
        let names: Vec<_> = p.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["🗺️ Map", "🌍 Server", "👥 Team 1", "👥 Team 2"]);
        assert_eq!(p.fields[0].value, "de_dust2");
        assert_eq!(p.fields[2].value, "1. **UNCRKING** - 10 LVL\n2. **mate** - ? LVL\n");
        assert_eq!(p.fields[3].value, "❌ No data");
        assert_eq!(p.description.as_deref(), Some("[Match room link](https://www.faceit.com/ru/cs2/room/1-xyz)"));
        assert_eq!(p.color, MATCH_COLOR);
    }

    #[test]
    fn stats_payload_formats_numbers() {
        let stats = PlayerStats {
            elo: 2150,
            level: 10,
            winrate: 50.0,
            kd: 1.5,
            matches_today: 3,
            total_matches: 30,
        };
        let p = stats_payload("UNCRKING", &stats);
        assert_eq!(p.fields.len(), 7);
        assert_eq!(p.fields[2].value, "**50.0%**");
        assert_eq!(p.fields[3].value, "**1.50**");
        assert!(!p.fields[6].inline);
        assert!(p.fields[6].value.contains("https://www.faceit.com/ru/players/UNCRKING"));
        assert_eq!(p.footer.as_deref(), Some("Data refreshed"));
    }

    #[test]
    fn missing_stats_is_generic_failure() {
        match stats_response("UNCRKING", None) {
            CommandResponse::Failure(msg) => assert_eq!(msg, STATS_FAILURE_MESSAGE),
            other => panic!("expected failure, got {other:?}"),
        }
    }
}
