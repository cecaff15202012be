/// faceit-watch — Player Stats
///
/// Form over the last 30 matches: winrate, K/D, matches played today.
/// All-or-nothing: if the profile or the history can't be fetched there are
/// no stats at all, never a half-filled set.

use chrono::{DateTime, TimeZone, Timelike};
use faceit_api::{FaceitClient, HistoryMatch, PlayerProfile};
use serde::Serialize;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub elo:           i64,
    pub level:         i64,
    /// 0–100, one decimal.
    pub winrate:       f64,
    /// Two decimals; 0.0 when no deaths were recorded.
    pub kd:            f64,
    pub matches_today: u32,
    pub total_matches: u32,
}

impl PlayerStats {
    fn empty(elo: i64, level: i64) -> Self {
        Self {
            elo,
            level,
            winrate: 0.0,
            kd: 0.0,
            matches_today: 0,
            total_matches: 0,
        }
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn winrate(wins: u32, total: u32) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round_to(f64::from(wins) / f64::from(total) * 100.0, 1)
}

/// Zero deaths reads as 0.0, not infinity. A flawless run shows as 0.0 too.
pub fn kd_ratio(kills: u64, deaths: u64) -> f64 {
    if deaths == 0 {
        return 0.0;
    }
    round_to(kills as f64 / deaths as f64, 2)
}

/// Epoch millis of the most recent midnight in `now`'s time zone.
pub fn day_start_ms<Tz: TimeZone>(now: &DateTime<Tz>) -> i64 {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .and_then(|midnight| midnight.and_local_timezone(now.timezone()).earliest())
        .map(|start| start.timestamp_millis())
        .unwrap_or_else(|| {
            now.timestamp_millis() - i64::from(now.num_seconds_from_midnight()) * 1000
        })
}

/// Pure aggregation over an already fetched profile and history.
pub fn aggregate(
    nickname:       &str,
    profile:        &PlayerProfile,
    history:        &[HistoryMatch],
    today_start_ms: i64,
) -> PlayerStats {
    let elo = profile.cs2_elo();
    let level = profile.cs2_level();

    if history.is_empty() {
        return PlayerStats::empty(elo, level);
    }

    let wanted = nickname.to_lowercase();
    let mut wins = 0u32;
    let mut kills = 0u64;
    let mut deaths = 0u64;
    let mut matches_today = 0u32;

    for m in history {
        let entry = m.teams().into_iter().find_map(|(faction, team)| {
            team.players
                .as_deref()
                .unwrap_or_default()
                .iter()
                .find(|p| p.nickname.as_deref().is_some_and(|n| n.to_lowercase() == wanted))
                .map(|p| (faction, team, p))
        });

        let Some((faction, team, player)) = entry else {
            continue;
        };

        let won = team.victory == Some(true)
            || (faction.is_some() && faction == m.winner());
        if won {
            wins += 1;
        }

        kills += player.stat("Kills");
        deaths += player.stat("Deaths");

        if m.played_at_ms().is_some_and(|ts| ts >= today_start_ms) {
            matches_today += 1;
        }
    }

    let total_matches = history.len() as u32;

    PlayerStats {
        elo,
        level,
        winrate: winrate(wins, total_matches),
        kd: kd_ratio(kills, deaths),
        matches_today,
        total_matches,
    }
}

pub async fn compute_stats(client: &FaceitClient, nickname: &str) -> Option<PlayerStats> {
    let player_id = match client.resolve_player_id(nickname).await {
        Ok(id) => id,
        Err(e) => {
            warn!("Stats: player lookup for {} failed: {}", nickname, e);
            return None;
        }
    };

    let profile = match client.player_profile(&player_id).await {
        Ok(p) => p,
        Err(e) => {
            warn!("Stats: profile for {} failed: {}", nickname, e);
            return None;
        }
    };

    let history = match client.match_history(&player_id).await {
        Ok(h) => h,
        Err(e) => {
            warn!("Stats: history for {} failed: {}", nickname, e);
            return None;
        }
    };

    let stats = aggregate(nickname, &profile, &history, day_start_ms(&chrono::Local::now()));
    info!(
        elo = stats.elo,
        winrate = stats.winrate,
        kd = stats.kd,
        "Stats for {} over {} matches",
        nickname, stats.total_matches
    );
    Some(stats)
}
