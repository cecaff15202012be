//! FACEIT Data API v4 payloads and the snapshot the watcher works with.
//!
//! Every optional field the bot relies on is `Option` here and gets its
//! default when converted, never when read ad hoc.

use serde::{Deserialize, Deserializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const ROOM_URL_BASE: &str = "https://www.faceit.com/ru/cs2/room";
pub const UNKNOWN_MAP: &str = "Unknown";
pub const DEFAULT_REGION: &str = "EU";
pub const UNKNOWN_PLAYER: &str = "?";

// ── Identifiers ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PlayerId(pub String);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRef {
    pub match_id: String,
}

// ── /players?nickname= ───────────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
pub struct PlayerLookup {
    pub player_id: String,
    #[serde(default)]
    pub nickname: Option<String>,
}

// ── /players/{id}/current-match ──────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
pub struct CurrentMatchResponse {
    #[serde(default)]
    pub match_id: Option<String>,
}

// ── /matches/{id} ────────────────────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
pub struct MatchDetails {
    #[serde(default)]
    pub match_id: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub voting: Option<Voting>,
    #[serde(default)]
    pub teams: Option<MatchTeams>,
}

#[derive(Deserialize, Debug, Default)]
pub struct Voting {
    #[serde(default)]
    pub map: Option<VotingMap>,
}

#[derive(Deserialize, Debug, Default)]
pub struct VotingMap {
    #[serde(default)]
    pub pick: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct MatchTeams {
    #[serde(default)]
    pub faction1: Option<TeamDetails>,
    #[serde(default)]
    pub faction2: Option<TeamDetails>,
}

#[derive(Deserialize, Debug, Default)]
pub struct TeamDetails {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub roster: Option<Vec<RosterEntry>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct RosterEntry {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default, deserialize_with = "lenient_skill_level")]
    pub game_skill_level: Option<SkillLevel>,
}

/// Roster skill level. FACEIT sends a number, some payloads a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkillLevel {
    Num(i64),
    Text(String),
}

impl fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkillLevel::Num(n) => write!(f, "{n}"),
            SkillLevel::Text(s) => f.write_str(s),
        }
    }
}

/// Numbers and non-empty strings are kept, anything else is unknown.
fn lenient_skill_level<'de, D>(deserializer: D) -> Result<Option<SkillLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64))
            .map(SkillLevel::Num),
        Some(serde_json::Value::String(s)) => {
            let s = s.trim();
            match s.parse::<i64>() {
                Ok(n) => Some(SkillLevel::Num(n)),
                Err(_) if !s.is_empty() => Some(SkillLevel::Text(s.to_string())),
                Err(_) => None,
            }
        }
        _ => None,
    })
}

impl MatchDetails {
    /// First picked map, `"Unknown"` when there was no vote.
    pub fn map_name(&self) -> String {
        self.voting
            .as_ref()
            .and_then(|v| v.map.as_ref())
            .and_then(|m| m.pick.as_ref())
            .and_then(|picks| picks.first())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_MAP.to_string())
    }
}

/// Display name for a FACEIT region code. Unknown codes pass through.
pub fn region_display(code: Option<&str>) -> String {
    let code = code.unwrap_or(DEFAULT_REGION);
    let name = match code {
        "EU"   => "Europe",
        "NA"   => "North America",
        "SA"   => "South America",
        "OCE"  => "Oceania",
        "ASIA" => "Asia",
        other  => other,
    };
    name.to_string()
}

pub fn room_url(match_id: &str) -> String {
    format!("{ROOM_URL_BASE}/{match_id}")
}

// ── Snapshot ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct RosterPlayer {
    pub nickname: String,
    pub skill_level: Option<SkillLevel>,
}

impl RosterPlayer {
    pub fn skill_label(&self) -> String {
        self.skill_level
            .as_ref()
            .map(|lvl| lvl.to_string())
            .unwrap_or_else(|| "?".to_string())
    }
}

pub type Team = Vec<RosterPlayer>;

/// One poll's view of a live match. Two snapshots are the same match iff
/// their `match_id`s are equal; nothing else is compared.
#[derive(Debug, Clone)]
pub struct MatchSnapshot {
    pub match_id: String,
    pub room_url: String,
    pub map: String,
    pub server_region: String,
    pub teams: [Team; 2],
}

impl MatchSnapshot {
    pub fn from_details(match_id: &str, details: MatchDetails) -> Self {
        let map = details.map_name();
        let server_region = region_display(details.region.as_deref());
        let teams = details.teams.unwrap_or_default();

        Self {
            match_id: match_id.to_string(),
            room_url: room_url(match_id),
            map,
            server_region,
            teams: [flatten_roster(teams.faction1), flatten_roster(teams.faction2)],
        }
    }
}

fn flatten_roster(team: Option<TeamDetails>) -> Team {
    team.and_then(|t| t.roster)
        .unwrap_or_default()
        .into_iter()
        .map(|p| RosterPlayer {
            nickname: p.nickname.unwrap_or_else(|| UNKNOWN_PLAYER.to_string()),
            skill_level: p.game_skill_level,
        })
        .collect()
}

// ── /players/{id} ────────────────────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
pub struct PlayerProfile {
    #[serde(default)]
    pub player_id: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub games: Option<ProfileGames>,
}

#[derive(Deserialize, Debug, Default)]
pub struct ProfileGames {
    #[serde(default)]
    pub cs2: Option<GameProfile>,
}

#[derive(Deserialize, Debug, Default)]
pub struct GameProfile {
    #[serde(default)]
    pub faceit_elo: Option<i64>,
    #[serde(default)]
    pub skill_level: Option<i64>,
}

impl PlayerProfile {
    fn cs2(&self) -> Option<&GameProfile> {
        self.games.as_ref().and_then(|g| g.cs2.as_ref())
    }

    pub fn cs2_elo(&self) -> i64 {
        self.cs2().and_then(|g| g.faceit_elo).unwrap_or(0)
    }

    pub fn cs2_level(&self) -> i64 {
        self.cs2().and_then(|g| g.skill_level).unwrap_or(0)
    }
}

// ── /players/{id}/history ────────────────────────────────────────────────────

#[derive(Deserialize, Debug, Default)]
pub struct HistoryPage {
    #[serde(default)]
    pub items: Option<Vec<HistoryMatch>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct HistoryMatch {
    #[serde(default)]
    pub match_id: Option<String>,
    /// Milliseconds since epoch.
    #[serde(default)]
    pub created_at: Option<i64>,
    /// Seconds since epoch.
    #[serde(default)]
    pub finished_at: Option<i64>,
    #[serde(default)]
    pub teams: Option<HistoryTeams>,
    #[serde(default)]
    pub results: Option<MatchResults>,
}

#[derive(Deserialize, Debug, Default)]
pub struct MatchResults {
    #[serde(default)]
    pub winner: Option<String>,
}

/// History rosters arrive either keyed by faction (`faction1`, `faction2`)
/// or as a plain list.
#[derive(Deserialize, Debug)]
#[serde(untagged)]
pub enum HistoryTeams {
    List(Vec<HistoryTeam>),
    Factions(BTreeMap<String, HistoryTeam>),
}

#[derive(Deserialize, Debug, Default)]
pub struct HistoryTeam {
    #[serde(default)]
    pub victory: Option<bool>,
    #[serde(default)]
    pub players: Option<Vec<HistoryPlayer>>,
}

#[derive(Deserialize, Debug, Default)]
pub struct HistoryPlayer {
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub player_stats: Option<HashMap<String, serde_json::Value>>,
}

impl HistoryMatch {
    /// When the match was played, in epoch milliseconds.
    pub fn played_at_ms(&self) -> Option<i64> {
        self.created_at
            .or_else(|| self.finished_at.map(|s| s * 1000))
    }

    /// Teams paired with their faction key, when the payload has one.
    pub fn teams(&self) -> Vec<(Option<&str>, &HistoryTeam)> {
        match &self.teams {
            Some(HistoryTeams::List(list)) => list.iter().map(|t| (None, t)).collect(),
            Some(HistoryTeams::Factions(map)) => {
                map.iter().map(|(k, t)| (Some(k.as_str()), t)).collect()
            }
            None => Vec::new(),
        }
    }

    pub fn winner(&self) -> Option<&str> {
        self.results.as_ref().and_then(|r| r.winner.as_deref())
    }
}

impl HistoryPlayer {
    /// Integer stat from the per-match block. FACEIT sends these as strings
    /// ("21"), older payloads as numbers. Missing or unparsable is 0.
    pub fn stat(&self, key: &str) -> u64 {
        let Some(value) = self.player_stats.as_ref().and_then(|s| s.get(key)) else {
            return 0;
        };
        match value {
            serde_json::Value::Number(n) => n
                .as_u64()
                .or_else(|| n.as_f64().map(|f| f.max(0.0) as u64))
                .unwrap_or(0),
            serde_json::Value::String(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().map(|f| f.max(0.0) as u64))
                    .unwrap_or(0)
            }
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_mapping_known_and_unknown() {
        assert_eq!(region_display(Some("OCE")), "Oceania");
        assert_eq!(region_display(Some("ASIA")), "Asia");
        assert_eq!(region_display(Some("XX")), "XX");
        assert_eq!(region_display(None), "Europe");
    }

    #[test]
    fn missing_voting_means_unknown_map() {
        let details: MatchDetails = serde_json::from_str(r#"{"region":"NA"}"#).unwrap();
        assert_eq!(details.map_name(), "Unknown");

        let details: MatchDetails =
            serde_json::from_str(r#"{"voting":{"map":{"pick":[]}}}"#).unwrap();
        assert_eq!(details.map_name(), "Unknown");

        let details: MatchDetails =
            serde_json::from_str(r#"{"voting":{"location":{"pick":["Frankfurt"]}}}"#).unwrap();
        assert_eq!(details.map_name(), "Unknown");
    }

    #[test]
    fn snapshot_flattens_both_factions() {
        let raw = r#"{
            "match_id": "1-abc",
            "region": "OCE",
            "voting": {"map": {"pick": ["de_mirage", "de_inferno"]}},
            "teams": {
                "faction1": {"name": "team_a", "roster": [
                    {"nickname": "UNCRKING", "game_skill_level": 10},
                    {"nickname": "mate"}
                ]},
                "faction2": {"name": "team_b", "roster": [
                    {"nickname": "enemy", "game_skill_level": 7}
                ]}
            }
        }"#;
        let details: MatchDetails = serde_json::from_str(raw).unwrap();
        let snap = MatchSnapshot::from_details("1-abc", details);

        assert_eq!(snap.map, "de_mirage");
        assert_eq!(snap.server_region, "Oceania");
        assert_eq!(snap.room_url, "https://www.faceit.com/ru/cs2/room/1-abc");
        assert_eq!(snap.teams[0].len(), 2);
        assert_eq!(snap.teams[0][0].skill_label(), "10");
        assert_eq!(snap.teams[0][1].skill_label(), "?");
        assert_eq!(snap.teams[1][0].nickname, "enemy");
    }

    #[test]
    fn roster_tolerates_string_levels_and_null_nicknames() {
        let raw = r#"{
            "teams": {
                "faction1": {"roster": [
                    {"nickname": "UNCRKING", "game_skill_level": "10"},
                    {"nickname": null, "game_skill_level": 4.0},
                    {"nickname": "mate", "game_skill_level": "n/a"}
                ]},
                "faction2": {"roster": [
                    {"nickname": "enemy", "game_skill_level": null},
                    {"nickname": "other", "game_skill_level": ""}
                ]}
            }
        }"#;
        let details: MatchDetails = serde_json::from_str(raw).unwrap();
        let snap = MatchSnapshot::from_details("m", details);

        assert_eq!(snap.teams[0][0].skill_level, Some(SkillLevel::Num(10)));
        assert_eq!(snap.teams[0][1].nickname, "?");
        assert_eq!(snap.teams[0][1].skill_label(), "4");
        assert_eq!(snap.teams[0][2].skill_label(), "n/a");
        assert_eq!(snap.teams[1][0].skill_label(), "?");
        assert_eq!(snap.teams[1][1].skill_label(), "?");
    }

    #[test]
    fn snapshot_without_teams_has_empty_rosters() {
        let snap = MatchSnapshot::from_details("m", MatchDetails::default());
        assert!(snap.teams[0].is_empty());
        assert!(snap.teams[1].is_empty());
        assert_eq!(snap.server_region, "Europe");
    }

    #[test]
    fn history_accepts_faction_map_and_list() {
        let by_faction: HistoryMatch = serde_json::from_str(
            r#"{"teams":{"faction1":{"players":[{"nickname":"a"}]},"faction2":{"players":[]}},
                "results":{"winner":"faction1"}}"#,
        )
        .unwrap();
        let teams = by_faction.teams();
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].0, Some("faction1"));
        assert_eq!(by_faction.winner(), Some("faction1"));

        let as_list: HistoryMatch = serde_json::from_str(
            r#"{"teams":[{"victory":true,"players":[{"nickname":"a"},{"nickname":null}]}]}"#,
        )
        .unwrap();
        assert_eq!(as_list.teams()[0].0, None);
        assert_eq!(as_list.teams()[0].1.victory, Some(true));
        let players = as_list.teams()[0].1.players.as_deref().unwrap_or_default();
        assert_eq!(players[1].nickname, None);
    }

    #[test]
    fn player_stat_parses_strings_and_numbers() {
        let player: HistoryPlayer = serde_json::from_str(
            r#"{"nickname":"a","player_stats":{"Kills":"21","Deaths":14,"K/D Ratio":"1.5"}}"#,
        )
        .unwrap();
        assert_eq!(player.stat("Kills"), 21);
        assert_eq!(player.stat("Deaths"), 14);
        assert_eq!(player.stat("Assists"), 0);

        let bare = HistoryPlayer::default();
        assert_eq!(bare.stat("Kills"), 0);
    }

    #[test]
    fn played_at_prefers_created_at() {
        let m = HistoryMatch { created_at: Some(5_000), finished_at: Some(9), ..Default::default() };
        assert_eq!(m.played_at_ms(), Some(5_000));
        let m = HistoryMatch { finished_at: Some(9), ..Default::default() };
        assert_eq!(m.played_at_ms(), Some(9_000));
    }
}
