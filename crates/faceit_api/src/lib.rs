/// faceit-watch — FACEIT Data API client
///
/// Five read-only lookups, each one GET with a bearer token:
///   players?nickname=      → player id
///   players/{id}/current-match
///   matches/{id}           → MatchSnapshot
///   players/{id}           → profile (elo, level)
///   players/{id}/history   → last 30 matches
///
/// No retries here; the watcher decides when to ask again.

pub mod model;
#[cfg(any(test, feature = "test-stub"))]
pub mod stub;

pub use model::*;

use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_BASE_URL: &str = "https://open.faceit.com/data/v4";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const HISTORY_PAGE_SIZE: u32 = 30;
pub const GAME: &str = "cs2";

#[derive(Debug, Error)]
pub enum FaceitError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("HTTP {status} from {path}: {body}")]
    Status { status: u16, path: String, body: String },
    #[error("bad payload from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone)]
pub struct FaceitClient {
    client:   reqwest::Client,
    base_url: String,
    api_key:  String,
}

impl FaceitClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self, FaceitError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key:  impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, FaceitError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key:  api_key.into(),
        })
    }

    async fn get_body(&self, path: &str, query: &[(&str, &str)]) -> Result<String, FaceitError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FaceitError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FaceitError::Status {
                status: status.as_u16(),
                path:   path.to_string(),
                body:   body.chars().take(200).collect(),
            });
        }

        Ok(resp.text().await?)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path:  &str,
        query: &[(&str, &str)],
    ) -> Result<T, FaceitError> {
        let raw = self.get_body(path, query).await?;
        serde_json::from_str(&raw).map_err(|source| FaceitError::Decode {
            path: path.to_string(),
            source,
        })
    }

    pub async fn resolve_player_id(&self, nickname: &str) -> Result<PlayerId, FaceitError> {
        let lookup: PlayerLookup = self.get_json("/players", &[("nickname", nickname)]).await?;
        debug!("Resolved {} → {}", nickname, lookup.player_id);
        Ok(PlayerId(lookup.player_id))
    }

    /// `None` when the player has no match in progress.
    pub async fn current_match(&self, player_id: &PlayerId) -> Result<Option<MatchRef>, FaceitError> {
        let path = format!("/players/{}/current-match", player_id);
        let raw = self.get_body(&path, &[]).await?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let parsed: Option<CurrentMatchResponse> = serde_json::from_str(&raw)
            .map_err(|source| FaceitError::Decode { path, source })?;

        Ok(parsed
            .and_then(|m| m.match_id)
            .filter(|id| !id.is_empty())
            .map(|match_id| MatchRef { match_id }))
    }

    pub async fn match_details(&self, match_id: &str) -> Result<MatchSnapshot, FaceitError> {
        let path = format!("/matches/{}", match_id);
        let details: MatchDetails = self.get_json(&path, &[]).await?;
        Ok(MatchSnapshot::from_details(match_id, details))
    }

    pub async fn player_profile(&self, player_id: &PlayerId) -> Result<PlayerProfile, FaceitError> {
        self.get_json(&format!("/players/{}", player_id), &[]).await
    }

    /// Most recent matches, newest first, one page of `HISTORY_PAGE_SIZE`.
    pub async fn match_history(&self, player_id: &PlayerId) -> Result<Vec<HistoryMatch>, FaceitError> {
        let limit = HISTORY_PAGE_SIZE.to_string();
        let page: HistoryPage = self
            .get_json(
                &format!("/players/{}/history", player_id),
                &[("game", GAME), ("offset", "0"), ("limit", limit.as_str())],
            )
            .await?;
        Ok(page.items.unwrap_or_default())
    }

    /// nickname → player id → current match → details, stopping at the first
    /// miss. Every failure is logged and reported as "no match".
    pub async fn lookup_current_match(&self, nickname: &str) -> Option<MatchSnapshot> {
        let player_id = match self.resolve_player_id(nickname).await {
            Ok(id) => id,
            Err(e) => {
                warn!("Player lookup for {} failed: {}", nickname, e);
                return None;
            }
        };

        let match_ref = match self.current_match(&player_id).await {
            Ok(Some(m)) => m,
            Ok(None) | Err(FaceitError::NotFound(_)) => {
                debug!("{} has no match in progress", nickname);
                return None;
            }
            Err(e) => {
                warn!("Current match lookup for {} failed: {}", nickname, e);
                return None;
            }
        };

        match self.match_details(&match_ref.match_id).await {
            Ok(snapshot) => {
                info!("{} is in match {} on {}", nickname, snapshot.match_id, snapshot.map);
                Some(snapshot)
            }
            Err(e) => {
                warn!("Match details for {} failed: {}", match_ref.match_id, e);
                None
            }
        }
    }
}
