/// faceit-watch — Match Watcher
///
/// One cycle:
///   1. ask the source for the tracked player's live match
///   2. new match_id → record it, send the notification, wait the cooldown (300s)
///   3. same match_id or no match → wait the poll interval (120s)
///   4. failure → log it, wait the backoff (60s), carry on
///
/// Cycle failures never stop the loop. Only a missing destination channel at
/// startup does.

use async_trait::async_trait;
use faceit_api::{FaceitClient, FaceitError, MatchSnapshot};
use logger::{now_iso, EventLogger, MatchNotifiedEvent, WatcherCycleEvent};
use notify_format::{match_payload, NotificationPayload};
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

pub const POLL_INTERVAL_SECS: u64 = 120;
pub const NOTIFY_COOLDOWN_SECS: u64 = 300;
pub const ERROR_BACKOFF_SECS: u64 = 60;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("destination unavailable: {0}")]
    Destination(String),
    #[error("delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, Error)]
pub enum WatcherError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("match source error: {0}")]
    Source(#[from] FaceitError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}

// ── Seams ────────────────────────────────────────────────────────────────────

/// Where the watcher learns about the tracked player's live match.
/// `Ok(None)` covers both "not playing" and "couldn't tell".
#[async_trait]
pub trait MatchSource: Send + Sync {
    async fn live_match(&self, nickname: &str) -> Result<Option<MatchSnapshot>, FaceitError>;
}

/// Where notifications go.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn ensure_destination(&self) -> Result<(), NotifyError>;
    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError>;
}

#[async_trait]
impl MatchSource for FaceitClient {
    async fn live_match(&self, nickname: &str) -> Result<Option<MatchSnapshot>, FaceitError> {
        Ok(self.lookup_current_match(nickname).await)
    }
}

#[async_trait]
impl<T: MatchSource + ?Sized> MatchSource for Arc<T> {
    async fn live_match(&self, nickname: &str) -> Result<Option<MatchSnapshot>, FaceitError> {
        (**self).live_match(nickname).await
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    async fn ensure_destination(&self) -> Result<(), NotifyError> {
        (**self).ensure_destination().await
    }

    async fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        (**self).send(payload).await
    }
}

// ── Config / state ───────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct WatcherConfig {
    pub nickname:      String,
    pub poll_interval: Duration,
    pub cooldown:      Duration,
    pub error_backoff: Duration,
}

impl WatcherConfig {
    pub fn new(nickname: impl Into<String>) -> Self {
        Self {
            nickname:      nickname.into(),
            poll_interval: Duration::from_secs(POLL_INTERVAL_SECS),
            cooldown:      Duration::from_secs(NOTIFY_COOLDOWN_SECS),
            error_backoff: Duration::from_secs(ERROR_BACKOFF_SECS),
        }
    }
}

/// Cross-cycle memory. Lives as long as the process; a restart re-arms
/// notification for a match that is still running.
#[derive(Debug, Default)]
pub struct WatcherState {
    pub last_notified_match_id: Option<String>,
    // Grows by one id per match played while the process runs.
    notified: HashSet<String>,
}

impl WatcherState {
    pub fn already_notified(&self, match_id: &str) -> bool {
        self.notified.contains(match_id)
    }

    fn mark_notified(&mut self, match_id: &str) {
        self.last_notified_match_id = Some(match_id.to_string());
        self.notified.insert(match_id.to_string());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherPhase {
    Idle,
    Polling,
    Unchanged,
    NewMatch,
    Error,
}

impl WatcherPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            WatcherPhase::Idle      => "idle",
            WatcherPhase::Polling   => "polling",
            WatcherPhase::Unchanged => "unchanged",
            WatcherPhase::NewMatch  => "new_match",
            WatcherPhase::Error     => "error",
        }
    }
}

#[derive(Debug)]
pub enum CycleOutcome {
    Unchanged,
    Notified(MatchSnapshot),
}

/// One poll. The state is marked before sending, so a failed delivery is
/// not retried for the same match.
pub async fn run_cycle<S, N>(
    source:   &S,
    notifier: &N,
    nickname: &str,
    state:    &mut WatcherState,
) -> Result<CycleOutcome, WatcherError>
where
    S: MatchSource + ?Sized,
    N: Notifier + ?Sized,
{
    let Some(snapshot) = source.live_match(nickname).await? else {
        debug!("No live match for {}", nickname);
        return Ok(CycleOutcome::Unchanged);
    };

    if state.already_notified(&snapshot.match_id) {
        debug!("Match {} already announced", snapshot.match_id);
        return Ok(CycleOutcome::Unchanged);
    }

    state.mark_notified(&snapshot.match_id);
    notifier.send(&match_payload(nickname, &snapshot)).await?;
    info!("✅ Notification for match {} sent", snapshot.match_id);

    Ok(CycleOutcome::Notified(snapshot))
}

// ── Watcher ──────────────────────────────────────────────────────────────────

pub struct MatchWatcher<S, N> {
    source:   S,
    notifier: N,
    config:   WatcherConfig,
    state:    WatcherState,
    phase:    WatcherPhase,
    cycles:   u64,
    events:   Option<EventLogger>,
}

impl<S: MatchSource, N: Notifier> MatchWatcher<S, N> {
    pub fn new(source: S, notifier: N, config: WatcherConfig) -> Self {
        Self {
            source,
            notifier,
            config,
            state: WatcherState::default(),
            phase: WatcherPhase::Idle,
            cycles: 0,
            events: None,
        }
    }

    pub fn with_event_log(mut self, events: EventLogger) -> Self {
        self.events = Some(events);
        self
    }

    pub fn state(&self) -> &WatcherState {
        &self.state
    }

    pub fn phase(&self) -> WatcherPhase {
        self.phase
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Runs one cycle and returns how long to wait before the next.
    pub async fn step(&mut self) -> Duration {
        self.cycles += 1;
        self.phase = WatcherPhase::Polling;
        info!("🔍 Match check #{}", self.cycles);

        let outcome = run_cycle(&self.source, &self.notifier, &self.config.nickname, &mut self.state).await;

        let (phase, delay) = match outcome {
            Ok(CycleOutcome::Unchanged) => (WatcherPhase::Unchanged, self.config.poll_interval),
            Ok(CycleOutcome::Notified(snapshot)) => {
                self.log_event(&MatchNotifiedEvent {
                    ts:       now_iso(),
                    event:    "MATCH_NOTIFIED",
                    nickname: self.config.nickname.clone(),
                    match_id: snapshot.match_id.clone(),
                    map:      snapshot.map.clone(),
                    region:   snapshot.server_region.clone(),
                });
                (WatcherPhase::NewMatch, self.config.cooldown)
            }
            Err(e) => {
                error!("❌ Watcher cycle #{} failed: {}", self.cycles, e);
                (WatcherPhase::Error, self.config.error_backoff)
            }
        };

        self.phase = phase;
        self.log_event(&WatcherCycleEvent {
            ts:             now_iso(),
            event:          "WATCHER_CYCLE",
            cycle:          self.cycles,
            phase:          phase.as_str().to_string(),
            match_id:       self.state.last_notified_match_id.clone(),
            next_poll_secs: delay.as_secs(),
        });
        delay
    }

    /// Checks the destination once, then polls forever.
    pub async fn run(mut self) -> Result<(), WatcherError> {
        if let Err(e) = self.notifier.ensure_destination().await {
            error!("❌ Notification channel unavailable, watcher stopped: {}", e);
            return Err(WatcherError::Configuration(e.to_string()));
        }

        info!(
            "📡 Watching {} (poll {}s, cooldown {}s, backoff {}s)",
            self.config.nickname,
            self.config.poll_interval.as_secs(),
            self.config.cooldown.as_secs(),
            self.config.error_backoff.as_secs()
        );

        loop {
            let delay = self.step().await;
            sleep(delay).await;
        }
    }

    fn log_event<T: Serialize>(&self, event: &T) {
        if let Some(events) = &self.events {
            if let Err(e) = events.log(event) {
                warn!("Event log write failed: {}", e);
            }
        }
    }
}
