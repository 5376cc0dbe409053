//! Match registry - the multi-match state store.
//!
//! Each match is an independent slot with its own locks, so matches never
//! contend with each other. Within a slot, mutations are serialized by a
//! gate that is only ever try-locked: a second writer gets `Busy` instead
//! of queuing. Readers take the state lock alone and always observe a
//! state either before or after a command, never in between.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use tokio::sync::{Mutex, RwLock};
use wicket_engine::{
    Error as EngineError, LiveSnapshot, MatchId, MatchInfo, MatchState, SquadRoster,
};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::websocket::{MessageSender, ServerMessage, SubscriberHub};

/// One registered match.
#[derive(Debug)]
pub struct MatchSlot {
    pub id: MatchId,
    pub roster: SquadRoster,
    pub created_at: DateTime<Utc>,
    state: RwLock<MatchState>,
    /// Held for the whole of a mutation, including publishing
    pub(crate) gate: Mutex<()>,
    admitted: AtomicU64,
}

impl MatchSlot {
    fn new(state: MatchState, roster: SquadRoster) -> Self {
        Self {
            id: state.info().id.clone(),
            roster,
            created_at: Utc::now(),
            state: RwLock::new(state),
            gate: Mutex::new(()),
            admitted: AtomicU64::new(0),
        }
    }
}

/// All live matches, keyed by match id.
#[derive(Debug)]
pub struct MatchRegistry {
    matches: DashMap<MatchId, Arc<MatchSlot>>,
    hub: Arc<SubscriberHub>,
    recent_deliveries: usize,
    replay_check_interval: u64,
}

impl MatchRegistry {
    pub fn new(config: &Config, hub: Arc<SubscriberHub>) -> Self {
        Self {
            matches: DashMap::new(),
            hub,
            recent_deliveries: config.recent_deliveries,
            replay_check_interval: config.replay_check_interval,
        }
    }

    pub fn new_shared(config: &Config) -> Arc<Self> {
        Arc::new(Self::new(config, SubscriberHub::new_shared()))
    }

    pub fn hub(&self) -> &Arc<SubscriberHub> {
        &self.hub
    }

    /// Register a new match in setup.
    pub fn create(&self, info: MatchInfo, roster: SquadRoster) -> Result<Arc<MatchSlot>> {
        match self.matches.entry(info.id.clone()) {
            Entry::Occupied(_) => Err(AppError::MatchExists(info.id)),
            Entry::Vacant(entry) => {
                let slot = Arc::new(MatchSlot::new(MatchState::new(info), roster));
                entry.insert(slot.clone());
                tracing::info!(match_id = %slot.id, "Match registered");
                Ok(slot)
            }
        }
    }

    pub fn slot(&self, match_id: &str) -> Result<Arc<MatchSlot>> {
        self.matches
            .get(match_id)
            .map(|slot| slot.value().clone())
            .ok_or_else(|| AppError::MatchNotFound(match_id.to_string()))
    }

    pub fn contains(&self, match_id: &str) -> bool {
        self.matches.contains_key(match_id)
    }

    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Current snapshot. Never blocked by the gate.
    pub async fn snapshot(&self, match_id: &str) -> Result<LiveSnapshot> {
        let slot = self.slot(match_id)?;
        let state = slot.state.read().await;
        Ok(state.live_snapshot(&slot.roster, self.recent_deliveries))
    }

    /// Run one mutation against a match and publish the result.
    ///
    /// `op` must leave the state untouched when it fails; every engine
    /// operation does.
    pub async fn mutate<F>(&self, match_id: &str, op: F) -> Result<LiveSnapshot>
    where
        F: FnOnce(&mut MatchState, &SquadRoster) -> wicket_engine::error::Result<()>,
    {
        let slot = self.slot(match_id)?;
        let _gate = slot.gate.try_lock().map_err(|_| EngineError::Busy)?;

        let snapshot = {
            let mut state = slot.state.write().await;
            let before = state.status();
            op(&mut *state, &slot.roster)?;
            if state.status() != before {
                tracing::info!(
                    match_id = %match_id,
                    from = %before,
                    to = %state.status(),
                    "Match status changed"
                );
            }
            state.live_snapshot(&slot.roster, self.recent_deliveries)
        };

        let admitted = slot.admitted.fetch_add(1, Ordering::Relaxed) + 1;
        if self.replay_check_interval > 0 && admitted % self.replay_check_interval == 0 {
            self.check_consistency(&slot).await;
        }

        self.hub.publish(match_id, &ServerMessage::snapshot(snapshot.clone()));
        Ok(snapshot)
    }

    /// Register a subscriber and queue the current snapshot for it.
    ///
    /// The read lock is held across both steps so no admitted command can
    /// fall between the initial snapshot and the first published one.
    pub async fn subscribe(&self, match_id: &str, sender: MessageSender) -> Result<String> {
        let slot = self.slot(match_id)?;
        let state = slot.state.read().await;

        if let Err(e) = state.verify() {
            tracing::error!(match_id = %match_id, "Consistency check failed: {}", e);
        }

        let snapshot = state.live_snapshot(&slot.roster, self.recent_deliveries);
        // A closed channel means the client already left; the hub prunes it
        let _ = sender.send(ServerMessage::snapshot(snapshot));
        let conn_id = self.hub.register(match_id, sender);
        Ok(conn_id)
    }

    async fn check_consistency(&self, slot: &MatchSlot) {
        let state = slot.state.read().await;
        match state.verify() {
            Ok(()) => tracing::debug!(match_id = %slot.id, "Ledger replay matches"),
            Err(e) => tracing::error!(match_id = %slot.id, "Consistency check failed: {}", e),
        }
    }
}
