use std::{
    collections::{HashMap, hash_map::Entry},
    sync::{Arc, PoisonError, RwLock},
    time::Duration,
};

use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::{Session, SessionStore};
use crate::auth::{AuthState, TokenVerifier};

/// Attached
///
/// Result of binding a request to a browser session. `issued` is true when the client had
/// no id yet and the caller must hand the new one back as a cookie.
pub struct Attached {
    pub client_id: Uuid,
    pub store: Arc<SessionStore>,
    pub issued: bool,
}

/// SessionRegistry
///
/// Owns every live `SessionStore`, keyed by the browser's client id. Created once at
/// startup and shut down at exit; shutdown cancels all pending restorations and stops the
/// idle sweep. A browser whose store was evicted gets a fresh one on its next request,
/// restored from its access-token cookie.
pub struct SessionRegistry {
    auth: AuthState,
    verifier: TokenVerifier,
    stores: RwLock<HashMap<Uuid, Arc<SessionStore>>>,
    shutdown: CancellationToken,
}

/// RegistryState
///
/// The shared handle placed in the application state.
pub type RegistryState = Arc<SessionRegistry>;

/// Bounds on how often the idle sweep runs.
const MIN_SWEEP_PERIOD: Duration = Duration::from_secs(1);
const MAX_SWEEP_PERIOD: Duration = Duration::from_secs(60);

impl SessionRegistry {
    pub fn new(auth: AuthState, verifier: TokenVerifier) -> Self {
        Self {
            auth,
            verifier,
            stores: RwLock::new(HashMap::new()),
            shutdown: CancellationToken::new(),
        }
    }

    /// attach
    ///
    /// Returns the store for `client_id`, creating it when unknown. A new store with a stored
    /// access token starts unresolved and restores in a spawned task; without a token it
    /// starts resolved-anonymous. Must be called from within a Tokio runtime.
    pub fn attach(&self, client_id: Option<Uuid>, access_token: Option<String>) -> Attached {
        if let Some(id) = client_id {
            let stores = self.stores.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(store) = stores.get(&id) {
                store.touch();
                return Attached {
                    client_id: id,
                    store: store.clone(),
                    issued: false,
                };
            }
        }

        let id = client_id.unwrap_or_else(Uuid::new_v4);
        let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
        let store = match stores.entry(id) {
            Entry::Occupied(existing) => {
                existing.get().touch();
                existing.get().clone()
            }
            Entry::Vacant(slot) => {
                let store = self.create_store(access_token);
                slot.insert(store.clone());
                tracing::debug!(client_id = %id, "browser session created");
                store
            }
        };

        Attached {
            client_id: id,
            store,
            issued: client_id.is_none(),
        }
    }

    pub fn get(&self, client_id: Uuid) -> Option<Arc<SessionStore>> {
        self.stores
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&client_id)
            .cloned()
    }

    /// Drops a browser session, cancelling its restoration if still pending.
    pub fn remove(&self, client_id: Uuid) -> bool {
        let removed = self
            .stores
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&client_id);
        match removed {
            Some(store) => {
                store.teardown();
                true
            }
            None => false,
        }
    }

    /// evict_idle
    ///
    /// Drops every store whose browser has not been seen for at least `max_idle`, cancelling
    /// any restoration it still has pending. Returns how many were evicted.
    pub fn evict_idle(&self, max_idle: Duration) -> usize {
        let evicted: Vec<Arc<SessionStore>> = {
            let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
            let idle: Vec<Uuid> = stores
                .iter()
                .filter(|(_, store)| store.idle_for() >= max_idle)
                .map(|(id, _)| *id)
                .collect();
            idle.iter().filter_map(|id| stores.remove(id)).collect()
        };

        for store in &evicted {
            store.teardown();
        }
        if !evicted.is_empty() {
            tracing::debug!(
                evicted = evicted.len(),
                remaining = self.len(),
                "idle browser sessions evicted"
            );
        }
        evicted.len()
    }

    /// spawn_eviction
    ///
    /// Starts the periodic idle sweep. It runs every `max_idle` (clamped to 1s..=60s) and
    /// stops when the registry shuts down or is dropped.
    pub fn spawn_eviction(self: &Arc<Self>, max_idle: Duration) -> JoinHandle<()> {
        let registry = Arc::downgrade(self);
        let shutdown = self.shutdown.clone();
        let period = max_idle.clamp(MIN_SWEEP_PERIOD, MAX_SWEEP_PERIOD);

        tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => {
                        let Some(registry) = registry.upgrade() else { break };
                        registry.evict_idle(max_idle);
                    }
                }
            }
            tracing::debug!("idle session sweep stopped");
        })
    }

    pub fn len(&self) -> usize {
        self.stores.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cancels every pending restoration and drops all stores.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        let drained = {
            let mut stores = self.stores.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::take(&mut *stores)
        };
        tracing::info!(sessions = drained.len(), "session registry shut down");
    }

    fn create_store(&self, access_token: Option<String>) -> Arc<SessionStore> {
        let cancel = self.shutdown.child_token();
        let Some(token) = access_token else {
            return Arc::new(SessionStore::new(self.auth.clone(), Session::anonymous(), cancel));
        };

        let store = Arc::new(SessionStore::new(
            self.auth.clone(),
            Session::unresolved(),
            cancel.clone(),
        ));
        let task_store = store.clone();
        let verifier = self.verifier.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("session restoration cancelled before completion");
                }
                _ = task_store.restore(&verifier, Some(token)) => {}
            }
        });
        store
    }
}
