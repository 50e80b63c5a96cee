//! Session store: the one piece of shared mutable state in the portal.
//!
//! Each browser session owns a `SessionStore`. Components read it through snapshots or a
//! `watch` subscription; only the store's own operations (`restore`, `sign_in`, `sign_up`,
//! `sign_out`) mutate it.

use std::{
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use tokio::{sync::watch, time::Instant};
use tokio_util::sync::CancellationToken;

use crate::{
    auth::{AuthState, TokenVerifier},
    error::AuthError,
    landing::landing_for,
    models::{Profile, Role, SessionView, SignUpRequest, UserIdentity},
};

pub mod cookies;
pub mod gate;
pub mod registry;

pub use gate::{SubmitGate, SubmitGuard};
pub use registry::{Attached, RegistryState, SessionRegistry};

/// Session
///
/// The resolved (or resolving) authentication state of one browser session. While
/// `resolving` is true, `identity` and `profile` are not authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub identity: Option<UserIdentity>,
    pub profile: Option<Profile>,
    pub resolving: bool,
}

impl Session {
    /// Initial state of a session that still has a stored token to restore.
    pub fn unresolved() -> Self {
        Self {
            resolving: true,
            ..Self::default()
        }
    }

    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn authenticated(identity: UserIdentity, profile: Option<Profile>) -> Self {
        Self {
            identity: Some(identity),
            profile,
            resolving: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.resolving && self.identity.is_some()
    }

    /// The profile role, withheld while the session is resolving.
    pub fn role(&self) -> Option<Role> {
        if self.resolving {
            return None;
        }
        self.profile.as_ref().and_then(|profile| profile.role)
    }
}

/// ClientSession
///
/// Request extension carrying the caller's session store, attached by the session layer.
#[derive(Clone)]
pub struct ClientSession(pub Arc<SessionStore>);

/// Commit counters. `epoch` moves on every published transition and when a sign-out
/// starts; `sign_outs` moves only when a sign-out starts.
#[derive(Debug, Clone, Copy, Default)]
struct Generations {
    epoch: u64,
    sign_outs: u64,
}

/// SessionStore
///
/// Holds one browser session's state and performs its transitions. Each operation records
/// the generations it started from and publishes only if they still hold:
///
/// - a restoration is discarded once anything else was published or a sign-out started;
/// - a sign-in or sign-up is discarded (and its grant revoked) once a sign-out started;
/// - a failed sign-in puts back the resolving flag it found, unless something newer was
///   published in the meantime, so a pending restoration still lands.
///
/// Checks and publishes happen under the `generations` lock, never across an await.
pub struct SessionStore {
    auth: AuthState,
    state: watch::Sender<Session>,
    access_token: Mutex<Option<String>>,
    generations: Mutex<Generations>,
    gate: SubmitGate,
    cancel: CancellationToken,
    last_seen: Mutex<Instant>,
}

impl SessionStore {
    pub fn new(auth: AuthState, initial: Session, cancel: CancellationToken) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            auth,
            state,
            access_token: Mutex::new(None),
            generations: Mutex::new(Generations::default()),
            gate: SubmitGate::default(),
            cancel,
            last_seen: Mutex::new(Instant::now()),
        }
    }

    /// Marks the browser session as active now.
    pub fn touch(&self) {
        *self.last_seen.lock().unwrap_or_else(PoisonError::into_inner) = Instant::now();
    }

    /// Time since the browser last used this session.
    pub fn idle_for(&self) -> Duration {
        self.last_seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .elapsed()
    }

    pub fn snapshot(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// Waits until the session leaves the resolving state and returns it.
    pub async fn resolved(&self) -> Session {
        let mut rx = self.subscribe();
        match rx.wait_for(|session| !session.resolving).await {
            Ok(session) => session.clone(),
            Err(_) => self.snapshot(),
        }
    }

    /// True while a sign-in or sign-up is in flight (the submit control is disabled).
    pub fn is_submitting(&self) -> bool {
        self.gate.is_loading()
    }

    pub fn access_token(&self) -> Option<String> {
        self.token_slot().clone()
    }

    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Cancels any pending restoration owned by this store.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    /// The session as exposed to the front end.
    pub fn view(&self) -> SessionView {
        let session = self.snapshot();
        let landing = match (&session.identity, session.resolving) {
            (Some(_), false) => Some(
                landing_for(session.profile.as_ref())
                    .path()
                    .to_string(),
            ),
            _ => None,
        };
        SessionView {
            resolving: session.resolving,
            authenticated: session.is_authenticated(),
            submitting: self.is_submitting(),
            identity: session.identity,
            profile: session.profile,
            landing,
        }
    }

    /// restore
    ///
    /// Resolves the session from a stored access token, exactly once per attempt: an absent
    /// or invalid token resolves anonymous, a valid one resolves authenticated with the
    /// profile the backend returns (or none if the lookup fails).
    pub async fn restore(&self, verifier: &TokenVerifier, access_token: Option<String>) -> Session {
        let started = *self.generations();

        let (resolved, token) = match access_token {
            None => (Session::anonymous(), None),
            Some(token) => match verifier.verify(&token) {
                Ok(claims) => {
                    let identity = claims.identity();
                    let profile = self.load_profile(&identity, &token).await;
                    (Session::authenticated(identity, profile), Some(token))
                }
                Err(_) => (Session::anonymous(), None),
            },
        };

        {
            let mut generations = self.generations();
            if generations.epoch == started.epoch {
                generations.epoch += 1;
                *self.token_slot() = token;
                self.publish(resolved.clone());
                tracing::debug!(authenticated = resolved.is_authenticated(), "session restored");
                return resolved;
            }
        }
        tracing::debug!("restoration superseded by a newer transition; result discarded");
        self.snapshot()
    }

    /// sign_in
    ///
    /// Exchanges credentials for a session. Rejected with `AuthError::InFlight` without
    /// contacting the backend while another sign-in/up is pending, and with
    /// `AuthError::Superseded` when a sign-out started before the grant arrived. On failure
    /// the session returns to the state it was in before the attempt.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let _submitting = self.gate.try_begin().ok_or(AuthError::InFlight)?;
        let (previous, started) = self.enter_resolving();

        match self.auth.sign_in(email, password).await {
            Ok(grant) => {
                let profile = self.load_profile(&grant.identity, &grant.access_token).await;
                let session = Session::authenticated(grant.identity, profile);
                self.commit_grant(started, session, grant.access_token).await
            }
            Err(e) => {
                tracing::info!(error = %e, "sign-in failed");
                self.settle(&previous, started);
                Err(e)
            }
        }
    }

    /// sign_up
    ///
    /// Registers an account. Returns the new session when the provider signs the user in
    /// directly, or `None` when email confirmation is pending.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<Session>, AuthError> {
        if !request.role.is_self_assignable() {
            return Err(AuthError::RoleNotAllowed(request.role.as_str().to_string()));
        }
        let _submitting = self.gate.try_begin().ok_or(AuthError::InFlight)?;
        let (previous, started) = self.enter_resolving();

        match self.auth.sign_up(request).await {
            Ok(Some(grant)) => {
                let profile = self.load_profile(&grant.identity, &grant.access_token).await;
                let session = Session::authenticated(grant.identity, profile);
                self.commit_grant(started, session, grant.access_token)
                    .await
                    .map(Some)
            }
            Ok(None) => {
                self.settle(&previous, started);
                Ok(None)
            }
            Err(e) => {
                tracing::info!(error = %e, "sign-up failed");
                self.settle(&previous, started);
                Err(e)
            }
        }
    }

    /// sign_out
    ///
    /// Resets the session to anonymous. The local reset happens even if revoking the grant
    /// upstream fails; that failure is still reported to the caller.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let (started, token) = {
            let mut generations = self.generations();
            generations.epoch += 1;
            generations.sign_outs += 1;
            self.state.send_modify(|session| session.resolving = true);
            (*generations, self.token_slot().take())
        };

        let result = match token {
            Some(token) => self.auth.sign_out(&token).await,
            None => Ok(()),
        };

        {
            // A sign-in started after this sign-out and already published wins.
            let generations = self.generations();
            if generations.epoch == started.epoch {
                self.publish(Session::anonymous());
            }
        }
        if let Err(e) = &result {
            tracing::warn!(error = %e, "upstream sign-out failed; local session cleared");
        }
        result
    }

    async fn load_profile(&self, identity: &UserIdentity, access_token: &str) -> Option<Profile> {
        match self.auth.fetch_profile(identity, access_token).await {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(user_id = %identity.id, error = %e, "profile lookup failed; role unset");
                None
            }
        }
    }

    /// Publishes a sign-in/up result unless a sign-out started after the attempt did. A
    /// discarded grant is revoked upstream so it does not outlive the sign-out.
    async fn commit_grant(
        &self,
        started: Generations,
        session: Session,
        access_token: String,
    ) -> Result<Session, AuthError> {
        {
            let mut generations = self.generations();
            if generations.sign_outs == started.sign_outs {
                generations.epoch += 1;
                *self.token_slot() = Some(access_token);
                tracing::info!(role = ?session.role(), "sign-in succeeded");
                self.publish(session.clone());
                return Ok(session);
            }
        }

        tracing::info!("sign-out arrived while signing in; grant discarded");
        if let Err(e) = self.auth.sign_out(&access_token).await {
            tracing::warn!(error = %e, "revoking the discarded grant failed");
        }
        Err(AuthError::Superseded)
    }

    /// Ends a failed or unconfirmed attempt. Puts back the resolving flag found at the start,
    /// which keeps a pending restoration pending, unless something newer was published.
    fn settle(&self, previous: &Session, started: Generations) {
        let generations = self.generations();
        if generations.epoch == started.epoch {
            self.state
                .send_modify(|session| session.resolving = previous.resolving);
        }
    }

    fn enter_resolving(&self) -> (Session, Generations) {
        let generations = self.generations();
        let mut previous = Session::default();
        self.state.send_modify(|session| {
            previous = session.clone();
            session.resolving = true;
        });
        (previous, *generations)
    }

    fn publish(&self, session: Session) {
        self.state.send_replace(session);
    }

    fn generations(&self) -> MutexGuard<'_, Generations> {
        self.generations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn token_slot(&self) -> MutexGuard<'_, Option<String>> {
        self.access_token.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
