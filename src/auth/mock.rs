use std::{
    sync::{
        PoisonError, RwLock,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use uuid::Uuid;

use super::{AuthBackend, AuthGrant, TokenVerifier};
use crate::{
    error::AuthError,
    models::{Profile, Role, SignUpRequest, UserIdentity},
};

const TOKEN_TTL_HOURS: i64 = 1;

#[derive(Clone)]
struct MockAccount {
    identity: UserIdentity,
    password: String,
    profile: Option<Profile>,
}

/// MockAuthBackend
///
/// In-memory `AuthBackend` used by the test suites and by `AUTH_BACKEND=mock` local runs.
/// Tokens are real HS256 JWTs minted with the configured secret, so session restoration is
/// exercised end to end. Every operation is counted and can be delayed to simulate latency.
pub struct MockAuthBackend {
    verifier: TokenVerifier,
    accounts: RwLock<Vec<MockAccount>>,
    latency: Duration,
    require_confirmation: bool,
    fail_profile_lookup: bool,
    sign_in_calls: AtomicUsize,
    sign_up_calls: AtomicUsize,
    sign_out_calls: AtomicUsize,
    profile_calls: AtomicUsize,
}

impl MockAuthBackend {
    pub fn new(verifier: TokenVerifier) -> Self {
        Self {
            verifier,
            accounts: RwLock::new(Vec::new()),
            latency: Duration::ZERO,
            require_confirmation: false,
            fail_profile_lookup: false,
            sign_in_calls: AtomicUsize::new(0),
            sign_up_calls: AtomicUsize::new(0),
            sign_out_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
        }
    }

    /// One account per role, all with the password `password`. Local development only.
    pub fn seeded_demo(verifier: TokenVerifier) -> Self {
        Self::new(verifier)
            .with_account("admin@jobboard.local", "password", "Ada Admin", Some(Role::Admin))
            .with_account("employer@jobboard.local", "password", "Evan Employer", Some(Role::Employer))
            .with_account("school@jobboard.local", "password", "Sam School", Some(Role::School))
            .with_account("candidate@jobboard.local", "password", "Casey Candidate", Some(Role::Candidate))
    }

    /// Registers an account. `role: None` creates an identity without a profile row.
    pub fn with_account(self, email: &str, password: &str, full_name: &str, role: Option<Role>) -> Self {
        let identity = UserIdentity {
            id: Uuid::new_v4(),
            email: email.to_string(),
        };
        let profile = role.map(|role| Profile {
            id: identity.id,
            full_name: Some(full_name.to_string()),
            email: Some(email.to_string()),
            role: Some(role),
        });
        self.write_accounts().push(MockAccount {
            identity,
            password: password.to_string(),
            profile,
        });
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_email_confirmation(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    pub fn with_failing_profile_lookup(mut self) -> Self {
        self.fail_profile_lookup = true;
        self
    }

    pub fn identity_for(&self, email: &str) -> Option<UserIdentity> {
        self.read_accounts()
            .iter()
            .find(|account| account.identity.email.eq_ignore_ascii_case(email))
            .map(|account| account.identity.clone())
    }

    pub fn sign_in_calls(&self) -> usize {
        self.sign_in_calls.load(Ordering::SeqCst)
    }

    pub fn sign_up_calls(&self) -> usize {
        self.sign_up_calls.load(Ordering::SeqCst)
    }

    pub fn sign_out_calls(&self) -> usize {
        self.sign_out_calls.load(Ordering::SeqCst)
    }

    pub fn profile_calls(&self) -> usize {
        self.profile_calls.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn grant(&self, identity: &UserIdentity) -> Result<AuthGrant, AuthError> {
        Ok(AuthGrant {
            identity: identity.clone(),
            access_token: self
                .verifier
                .mint(identity, chrono::Duration::hours(TOKEN_TTL_HOURS))?,
        })
    }

    fn read_accounts(&self) -> std::sync::RwLockReadGuard<'_, Vec<MockAccount>> {
        self.accounts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_accounts(&self) -> std::sync::RwLockWriteGuard<'_, Vec<MockAccount>> {
        self.accounts.write().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl AuthBackend for MockAuthBackend {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError> {
        self.sign_in_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        let identity = self
            .read_accounts()
            .iter()
            .find(|account| {
                account.identity.email.eq_ignore_ascii_case(email) && account.password == password
            })
            .map(|account| account.identity.clone())
            .ok_or(AuthError::InvalidCredentials)?;

        self.grant(&identity)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<AuthGrant>, AuthError> {
        self.sign_up_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.identity_for(&request.email).is_some() {
            return Err(AuthError::Rejected("User already registered".to_string()));
        }

        let identity = UserIdentity {
            id: Uuid::new_v4(),
            email: request.email.clone(),
        };
        self.write_accounts().push(MockAccount {
            identity: identity.clone(),
            password: request.password.clone(),
            profile: Some(Profile {
                id: identity.id,
                full_name: Some(request.full_name.clone()),
                email: Some(request.email.clone()),
                role: Some(request.role),
            }),
        });

        if self.require_confirmation {
            return Ok(None);
        }
        self.grant(&identity).map(Some)
    }

    async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
        self.sign_out_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;
        Ok(())
    }

    async fn fetch_profile(
        &self,
        identity: &UserIdentity,
        access_token: &str,
    ) -> Result<Option<Profile>, AuthError> {
        self.profile_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate_latency().await;

        if self.fail_profile_lookup {
            return Err(AuthError::Unavailable("mock profile lookup failure".to_string()));
        }
        let claims = self.verifier.verify(access_token)?;
        if claims.sub != identity.id {
            return Err(AuthError::InvalidToken);
        }

        Ok(self
            .read_accounts()
            .iter()
            .find(|account| account.identity.id == identity.id)
            .and_then(|account| account.profile.clone()))
    }
}
