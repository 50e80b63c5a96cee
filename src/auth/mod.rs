//! Identity provider seam.
//!
//! The session store never talks HTTP itself: it drives an `AuthBackend`, which is the
//! Supabase client in production and the in-memory mock in tests and local runs.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::AuthError,
    models::{Profile, SignUpRequest, UserIdentity},
};

pub mod mock;
pub mod supabase;
pub mod token;

pub use mock::MockAuthBackend;
pub use supabase::SupabaseAuthClient;
pub use token::{Claims, TokenVerifier};

/// AuthGrant
///
/// A successful sign-in: the identity plus the bearer token that authorizes later calls
/// (profile lookup, sign-out) and is stored in the browser for session restoration.
#[derive(Debug, Clone)]
pub struct AuthGrant {
    pub identity: UserIdentity,
    pub access_token: String,
}

/// AuthBackend
///
/// Abstract contract for the identity provider. `Send + Sync + async_trait` so the trait
/// object can be shared by every session store across request tasks.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchanges email and password for a grant.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError>;

    /// Registers a new account. Returns `None` when the provider requires email
    /// confirmation before the first sign-in.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<AuthGrant>, AuthError>;

    /// Revokes the grant behind `access_token`.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// Loads the profile row for `identity`. `Ok(None)` means the account has no profile yet.
    async fn fetch_profile(
        &self,
        identity: &UserIdentity,
        access_token: &str,
    ) -> Result<Option<Profile>, AuthError>;
}

/// AuthState
///
/// The shared handle to the configured identity provider.
pub type AuthState = Arc<dyn AuthBackend>;
