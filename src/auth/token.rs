use chrono::{Duration, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::AuthError, models::UserIdentity};

/// Claims
///
/// The subset of the Supabase access-token payload the portal relies on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the `auth.users.id` of the signed-in user, also the profile key.
    pub sub: Uuid,
    /// Email recorded by the identity provider at sign-in time.
    #[serde(default)]
    pub email: Option<String>,
    /// Expiration time (seconds since the epoch). Expired tokens never restore a session.
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

impl Claims {
    pub fn identity(&self) -> UserIdentity {
        UserIdentity {
            id: self.sub,
            email: self.email.clone().unwrap_or_default(),
        }
    }
}

/// TokenVerifier
///
/// Validates the access token kept in the browser's cookie before a session is restored
/// from it, so a forged or stale cookie resolves to an anonymous session without a
/// round-trip to the identity provider.
#[derive(Clone)]
pub struct TokenVerifier {
    secret: String,
}

impl TokenVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// verify
    ///
    /// Decodes and validates an HS256 token. Expiry is always checked; the audience is not,
    /// since Supabase and locally minted tokens disagree on it.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_aud = false;

        decode::<Claims>(token, &decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("access token expired"),
                    other => tracing::debug!(error = ?other, "access token rejected"),
                }
                AuthError::InvalidToken
            })
    }

    /// mint
    ///
    /// Issues a token for `identity`, valid for `ttl`. Used by the in-memory backend so that
    /// restored sessions go through the same verification path as Supabase tokens.
    pub fn mint(&self, identity: &UserIdentity, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: identity.id,
            email: Some(identity.email.clone()),
            exp: (now + ttl).timestamp().max(0) as usize,
            iat: now.timestamp().max(0) as usize,
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::Unavailable(format!("token signing failed: {e}")))
    }
}
