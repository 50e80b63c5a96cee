use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::{AuthBackend, AuthGrant};
use crate::{
    error::AuthError,
    models::{Profile, SignUpRequest, UserIdentity},
};

/// Minimal user object returned by the Supabase auth endpoints.
#[derive(Deserialize)]
struct SupabaseUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// Body of `/auth/v1/token` and, when auto-confirm is on, `/auth/v1/signup`.
#[derive(Deserialize)]
struct SessionBody {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<SupabaseUser>,
}

/// The error shapes Supabase uses across GoTrue and PostgREST.
#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorBody {
    fn is_invalid_grant(&self) -> bool {
        self.error.as_deref() == Some("invalid_grant")
    }

    fn describe(self) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or_else(|| "request rejected by identity provider".to_string())
    }
}

/// SupabaseAuthClient
///
/// `AuthBackend` backed by a Supabase project: GoTrue for credentials, PostgREST for the
/// `profiles` table. Every request carries the project's anon key as `apikey`; profile calls
/// additionally carry the user's bearer token so row-level security applies.
#[derive(Clone)]
pub struct SupabaseAuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl SupabaseAuthClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn grant_from(response: Response, fallback_email: &str) -> Result<Option<AuthGrant>, AuthError> {
        let body = response.json::<SessionBody>().await?;
        match (body.access_token, body.user) {
            (Some(access_token), Some(user)) => Ok(Some(AuthGrant {
                identity: UserIdentity {
                    id: user.id,
                    email: user.email.unwrap_or_else(|| fallback_email.to_string()),
                },
                access_token,
            })),
            _ => Ok(None),
        }
    }

    async fn error_body(response: Response) -> ErrorBody {
        response.json::<ErrorBody>().await.unwrap_or_default()
    }

    /// Mirrors the new account into `public.profiles` so its role is resolvable at once.
    async fn upsert_profile(&self, grant: &AuthGrant, request: &SignUpRequest) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.url("/rest/v1/profiles"))
            .header("apikey", &self.api_key)
            .bearer_auth(&grant.access_token)
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&json!({
                "id": grant.identity.id,
                "full_name": request.full_name,
                "email": grant.identity.email,
                "role": request.role.as_str(),
            }))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            Err(AuthError::Rejected(format!(
                "profile creation failed ({status}): {}",
                Self::error_body(response).await.describe()
            )))
        }
    }
}

#[async_trait]
impl AuthBackend for SupabaseAuthClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthGrant, AuthError> {
        let response = self
            .http
            .post(self.url("/auth/v1/token?grant_type=password"))
            .header("apikey", &self.api_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = Self::error_body(response).await;
            if body.is_invalid_grant() || status == StatusCode::UNAUTHORIZED {
                return Err(AuthError::InvalidCredentials);
            }
            return Err(AuthError::Rejected(body.describe()));
        }

        Self::grant_from(response, email)
            .await?
            .ok_or_else(|| AuthError::Unavailable("token response without a session".to_string()))
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<Option<AuthGrant>, AuthError> {
        let response = self
            .http
            .post(self.url("/auth/v1/signup"))
            .header("apikey", &self.api_key)
            .json(&json!({
                "email": request.email,
                "password": request.password,
                "data": { "full_name": request.full_name, "role": request.role.as_str() },
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            // Email already registered, weak password, signups disabled...
            return Err(AuthError::Rejected(Self::error_body(response).await.describe()));
        }

        let grant = Self::grant_from(response, &request.email).await?;
        if let Some(grant) = &grant {
            // The account exists at this point; a missing profile only degrades the role.
            if let Err(e) = self.upsert_profile(grant, request).await {
                tracing::warn!(user_id = %grant.identity.id, error = %e, "profile mirror failed");
            }
        }
        Ok(grant)
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .http
            .post(self.url("/auth/v1/logout"))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => Ok(()),
            // The grant is already gone; nothing left to revoke.
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(()),
            status => Err(AuthError::Unavailable(format!("logout returned {status}"))),
        }
    }

    async fn fetch_profile(
        &self,
        identity: &UserIdentity,
        access_token: &str,
    ) -> Result<Option<Profile>, AuthError> {
        let response = self
            .http
            .get(self.url(&format!(
                "/rest/v1/profiles?id=eq.{}&select=id,full_name,email,role",
                identity.id
            )))
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {
                let rows = response.json::<Vec<Profile>>().await?;
                Ok(rows.into_iter().next())
            }
            StatusCode::UNAUTHORIZED => Err(AuthError::InvalidToken),
            status => Err(AuthError::Unavailable(format!("profile lookup returned {status}"))),
        }
    }
}
