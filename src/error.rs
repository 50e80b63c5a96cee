//! Error types shared by the session store, the auth backends and the page router.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::routes::table::ViewId;

/// AuthError
///
/// Failures of sign-in, sign-up, sign-out and session restoration. These are caught at the
/// form boundary and returned as an inline message; they never take the shell down.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,
    /// The identity provider refused the request and said why (weak password, email taken...).
    #[error("{0}")]
    Rejected(String),
    #[error("role `{0}` cannot be chosen at sign-up")]
    RoleNotAllowed(String),
    #[error("an authentication request is already in progress")]
    InFlight,
    /// A sign-out started while the sign-in was in flight; the grant was discarded.
    #[error("the session was signed out while this request was in progress")]
    Superseded,
    #[error("session token is invalid or expired")]
    InvalidToken,
    #[error("authentication service unavailable: {0}")]
    Unavailable(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::InvalidCredentials | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::Rejected(_) | AuthError::RoleNotAllowed(_) => StatusCode::BAD_REQUEST,
            AuthError::InFlight | AuthError::Superseded => StatusCode::CONFLICT,
            AuthError::Unavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        AuthError::Unavailable(err.to_string())
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Upstream transport details stay in the logs.
            AuthError::Unavailable(detail) => {
                tracing::error!(error = %detail, "auth backend unavailable");
                "authentication service unavailable".to_string()
            }
            other => other.to_string(),
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}

/// ConfigError
///
/// Raised by `AppConfig::load` when the environment is incomplete or malformed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{key} has an invalid value: `{value}`")]
    Invalid { key: &'static str, value: String },
}

/// ViewLoadError
///
/// A deferred view could not be produced. Surfaces at the top-level response boundary.
#[derive(Debug, Error)]
pub enum ViewLoadError {
    #[error("view {0:?} failed to load: {1}")]
    Failed(ViewId, String),
    #[error("no route matches `{0}`")]
    Unrouted(String),
}

impl IntoResponse for ViewLoadError {
    fn into_response(self) -> Response {
        match self {
            ViewLoadError::Unrouted(path) => {
                tracing::warn!(%path, "page handler reached without a route entry");
                (StatusCode::NOT_FOUND, "Not Found").into_response()
            }
            ViewLoadError::Failed(view, reason) => {
                tracing::error!(?view, %reason, "deferred view load failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to load page").into_response()
            }
        }
    }
}
