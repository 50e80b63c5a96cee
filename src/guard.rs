//! Route guard: gates protected views on the resolved session.

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::{
    AppState,
    landing::landing_for,
    models::{Profile, Role, UserIdentity},
    routes::table::LOGIN_PATH,
    session::{ClientSession, Session},
};

/// ResolvedSession
///
/// The authenticated session handed to a protected view. Only ever built from a session
/// that has finished resolving and has an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub identity: UserIdentity,
    pub profile: Option<Profile>,
}

impl ResolvedSession {
    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().and_then(|profile| profile.role)
    }

    pub fn display_name(&self) -> &str {
        match &self.profile {
            Some(profile) => profile.display_name(),
            None => &self.identity.email,
        }
    }
}

/// RenderDecision
///
/// What the guard lets happen for one navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderDecision {
    /// Session still resolving: show the placeholder, never mount the view.
    Loading,
    /// No identity: go to the login entry point. No return-to target is kept.
    Redirect(&'static str),
    /// Mount the protected view with the resolved session.
    Render(ResolvedSession),
}

/// guard
///
/// Pure decision over the session; the profile never influences the outcome.
pub fn guard(session: &Session) -> RenderDecision {
    if session.resolving {
        return RenderDecision::Loading;
    }
    match &session.identity {
        None => RenderDecision::Redirect(LOGIN_PATH),
        Some(identity) => RenderDecision::Render(ResolvedSession {
            identity: identity.clone(),
            profile: session.profile.clone(),
        }),
    }
}

/// The page served in place of a protected view while the session resolves. The browser
/// re-requests it shortly.
pub fn loading_placeholder() -> Response {
    let mut response = Html(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>Loading · Job Board</title></head>\
         <body><main data-view=\"Loading\" aria-busy=\"true\"><p>Loading…</p></main></body></html>",
    )
    .into_response();
    response
        .headers_mut()
        .insert(HeaderName::from_static("refresh"), HeaderValue::from_static("1"));
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// require_session
///
/// Route layer wrapped around every `requires_auth` entry. Applies `guard`, then the
/// configured access policy; a path the policy denies sends the user to their landing page.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(ClientSession(store)) = request.extensions().get::<ClientSession>().cloned() else {
        tracing::warn!("protected route reached without an attached session");
        return Redirect::to(LOGIN_PATH).into_response();
    };

    match guard(&store.snapshot()) {
        RenderDecision::Loading => loading_placeholder(),
        RenderDecision::Redirect(to) => {
            tracing::debug!(path = %request.uri().path(), "anonymous access redirected to login");
            Redirect::to(to).into_response()
        }
        RenderDecision::Render(resolved) => {
            let path = request.uri().path();
            if !state.config.access_policy.allows(resolved.role(), path) {
                let landing = landing_for(resolved.profile.as_ref());
                tracing::info!(%path, role = ?resolved.role(), "path outside role scope");
                return Redirect::to(landing.path()).into_response();
            }
            request.extensions_mut().insert(resolved);
            next.run(request).await
        }
    }
}
