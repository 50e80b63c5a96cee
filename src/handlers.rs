use axum::{
    Extension, Json,
    extract::{Request, State},
    response::{Html, IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;

use crate::{
    AppState,
    config::AppConfig,
    error::{AuthError, ViewLoadError},
    guard::ResolvedSession,
    landing::landing_for,
    models::{SessionView, SignInRequest, SignUpRequest, SignUpResponse},
    nav::{NavBar, NavBarView},
    routes::{
        table::{self, ROOT_PATH, RouteMatch, ViewId},
        views::ViewContext,
    },
    session::{
        ClientSession,
        cookies::{access_cookie, expired_access_cookie},
    },
};

// --- Auth form endpoints ---

/// sign_in
///
/// [Public Route] Signs the browser session in. A second submission while the first is
/// still pending is refused with 409 and never reaches the identity provider.
#[utoipa::path(
    post,
    path = "/auth/sign-in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = SessionView),
        (status = 401, description = "Invalid credentials"),
        (status = 409, description = "Sign-in already in progress, or signed out meanwhile")
    )
)]
pub async fn sign_in(
    State(config): State<AppConfig>,
    Extension(ClientSession(store)): Extension<ClientSession>,
    jar: CookieJar,
    Json(payload): Json<SignInRequest>,
) -> Result<(CookieJar, Json<SessionView>), AuthError> {
    store.sign_in(&payload.email, &payload.password).await?;

    let jar = match store.access_token() {
        Some(token) => jar.add(access_cookie(token, config.secure_cookies())),
        None => jar,
    };
    Ok((jar, Json(store.view())))
}

/// sign_up
///
/// [Public Route] Registers an account with a self-assignable role (candidate, employer
/// or school). Signs the session in when the provider does not require confirmation.
#[utoipa::path(
    post,
    path = "/auth/sign-up",
    request_body = SignUpRequest,
    responses(
        (status = 200, description = "Registered", body = SignUpResponse),
        (status = 400, description = "Rejected by the identity provider or role not allowed"),
        (status = 409, description = "Submission already in progress, or signed out meanwhile")
    )
)]
pub async fn sign_up(
    State(config): State<AppConfig>,
    Extension(ClientSession(store)): Extension<ClientSession>,
    jar: CookieJar,
    Json(payload): Json<SignUpRequest>,
) -> Result<(CookieJar, Json<SignUpResponse>), AuthError> {
    let signed_in = store.sign_up(&payload).await?;

    let jar = match (signed_in.is_some(), store.access_token()) {
        (true, Some(token)) => jar.add(access_cookie(token, config.secure_cookies())),
        _ => jar,
    };
    Ok((
        jar,
        Json(SignUpResponse {
            confirmation_required: signed_in.is_none(),
            session: store.view(),
        }),
    ))
}

/// sign_out
///
/// [Public Route] Resets the browser session to anonymous and clears the stored token,
/// even when revoking the grant upstream fails.
#[utoipa::path(
    post,
    path = "/auth/sign-out",
    responses(
        (status = 200, description = "Signed out", body = SessionView),
        (status = 502, description = "Local session cleared, upstream revocation failed")
    )
)]
pub async fn sign_out(
    Extension(ClientSession(store)): Extension<ClientSession>,
    jar: CookieJar,
) -> (CookieJar, Result<Json<SessionView>, AuthError>) {
    let result = store.sign_out().await.map(|_| Json(store.view()));
    (jar.remove(expired_access_cookie()), result)
}

/// get_session
///
/// [Public Route] The current session, including whether it is still resolving and
/// whether a submission is in flight.
#[utoipa::path(
    get,
    path = "/auth/session",
    responses((status = 200, description = "Session", body = SessionView))
)]
pub async fn get_session(
    Extension(ClientSession(store)): Extension<ClientSession>,
) -> Json<SessionView> {
    Json(store.view())
}

/// get_nav
///
/// [Public Route] Navigation bar model for the current session.
pub async fn get_nav(
    State(config): State<AppConfig>,
    Extension(ClientSession(store)): Extension<ClientSession>,
) -> Json<NavBarView> {
    Json(NavBar::new(&store.snapshot(), config.menu_close_delay).view())
}

// --- Page handlers ---

/// render_page
///
/// Renders the view the route table maps the request path to. Behind the guard the
/// resolved session is in the request extensions; on public pages it is absent.
pub async fn render_page(
    State(state): State<AppState>,
    request: Request,
) -> Result<Html<String>, ViewLoadError> {
    let path = request.uri().path().to_string();
    let session = request.extensions().get::<ResolvedSession>().cloned();
    drop(request);

    let route = table::match_path(&path).ok_or(ViewLoadError::Unrouted(path))?;
    render_view(&state, &route, route.entry.view, session.as_ref()).await
}

/// role_home
///
/// [Protected Route] `/`: dashboards roles are redirected to their landing page; everyone
/// else gets the home view in place.
pub async fn role_home(
    State(state): State<AppState>,
    Extension(resolved): Extension<ResolvedSession>,
) -> Result<Response, ViewLoadError> {
    let landing = landing_for(resolved.profile.as_ref());
    if landing.redirects() {
        tracing::debug!(target_path = landing.path(), "role redirect");
        return Ok(Redirect::to(landing.path()).into_response());
    }

    let route = table::match_path(ROOT_PATH)
        .ok_or_else(|| ViewLoadError::Unrouted(ROOT_PATH.to_string()))?;
    let page = render_view(&state, &route, landing.view(), Some(&resolved)).await?;
    Ok(page.into_response())
}

async fn render_view(
    state: &AppState,
    route: &RouteMatch,
    view: ViewId,
    session: Option<&ResolvedSession>,
) -> Result<Html<String>, ViewLoadError> {
    let view = state.views.resolve(view).await?;
    let nav = NavBar::for_resolved(session, state.config.menu_close_delay).view();
    Ok(Html(view.render(&ViewContext {
        route,
        session,
        nav: &nav,
    })))
}
