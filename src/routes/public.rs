use crate::{AppState, handlers, routes::table};
use axum::{
    Router,
    routing::{get, post},
};

/// Endpoints that never touch a browser session. Mounted outside the session layer so
/// monitoring traffic does not create session stores.
pub fn stateless_routes() -> Router<AppState> {
    // GET /health
    // Liveness check for load balancers.
    Router::new().route("/health", get(|| async { "ok" }))
}

/// Public Router Module
///
/// Endpoints reachable by any client, signed in or not: the auth form endpoints, the
/// session and navigation models, and the public page shells of the route table
/// (`/login`, `/register`).
///
/// These run inside the session layer, so every handler here can see the caller's
/// `ClientSession`; they just never require it to be authenticated.
pub fn public_routes() -> Router<AppState> {
    let router = Router::new()
        // POST /auth/sign-in
        // Credentials → session. Gated by the form's loading flag.
        .route("/auth/sign-in", post(handlers::sign_in))
        // POST /auth/sign-up
        // Registration with a self-assignable role.
        .route("/auth/sign-up", post(handlers::sign_up))
        // POST /auth/sign-out
        // Resets the session to anonymous and clears the stored token.
        .route("/auth/sign-out", post(handlers::sign_out))
        // GET /auth/session
        // Reactive session state for the front end (resolving, identity, role landing).
        .route("/auth/session", get(handlers::get_session))
        // GET /nav
        // Role-selected navigation bar model.
        .route("/nav", get(handlers::get_nav));

    table::public_entries().fold(router, |router, entry| {
        router.route(&entry.axum_path(), get(handlers::render_page))
    })
}
