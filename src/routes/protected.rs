use crate::{
    AppState, handlers,
    routes::table::{self, ROOT_PATH},
};
use axum::{Router, routing::get};

/// Protected Router Module
///
/// Registers every route-table entry that requires authentication. The caller wraps the
/// returned router in the `require_session` route layer, which is the only way these
/// handlers run: they receive a `ResolvedSession` in the request extensions and never see
/// a resolving or anonymous session.
///
/// No role check happens here. Which role may open which section is the access policy's
/// business, applied inside the guard.
pub fn protected_routes() -> Router<AppState> {
    table::protected_entries().fold(Router::new(), |router, entry| {
        if entry.path == ROOT_PATH {
            // GET /
            // Role redirect to the landing dashboard, or the home view in place.
            router.route(ROOT_PATH, get(handlers::role_home))
        } else {
            router.route(&entry.axum_path(), get(handlers::render_page))
        }
    })
}
