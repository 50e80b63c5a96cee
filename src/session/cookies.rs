use axum_extra::extract::cookie::{Cookie, SameSite};
use uuid::Uuid;

/// Identifies the browser session in the registry.
pub const CLIENT_COOKIE: &str = "jb_client";

/// Holds the identity provider's access token so the session survives a registry restart.
pub const ACCESS_COOKIE: &str = "jb_access_token";

pub fn client_cookie(client_id: Uuid, secure: bool) -> Cookie<'static> {
    Cookie::build((CLIENT_COOKIE, client_id.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn access_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((ACCESS_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// Removal cookie for the access token; path must match the one it was set with.
pub fn expired_access_cookie() -> Cookie<'static> {
    Cookie::build(ACCESS_COOKIE).path("/").build()
}
