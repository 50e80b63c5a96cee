use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::HeaderName,
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Identity provider seam and session state.
pub mod auth;
pub mod session;

// Route gating, role landing and navigation.
pub mod guard;
pub mod landing;
pub mod nav;

// HTTP surface.
pub mod handlers;
pub mod routes;

pub mod config;
pub mod error;
pub mod models;

use routes::{protected, public};
use session::{
    ClientSession,
    cookies::{ACCESS_COOKIE, CLIENT_COOKIE, client_cookie},
};

// --- Public Re-exports ---

pub use auth::{AuthState, MockAuthBackend, SupabaseAuthClient, TokenVerifier};
pub use config::AppConfig;
pub use routes::views::{ViewRegistry, ViewState};
pub use session::{RegistryState, SessionRegistry};

/// ApiDoc
///
/// OpenAPI description of the JSON endpoints (the page routes serve HTML and are left out).
/// Served at `/api-docs/openapi.json` and browsable under `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::sign_in, handlers::sign_up, handlers::sign_out, handlers::get_session
    ),
    components(
        schemas(
            models::SignInRequest, models::SignUpRequest, models::SignUpResponse,
            models::SessionView, models::Profile, models::UserIdentity, models::Role,
        )
    ),
    tags(
        (name = "jobboard-portal", description = "Job board portal session API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single container of process-wide services, cloned into every request. The session
/// registry is the only mutable part, and it is mutated only through its own operations.
#[derive(Clone)]
pub struct AppState {
    /// Browser sessions, each with its own session store.
    pub sessions: RegistryState,
    /// Deferred page views, loaded on first navigation.
    pub views: ViewState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RegistryState {
    fn from_ref(app_state: &AppState) -> RegistryState {
        app_state.sessions.clone()
    }
}

impl FromRef<AppState> for ViewState {
    fn from_ref(app_state: &AppState) -> ViewState {
        app_state.views.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// attach_session
///
/// Binds every request to its browser session before routing. Reads the client id and the
/// stored access token from cookies, lets the registry find or create the store, and puts
/// it in the request extensions as `ClientSession`. A freshly issued client id is returned
/// to the browser as a cookie.
async fn attach_session(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let jar = CookieJar::from_headers(request.headers());
    let client_id = jar
        .get(CLIENT_COOKIE)
        .and_then(|cookie| Uuid::parse_str(cookie.value()).ok());
    let access_token = jar.get(ACCESS_COOKIE).map(|cookie| cookie.value().to_string());

    let attached = state.sessions.attach(client_id, access_token);
    request
        .extensions_mut()
        .insert(ClientSession(attached.store));

    let response = next.run(request).await;
    if attached.issued {
        let cookie = client_cookie(attached.client_id, state.config.secure_cookies());
        (jar.add(cookie), response).into_response()
    } else {
        response
    }
}

/// create_router
///
/// Assembles the routing structure: public routes as-is, protected routes behind the route
/// guard, the session layer around both, then the observability stack. The health check
/// and the API docs sit outside the session layer.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Session-bound Routes
    let session_router = Router::new()
        .merge(public::public_routes())
        // Every requires_auth entry passes the guard before its handler runs.
        .merge(
            protected::protected_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                guard::require_session,
            )),
        )
        // Wraps the guard, so the guard always finds a session.
        .layer(middleware::from_fn_with_state(state.clone(), attach_session));

    // 3. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::stateless_routes())
        .merge(session_router)
        .with_state(state);

    // 4. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Span for one request, carrying the `x-request-id` so every log line of the request
/// correlates.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
