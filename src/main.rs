use jobboard_portal::{
    AppState, MockAuthBackend, SessionRegistry, SupabaseAuthClient, TokenVerifier, ViewRegistry,
    auth::AuthState,
    config::{AppConfig, AuthBackendKind, Env},
    create_router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point: configuration, logging, the identity provider, the
/// session and view registries, then the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & Environment Loading (Fail-Fast)
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: invalid configuration");

    // 2. Logging Filter Setup
    // RUST_LOG wins; otherwise debug for the portal and request-level logs for tower-http.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "jobboard_portal=debug,tower_http=info".into());

    // 3. Initialize Logging based on Environment
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            // JSON lines for the log aggregator.
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!(
        access_policy = ?config.access_policy,
        session_idle_timeout = ?config.session_idle_timeout,
        "Application starting in {:?} mode",
        config.env
    );

    // 4. Identity Provider
    let verifier = TokenVerifier::new(config.jwt_secret.clone());
    let auth = match config.auth_backend {
        AuthBackendKind::Supabase => {
            tracing::info!(url = %config.supabase_url, "using Supabase identity provider");
            Arc::new(SupabaseAuthClient::new(&config.supabase_url, &config.supabase_key)) as AuthState
        }
        AuthBackendKind::Mock => {
            tracing::warn!("using seeded mock identity provider; demo accounts use password \"password\"");
            Arc::new(MockAuthBackend::seeded_demo(verifier.clone())) as AuthState
        }
    };

    // 5. Unified State Assembly
    let sessions = Arc::new(SessionRegistry::new(auth, verifier));
    sessions.spawn_eviction(config.session_idle_timeout);
    let app_state = AppState {
        sessions: sessions.clone(),
        views: Arc::new(ViewRegistry::builtin()),
        config: config.clone(),
    };

    // 6. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .expect("FATAL: failed to bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", config.bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at: /swagger-ui");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("FATAL: HTTP server error");

    // Pending session restorations are cancelled rather than left to publish into dropped stores.
    sessions.shutdown();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to install the shutdown signal handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
