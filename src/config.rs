use std::{env, time::Duration};

use crate::{error::ConfigError, routes::policy::AccessPolicy};

/// Default close delay for hover dropdowns, in milliseconds.
pub const DEFAULT_MENU_CLOSE_DELAY_MS: u64 = 300;

/// Default idle lifetime of a browser session, matching the provider's access-token TTL.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";

/// AppConfig
///
/// Holds the portal's entire configuration state. Immutable once loaded and pulled
/// into handlers through `FromRef`, alongside the session registry and view registry.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls log format, cookie flags and the auth backend default.
    pub env: Env,
    // Base URL of the Supabase project (auth + REST gateway).
    pub supabase_url: String,
    // Public anon key sent as the `apikey` header on every Supabase call.
    pub supabase_key: String,
    // Secret used to verify stored access tokens when a session is restored.
    pub jwt_secret: String,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
    // How long a hover dropdown stays open after the pointer leaves it.
    pub menu_close_delay: Duration,
    // Whether protected paths are additionally restricted by role.
    pub access_policy: AccessPolicy,
    // Which identity provider backs the session store.
    pub auth_backend: AuthBackendKind,
    // How long a browser session may go unused before the registry evicts it.
    pub session_idle_timeout: Duration,
}

/// Env
///
/// Defines the runtime context, used to switch between local conveniences (mock auth,
/// pretty logs, non-secure cookies) and production infrastructure.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Env {
    Local,
    Production,
}

/// AuthBackendKind
///
/// Selects the concrete `AuthBackend` wired into the session registry at startup.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AuthBackendKind {
    Supabase,
    Mock,
}

impl Default for AppConfig {
    /// Safe, non-panicking configuration used for test state scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            supabase_url: "http://localhost:54321".to_string(),
            supabase_key: "local-anon-key".to_string(),
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            menu_close_delay: Duration::from_millis(DEFAULT_MENU_CLOSE_DELAY_MS),
            access_policy: AccessPolicy::Permissive,
            auth_backend: AuthBackendKind::Mock,
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables. Production is fail-fast:
    /// a missing Supabase URL, key or JWT secret is reported as `ConfigError::Missing`
    /// so the process never starts with an incomplete auth setup.
    pub fn load() -> Result<Self, ConfigError> {
        let env = match env::var("APP_ENV").as_deref() {
            Ok("production") => Env::Production,
            _ => Env::Local,
        };

        let menu_close_delay = match env::var("MENU_CLOSE_DELAY_MS") {
            Ok(raw) => Duration::from_millis(raw.parse().map_err(|_| ConfigError::Invalid {
                key: "MENU_CLOSE_DELAY_MS",
                value: raw.clone(),
            })?),
            Err(_) => Duration::from_millis(DEFAULT_MENU_CLOSE_DELAY_MS),
        };

        let session_idle_timeout = match env::var("SESSION_IDLE_TIMEOUT_SECS") {
            Ok(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "SESSION_IDLE_TIMEOUT_SECS",
                        value: raw,
                    });
                }
            },
            Err(_) => Duration::from_secs(DEFAULT_SESSION_IDLE_SECS),
        };

        let access_policy = match env::var("ACCESS_POLICY") {
            Ok(raw) => raw.parse().map_err(|_| ConfigError::Invalid {
                key: "ACCESS_POLICY",
                value: raw.clone(),
            })?,
            Err(_) => AccessPolicy::Permissive,
        };

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());

        match env {
            Env::Local => {
                let supabase_url = env::var("SUPABASE_URL").ok();
                // Without a Supabase project the local portal runs against seeded mock accounts.
                let auth_backend = match env::var("AUTH_BACKEND").as_deref() {
                    Ok("supabase") => AuthBackendKind::Supabase,
                    Ok("mock") => AuthBackendKind::Mock,
                    Ok(other) => {
                        return Err(ConfigError::Invalid {
                            key: "AUTH_BACKEND",
                            value: other.to_string(),
                        });
                    }
                    Err(_) if supabase_url.is_some() => AuthBackendKind::Supabase,
                    Err(_) => AuthBackendKind::Mock,
                };

                Ok(Self {
                    env,
                    supabase_url: supabase_url
                        .unwrap_or_else(|| "http://localhost:54321".to_string()),
                    supabase_key: env::var("SUPABASE_KEY")
                        .unwrap_or_else(|_| "local-anon-key".to_string()),
                    jwt_secret: env::var("SUPABASE_JWT_SECRET")
                        .unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
                    bind_addr,
                    menu_close_delay,
                    access_policy,
                    auth_backend,
                    session_idle_timeout,
                })
            }
            Env::Production => Ok(Self {
                env,
                supabase_url: required("SUPABASE_URL")?,
                supabase_key: required("SUPABASE_KEY")?,
                jwt_secret: required("SUPABASE_JWT_SECRET")?,
                bind_addr,
                menu_close_delay,
                access_policy,
                auth_backend: AuthBackendKind::Supabase,
                session_idle_timeout,
            }),
        }
    }

    /// Cookies are only marked `Secure` outside local development.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    env::var(key).map_err(|_| ConfigError::Missing(key))
}
