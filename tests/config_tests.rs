use jobboard_portal::{
    AppConfig,
    config::{AuthBackendKind, DEFAULT_MENU_CLOSE_DELAY_MS, DEFAULT_SESSION_IDLE_SECS, Env},
    error::ConfigError,
    routes::policy::AccessPolicy,
};
use serial_test::serial;
use std::{env, panic, time::Duration};

const CONFIG_VARS: [&str; 9] = [
    "APP_ENV",
    "SUPABASE_URL",
    "SUPABASE_KEY",
    "SUPABASE_JWT_SECRET",
    "BIND_ADDR",
    "MENU_CLOSE_DELAY_MS",
    "ACCESS_POLICY",
    "AUTH_BACKEND",
    "SESSION_IDLE_TIMEOUT_SECS",
];

// --- Setup/Teardown Utilities ---

/// Runs `test` with exactly the given variables set (all other config variables unset),
/// then restores the original environment, even if the test panicked.
fn run_with_env<T, R>(vars: &[(&'static str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&'static str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals.into_iter().rev() {
        unsafe {
            if let Some(val) = original_value {
                env::set_var(key, val);
            } else {
                env::remove_var(key);
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_local_defaults_use_mock_backend() {
    let config = run_with_env(&[], AppConfig::load).expect("local config must load");

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.auth_backend, AuthBackendKind::Mock);
    assert_eq!(config.access_policy, AccessPolicy::Permissive);
    assert_eq!(
        config.menu_close_delay,
        Duration::from_millis(DEFAULT_MENU_CLOSE_DELAY_MS)
    );
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert_eq!(
        config.session_idle_timeout,
        Duration::from_secs(DEFAULT_SESSION_IDLE_SECS)
    );
    assert!(!config.secure_cookies());
}

#[test]
#[serial]
fn test_local_with_supabase_url_selects_supabase() {
    let config = run_with_env(&[("SUPABASE_URL", "http://127.0.0.1:54321")], AppConfig::load)
        .expect("local config must load");

    assert_eq!(config.auth_backend, AuthBackendKind::Supabase);
    assert_eq!(config.supabase_url, "http://127.0.0.1:54321");
}

#[test]
#[serial]
fn test_explicit_mock_backend_wins_over_supabase_url() {
    let config = run_with_env(
        &[("SUPABASE_URL", "http://127.0.0.1:54321"), ("AUTH_BACKEND", "mock")],
        AppConfig::load,
    )
    .expect("local config must load");

    assert_eq!(config.auth_backend, AuthBackendKind::Mock);
}

#[test]
#[serial]
fn test_production_fail_fast_on_missing_secret() {
    let result = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_KEY", "anon-key"),
        ],
        AppConfig::load,
    );

    assert_eq!(
        result.unwrap_err(),
        ConfigError::Missing("SUPABASE_JWT_SECRET")
    );
}

#[test]
#[serial]
fn test_production_loads_with_all_secrets() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("SUPABASE_URL", "https://project.supabase.co"),
            ("SUPABASE_KEY", "anon-key"),
            ("SUPABASE_JWT_SECRET", "prod-secret"),
            ("ACCESS_POLICY", "role-scoped"),
        ],
        AppConfig::load,
    )
    .expect("production config must load");

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.auth_backend, AuthBackendKind::Supabase);
    assert_eq!(config.access_policy, AccessPolicy::RoleScoped);
    assert_eq!(config.jwt_secret, "prod-secret");
    assert!(config.secure_cookies());
}

#[test]
#[serial]
fn test_menu_close_delay_override() {
    let config = run_with_env(&[("MENU_CLOSE_DELAY_MS", "150")], AppConfig::load)
        .expect("local config must load");

    assert_eq!(config.menu_close_delay, Duration::from_millis(150));
}

#[test]
#[serial]
fn test_session_idle_timeout_override() {
    let config = run_with_env(&[("SESSION_IDLE_TIMEOUT_SECS", "900")], AppConfig::load)
        .expect("local config must load");
    assert_eq!(config.session_idle_timeout, Duration::from_secs(900));

    // A zero timeout would evict every session on each sweep.
    let zero = run_with_env(&[("SESSION_IDLE_TIMEOUT_SECS", "0")], AppConfig::load);
    assert_eq!(
        zero.unwrap_err(),
        ConfigError::Invalid {
            key: "SESSION_IDLE_TIMEOUT_SECS",
            value: "0".to_string()
        }
    );
}

#[test]
#[serial]
fn test_invalid_values_are_reported_by_key() {
    let delay = run_with_env(&[("MENU_CLOSE_DELAY_MS", "soon")], AppConfig::load);
    assert_eq!(
        delay.unwrap_err(),
        ConfigError::Invalid {
            key: "MENU_CLOSE_DELAY_MS",
            value: "soon".to_string()
        }
    );

    let policy = run_with_env(&[("ACCESS_POLICY", "strict")], AppConfig::load);
    assert!(matches!(
        policy.unwrap_err(),
        ConfigError::Invalid { key: "ACCESS_POLICY", .. }
    ));

    let backend = run_with_env(&[("AUTH_BACKEND", "ldap")], AppConfig::load);
    assert!(matches!(
        backend.unwrap_err(),
        ConfigError::Invalid { key: "AUTH_BACKEND", .. }
    ));
}
