use async_trait::async_trait;
use jobboard_portal::{
    error::ViewLoadError,
    routes::{
        table::{self, LOGIN_PATH, ROUTE_TABLE, ViewId},
        views::{BuiltinViews, View, ViewLoader, ViewRegistry, escape_html},
    },
};
use rstest::rstest;
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

// --- Route Table ---

#[test]
fn test_paths_are_unique() {
    let mut seen = HashSet::new();
    for entry in ROUTE_TABLE {
        assert!(seen.insert(entry.path), "duplicate route {}", entry.path);
    }
}

#[test]
fn test_only_login_and_register_are_public() {
    let public: Vec<_> = table::public_entries().map(|entry| entry.path).collect();
    assert_eq!(public, vec![LOGIN_PATH, "/register"]);
    assert_eq!(
        table::protected_entries().count(),
        ROUTE_TABLE.len() - public.len()
    );
}

#[rstest]
#[case("/", ViewId::Home)]
#[case("/jobs", ViewId::JobList)]
#[case("/jobs/17", ViewId::JobDetail)]
#[case("/employer/jobs/create", ViewId::EmployerJobCreate)]
#[case("/employer/jobs/9/edit", ViewId::EmployerJobEdit)]
#[case("/employer/cv/abc-123", ViewId::EmployerCvView)]
#[case("/employer/interviews/5", ViewId::EmployerInterviewDetail)]
#[case("/admin/users/", ViewId::AdminUsers)]
fn test_match_path_resolves_view(#[case] path: &str, #[case] view: ViewId) {
    let matched = table::match_path(path).expect("path should be routed");
    assert_eq!(matched.entry.view, view);
}

#[test]
fn test_literal_segment_wins_over_parameter() {
    // `/employer/jobs/create` must not be read as a job id.
    let matched = table::match_path("/employer/jobs/create").unwrap();
    assert!(matched.params.is_empty());
}

#[test]
fn test_params_are_captured_by_name() {
    let matched = table::match_path("/employer/cv/cv-42").unwrap();
    assert_eq!(matched.param("cvId"), Some("cv-42"));

    let matched = table::match_path("/employer/jobs/7/edit").unwrap();
    assert_eq!(matched.param("id"), Some("7"));
    assert_eq!(matched.param("cvId"), None);
}

#[rstest]
#[case("/nowhere")]
#[case("/jobs/1/2")]
#[case("/employer/cv/")]
#[case("/admin")]
fn test_unknown_paths_do_not_match(#[case] path: &str) {
    assert!(table::match_path(path).is_none());
}

#[test]
fn test_axum_path_uses_brace_captures() {
    let entry = table::match_path("/employer/jobs/1/edit").unwrap().entry;
    assert_eq!(entry.axum_path(), "/employer/jobs/{id}/edit");
}

#[test]
fn test_every_view_has_an_entry() {
    let routed: HashSet<_> = ROUTE_TABLE.iter().map(|entry| entry.view).collect();
    for view in ViewId::ALL {
        assert!(routed.contains(&view), "{view:?} has no route");
    }
}

// --- Deferred views ---

/// Fails the first `failures` loads, then delegates to the built-in views.
struct FlakyLoader {
    failures: usize,
    attempts: AtomicUsize,
}

#[async_trait]
impl ViewLoader for FlakyLoader {
    async fn load(&self, id: ViewId) -> Result<Arc<dyn View>, ViewLoadError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures {
            return Err(ViewLoadError::Failed(id, "chunk fetch failed".to_string()));
        }
        BuiltinViews.load(id).await
    }
}

/// Takes a while to load, so concurrent first navigations overlap.
struct SlowLoader;

#[async_trait]
impl ViewLoader for SlowLoader {
    async fn load(&self, id: ViewId) -> Result<Arc<dyn View>, ViewLoadError> {
        tokio::time::sleep(Duration::from_millis(50)).await;
        BuiltinViews.load(id).await
    }
}

#[tokio::test]
async fn test_view_loads_on_first_navigation_only() {
    let registry = ViewRegistry::builtin();
    assert!(!registry.is_loaded(ViewId::JobList));

    let first = registry.resolve(ViewId::JobList).await.unwrap();
    let second = registry.resolve(ViewId::JobList).await.unwrap();

    assert_eq!(first.id(), ViewId::JobList);
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.load_count(), 1);
    assert!(registry.is_loaded(ViewId::JobList));
    assert!(!registry.is_loaded(ViewId::AdminUsers));
}

#[tokio::test]
async fn test_failed_load_is_not_cached() {
    let registry = ViewRegistry::new(Arc::new(FlakyLoader {
        failures: 1,
        attempts: AtomicUsize::new(0),
    }));

    let err = registry.resolve(ViewId::Profile).await.err().unwrap();
    assert!(matches!(err, ViewLoadError::Failed(ViewId::Profile, _)));
    assert!(!registry.is_loaded(ViewId::Profile));

    registry.resolve(ViewId::Profile).await.unwrap();
    assert!(registry.is_loaded(ViewId::Profile));
    assert_eq!(registry.load_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_first_navigations_share_one_load() {
    let registry = ViewRegistry::new(Arc::new(SlowLoader));

    let (a, b) = tokio::join!(
        registry.resolve(ViewId::EmployerJobs),
        registry.resolve(ViewId::EmployerJobs),
    );

    assert!(a.is_ok() && b.is_ok());
    assert_eq!(registry.load_count(), 1);
}

#[test]
fn test_escape_html() {
    assert_eq!(
        escape_html("<b>\"Tom\" & 'Jerry'</b>"),
        "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
    );
}
