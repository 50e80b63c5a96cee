//! Static route table: URL path → (guard requirement, target view).

use serde::Serialize;
use ts_rs::TS;
use utoipa::ToSchema;

/// ViewId
///
/// One identifier per deferred page view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS, ToSchema)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ViewId {
    Login,
    Register,
    Home,
    JobList,
    JobDetail,
    Profile,
    CandidateCv,
    SavedJobs,
    AppliedJobs,
    EmployerDashboard,
    EmployerJobs,
    EmployerJobCreate,
    EmployerJobEdit,
    EmployerCvView,
    EmployerCandidates,
    EmployerInterviews,
    EmployerInterviewDetail,
    SchoolDashboard,
    AdminDashboard,
    AdminJobs,
    AdminUsers,
}

impl ViewId {
    pub const ALL: [ViewId; 21] = [
        ViewId::Login,
        ViewId::Register,
        ViewId::Home,
        ViewId::JobList,
        ViewId::JobDetail,
        ViewId::Profile,
        ViewId::CandidateCv,
        ViewId::SavedJobs,
        ViewId::AppliedJobs,
        ViewId::EmployerDashboard,
        ViewId::EmployerJobs,
        ViewId::EmployerJobCreate,
        ViewId::EmployerJobEdit,
        ViewId::EmployerCvView,
        ViewId::EmployerCandidates,
        ViewId::EmployerInterviews,
        ViewId::EmployerInterviewDetail,
        ViewId::SchoolDashboard,
        ViewId::AdminDashboard,
        ViewId::AdminJobs,
        ViewId::AdminUsers,
    ];

    pub fn title(self) -> &'static str {
        match self {
            ViewId::Login => "Sign in",
            ViewId::Register => "Create an account",
            ViewId::Home => "Home",
            ViewId::JobList => "Jobs",
            ViewId::JobDetail => "Job details",
            ViewId::Profile => "My profile",
            ViewId::CandidateCv => "My CV",
            ViewId::SavedJobs => "Saved jobs",
            ViewId::AppliedJobs => "Applied jobs",
            ViewId::EmployerDashboard => "Employer dashboard",
            ViewId::EmployerJobs => "Job postings",
            ViewId::EmployerJobCreate => "Post a job",
            ViewId::EmployerJobEdit => "Edit job posting",
            ViewId::EmployerCvView => "Candidate CV",
            ViewId::EmployerCandidates => "Candidates",
            ViewId::EmployerInterviews => "Interviews",
            ViewId::EmployerInterviewDetail => "Interview details",
            ViewId::SchoolDashboard => "School dashboard",
            ViewId::AdminDashboard => "Admin dashboard",
            ViewId::AdminJobs => "Manage jobs",
            ViewId::AdminUsers => "Manage users",
        }
    }
}

/// RouteEntry
///
/// Paths use `:name` placeholders for single segments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteEntry {
    pub path: &'static str,
    pub requires_auth: bool,
    pub view: ViewId,
}

const fn public(path: &'static str, view: ViewId) -> RouteEntry {
    RouteEntry {
        path,
        requires_auth: false,
        view,
    }
}

const fn protected(path: &'static str, view: ViewId) -> RouteEntry {
    RouteEntry {
        path,
        requires_auth: true,
        view,
    }
}

/// Path of the login entry point every unauthenticated protected request is sent to.
pub const LOGIN_PATH: &str = "/login";

/// The `/` entry: role redirect for dashboards, home view for everyone else.
pub const ROOT_PATH: &str = "/";

/// ROUTE_TABLE
///
/// Static entries take precedence over parameterized ones because matching is in table
/// order; keep literal paths above `:param` siblings.
pub static ROUTE_TABLE: &[RouteEntry] = &[
    public(LOGIN_PATH, ViewId::Login),
    public("/register", ViewId::Register),
    protected(ROOT_PATH, ViewId::Home),
    protected("/jobs", ViewId::JobList),
    protected("/jobs/:id", ViewId::JobDetail),
    protected("/profile", ViewId::Profile),
    protected("/candidate/cv", ViewId::CandidateCv),
    protected("/candidate/saved-jobs", ViewId::SavedJobs),
    protected("/candidate/applied-jobs", ViewId::AppliedJobs),
    protected("/employer/dashboard", ViewId::EmployerDashboard),
    protected("/employer/jobs", ViewId::EmployerJobs),
    protected("/employer/jobs/create", ViewId::EmployerJobCreate),
    protected("/employer/jobs/:id/edit", ViewId::EmployerJobEdit),
    protected("/employer/cv/:cvId", ViewId::EmployerCvView),
    protected("/employer/candidates", ViewId::EmployerCandidates),
    protected("/employer/interviews", ViewId::EmployerInterviews),
    protected("/employer/interviews/:id", ViewId::EmployerInterviewDetail),
    protected("/school/dashboard", ViewId::SchoolDashboard),
    protected("/admin/dashboard", ViewId::AdminDashboard),
    protected("/admin/jobs", ViewId::AdminJobs),
    protected("/admin/users", ViewId::AdminUsers),
];

/// RouteMatch
///
/// A table entry together with the values captured by its `:param` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    pub entry: &'static RouteEntry,
    pub params: Vec<(&'static str, String)>,
}

impl RouteMatch {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.as_str())
    }
}

impl RouteEntry {
    /// The same path in axum's `{name}` capture syntax.
    pub fn axum_path(&self) -> String {
        self.path
            .split('/')
            .map(|segment| match segment.strip_prefix(':') {
                Some(name) => format!("{{{name}}}"),
                None => segment.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    fn capture(&'static self, path: &str) -> Option<RouteMatch> {
        let mut pattern = self.path.split('/');
        let mut actual = path.split('/');
        let mut params = Vec::new();

        loop {
            match (pattern.next(), actual.next()) {
                (None, None) => return Some(RouteMatch { entry: self, params }),
                (Some(expected), Some(segment)) => match expected.strip_prefix(':') {
                    Some(name) if !segment.is_empty() => params.push((name, segment.to_string())),
                    Some(_) => return None,
                    None if expected == segment => {}
                    None => return None,
                },
                _ => return None,
            }
        }
    }
}

/// match_path
///
/// First table entry whose segments match `path`. A single trailing slash is ignored,
/// except on the root path itself.
pub fn match_path(path: &str) -> Option<RouteMatch> {
    let normalized = match path.strip_suffix('/') {
        Some(trimmed) if !trimmed.is_empty() => trimmed,
        _ => path,
    };
    ROUTE_TABLE.iter().find_map(|entry| entry.capture(normalized))
}

/// Entries the router registers behind the route guard.
pub fn protected_entries() -> impl Iterator<Item = &'static RouteEntry> {
    ROUTE_TABLE.iter().filter(|entry| entry.requires_auth)
}

/// Entries reachable without a session.
pub fn public_entries() -> impl Iterator<Item = &'static RouteEntry> {
    ROUTE_TABLE.iter().filter(|entry| !entry.requires_auth)
}
