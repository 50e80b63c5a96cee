//! Role router: which screen a resolved profile lands on.

use crate::{
    models::{Profile, Role},
    routes::table::ViewId,
};

/// LandingView
///
/// The four landing screens. Everything that is not admin, employer or school shares the
/// default home view, which is rendered in place at `/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LandingView {
    AdminDashboard,
    EmployerDashboard,
    SchoolDashboard,
    Home,
}

impl LandingView {
    pub fn path(self) -> &'static str {
        match self {
            LandingView::AdminDashboard => "/admin/dashboard",
            LandingView::EmployerDashboard => "/employer/dashboard",
            LandingView::SchoolDashboard => "/school/dashboard",
            LandingView::Home => "/",
        }
    }

    pub fn view(self) -> ViewId {
        match self {
            LandingView::AdminDashboard => ViewId::AdminDashboard,
            LandingView::EmployerDashboard => ViewId::EmployerDashboard,
            LandingView::SchoolDashboard => ViewId::SchoolDashboard,
            LandingView::Home => ViewId::Home,
        }
    }

    /// Whether reaching this landing from `/` needs a redirect.
    pub fn redirects(self) -> bool {
        self != LandingView::Home
    }
}

/// landing_for
///
/// Total over the role enumeration: a missing profile, a missing role, `candidate` and
/// `unrecognized` all take the default branch. Only call with a resolved session.
pub fn landing_for(profile: Option<&Profile>) -> LandingView {
    landing_for_role(profile.and_then(|profile| profile.role))
}

pub fn landing_for_role(role: Option<Role>) -> LandingView {
    match role {
        Some(Role::Admin) => LandingView::AdminDashboard,
        Some(Role::Employer) => LandingView::EmployerDashboard,
        Some(Role::School) => LandingView::SchoolDashboard,
        Some(Role::Candidate) | Some(Role::Unrecognized) | None => LandingView::Home,
    }
}
