use serde::Serialize;

use crate::models::Role;

/// MenuItem
///
/// A link inside a dropdown panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MenuItem {
    pub label: &'static str,
    pub path: &'static str,
}

/// DropdownSpec
///
/// Static description of one hover dropdown: trigger label and panel links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DropdownSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub items: &'static [MenuItem],
}

const fn item(label: &'static str, path: &'static str) -> MenuItem {
    MenuItem { label, path }
}

const ADMIN_MENU: &[DropdownSpec] = &[
    DropdownSpec {
        id: "admin-manage",
        label: "Management",
        items: &[
            item("Dashboard", "/admin/dashboard"),
            item("Jobs", "/admin/jobs"),
            item("Users", "/admin/users"),
        ],
    },
    DropdownSpec {
        id: "admin-browse",
        label: "Browse",
        items: &[item("All jobs", "/jobs")],
    },
];

const EMPLOYER_MENU: &[DropdownSpec] = &[
    DropdownSpec {
        id: "employer-jobs",
        label: "Recruitment",
        items: &[
            item("Dashboard", "/employer/dashboard"),
            item("My job postings", "/employer/jobs"),
            item("Post a job", "/employer/jobs/create"),
        ],
    },
    DropdownSpec {
        id: "employer-candidates",
        label: "Candidates",
        items: &[
            item("Candidates", "/employer/candidates"),
            item("Interviews", "/employer/interviews"),
        ],
    },
];

const SCHOOL_MENU: &[DropdownSpec] = &[DropdownSpec {
    id: "school-main",
    label: "School",
    items: &[
        item("Dashboard", "/school/dashboard"),
        item("Jobs", "/jobs"),
    ],
}];

const CANDIDATE_MENU: &[DropdownSpec] = &[
    DropdownSpec {
        id: "candidate-jobs",
        label: "Jobs",
        items: &[
            item("Find jobs", "/jobs"),
            item("Saved jobs", "/candidate/saved-jobs"),
            item("Applied jobs", "/candidate/applied-jobs"),
        ],
    },
    DropdownSpec {
        id: "candidate-cv",
        label: "My CV",
        items: &[item("Manage CV", "/candidate/cv")],
    },
];

/// MenuVariant
///
/// Which set of dropdowns the navigation bar renders. Chosen once per render from the
/// profile role; unset and unrecognized roles share the candidate variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuVariant {
    Admin,
    Employer,
    School,
    Candidate,
}

impl MenuVariant {
    pub fn for_role(role: Option<Role>) -> Self {
        match role {
            Some(Role::Admin) => MenuVariant::Admin,
            Some(Role::Employer) => MenuVariant::Employer,
            Some(Role::School) => MenuVariant::School,
            Some(Role::Candidate) | Some(Role::Unrecognized) | None => MenuVariant::Candidate,
        }
    }

    pub fn dropdowns(self) -> &'static [DropdownSpec] {
        match self {
            MenuVariant::Admin => ADMIN_MENU,
            MenuVariant::Employer => EMPLOYER_MENU,
            MenuVariant::School => SCHOOL_MENU,
            MenuVariant::Candidate => CANDIDATE_MENU,
        }
    }
}
