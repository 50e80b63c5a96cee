use std::str::FromStr;

use crate::models::Role;

/// AccessPolicy
///
/// Decides whether an authenticated role may open a protected path.
///
/// `Permissive` lets any authenticated role reach any protected path by URL and leaves
/// authorization to the backend. `RoleScoped` restricts each role-owned section
/// (`/admin`, `/employer`, `/school`, `/candidate`) to its role; admins may enter all of
/// them and unprefixed paths stay shared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccessPolicy {
    #[default]
    Permissive,
    RoleScoped,
}

impl FromStr for AccessPolicy {
    type Err = ();

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "permissive" => Ok(AccessPolicy::Permissive),
            "role-scoped" | "role_scoped" => Ok(AccessPolicy::RoleScoped),
            _ => Err(()),
        }
    }
}

impl AccessPolicy {
    pub fn allows(self, role: Option<Role>, path: &str) -> bool {
        match self {
            AccessPolicy::Permissive => true,
            AccessPolicy::RoleScoped => section_allows(role, path),
        }
    }
}

fn section_allows(role: Option<Role>, path: &str) -> bool {
    let section = path.trim_start_matches('/').split('/').next().unwrap_or_default();
    match (section, role) {
        (_, Some(Role::Admin)) => true,
        ("admin", _) => false,
        ("employer", Some(Role::Employer)) => true,
        ("employer", _) => false,
        ("school", Some(Role::School)) => true,
        ("school", _) => false,
        ("candidate", Some(Role::Candidate) | Some(Role::Unrecognized) | None) => true,
        ("candidate", _) => false,
        _ => true,
    }
}
