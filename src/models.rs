use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Identity & Profile ---

/// Role
///
/// The RBAC field carried by a profile. Values outside the four known roles are kept as
/// `Unrecognized` instead of failing deserialization, so a stray row degrades to the
/// default (candidate) branch everywhere roles are dispatched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    Candidate,
    Employer,
    School,
    Admin,
    Unrecognized,
}

impl Role {
    /// Maps a raw role label onto the enumeration. Never fails.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "candidate" => Role::Candidate,
            "employer" => Role::Employer,
            "school" => Role::School,
            "admin" => Role::Admin,
            _ => Role::Unrecognized,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Candidate => "candidate",
            Role::Employer => "employer",
            Role::School => "school",
            Role::Admin => "admin",
            Role::Unrecognized => "unrecognized",
        }
    }

    /// Roles a visitor may pick for themselves on the registration form.
    pub fn is_self_assignable(self) -> bool {
        matches!(self, Role::Candidate | Role::Employer | Role::School)
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::from_label(&raw))
    }
}

/// UserIdentity
///
/// The authenticated identity issued by the identity provider (`auth.users`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct UserIdentity {
    pub id: Uuid,
    pub email: String,
}

/// Profile
///
/// Role and display metadata stored in the `public.profiles` table, keyed by the identity id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct Profile {
    pub id: Uuid,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<Role>,
}

impl Profile {
    /// Name shown on the user menu trigger: full name, then email, then a generic label.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or("Account")
    }
}

// --- Request Payloads ---

/// SignInRequest
///
/// Input payload for `POST /auth/sign-in`. The password is forwarded to the identity
/// provider and never logged.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignInRequest {
    #[schema(example = "jane@example.com")]
    pub email: String,
    pub password: String,
}

/// SignUpRequest
///
/// Input payload for `POST /auth/sign-up`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

// --- Output Schemas ---

/// SessionView
///
/// The session as exposed to the front end (`GET /auth/session`, sign-in/up responses).
/// `submitting` mirrors the form's `loading` flag: while true the submit control stays disabled.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SessionView {
    pub resolving: bool,
    pub authenticated: bool,
    pub submitting: bool,
    pub identity: Option<UserIdentity>,
    pub profile: Option<Profile>,
    /// Landing path for the resolved role; absent while resolving or anonymous.
    pub landing: Option<String>,
}

/// SignUpResponse
///
/// Sign-up either signs the user straight in or waits for email confirmation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct SignUpResponse {
    pub confirmation_required: bool,
    pub session: SessionView,
}
