//! Wire DTOs for the portal REST API.
//!
//! DESIGN
//! ======
//! The backend tags users with a `role` string and nests role attributes under
//! a per-role key (`student`, `teacher`, `company`). Here that becomes the
//! [`Role`] sum type flattened into [`UserRecord`], so role-specific fields
//! can only be reached through an exhaustive match.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// An authenticated principal as returned by `/auth/login` and `/profile`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Backend user identifier. Some endpoints send it as `user_id`.
    #[serde(alias = "user_id")]
    pub id: i64,
    pub email: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    /// ISO 8601 creation timestamp, if the endpoint includes it.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Set at login when the account still carries a temporary password.
    #[serde(default, skip_serializing_if = "is_false")]
    pub must_change_password: bool,
    #[serde(flatten)]
    pub role: Role,
}

fn default_is_active() -> bool {
    true
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl UserRecord {
    /// Human-readable name, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> String {
        let first = self.first_name.as_deref().map(str::trim).unwrap_or("");
        let last = self.last_name.as_deref().map(str::trim).unwrap_or("");
        match (first.is_empty(), last.is_empty()) {
            (true, true) => self.email.clone(),
            (false, true) => first.to_owned(),
            (true, false) => last.to_owned(),
            (false, false) => format!("{first} {last}"),
        }
    }

    #[must_use]
    pub fn role_kind(&self) -> RoleKind {
        self.role.kind()
    }
}

/// Role variants with their nested attributes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Role {
    Student {
        #[serde(default)]
        student: Option<StudentProfile>,
    },
    Teacher {
        #[serde(default)]
        teacher: Option<TeacherProfile>,
    },
    Company {
        #[serde(default)]
        company: Option<CompanyProfile>,
    },
    Administrator {},
}

impl Role {
    #[must_use]
    pub fn kind(&self) -> RoleKind {
        match self {
            Role::Student { .. } => RoleKind::Student,
            Role::Teacher { .. } => RoleKind::Teacher,
            Role::Company { .. } => RoleKind::Company,
            Role::Administrator {} => RoleKind::Administrator,
        }
    }

    /// Whether this is a teacher flagged as option/programme responsible.
    #[must_use]
    pub fn is_responsible_teacher(&self) -> bool {
        matches!(self, Role::Teacher { teacher: Some(t) } if t.is_responsible)
    }
}

/// Fieldless role discriminant for routing and labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleKind {
    Student,
    Teacher,
    Company,
    Administrator,
}

impl RoleKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            RoleKind::Student => "Student",
            RoleKind::Teacher => "Teacher",
            RoleKind::Company => "Company",
            RoleKind::Administrator => "Administrator",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Master option the student is enrolled in (e.g. `"GL"`, `"IA"`).
    #[serde(default)]
    pub master_option: Option<String>,
    #[serde(default)]
    pub student_number: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TeacherProfile {
    #[serde(default)]
    pub grade: Option<String>,
    /// Responsible teachers validate proposals for their option.
    #[serde(default)]
    pub is_responsible: bool,
    #[serde(default)]
    pub speciality: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// `POST /auth/login` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/login` success body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub user: UserRecord,
    pub token: String,
    #[serde(default)]
    pub must_change_password: bool,
}

/// `GET /profile` and `PUT /profile` success body.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ProfileResponse {
    pub user: UserRecord,
}

/// Partial profile update; absent fields are left untouched server-side.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl ProfileUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none() && self.last_name.is_none() && self.phone.is_none()
    }
}

/// `POST /change-password` body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Generic `{message}` acknowledgement body.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}
