use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Staff,
    Admin,
}

impl Role {
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Staff | Role::Admin)
    }
}

/// Login credentials. Only a salted digest of the password is kept.
#[derive(Clone, PartialEq)]
pub struct Identity {
    pub id: String,
    pub email: String,
    pub salt: String,
    pub password_digest: String,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn normalize_email(email: &str) -> String {
        email.trim().to_lowercase()
    }

    pub fn verify_password(&self, password: &str) -> bool {
        digest_password(&self.salt, password) == self.password_digest
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
pub struct IdentityCreate {
    pub email: String,
    pub password: String,
}

// Keeps passwords out of `#[instrument]` output.
impl fmt::Debug for IdentityCreate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCreate")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

pub fn digest_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Public profile attached 1:1 to an identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

/// The profile ID is the identity ID it belongs to.
#[derive(Debug, Clone)]
pub struct ProfileCreate {
    pub identity_id: String,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub role: Option<Role>,
}

/// Employment record of a staff account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: String,
    pub profile_id: String,
    pub position: String,
    pub active: bool,
    pub hired_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StaffCreate {
    pub profile_id: String,
    pub position: String,
}

#[derive(Debug, Clone, Default)]
pub struct StaffPatch {
    pub position: Option<String>,
    pub active: Option<bool>,
}

/// Input of the privileged staff-account creation.
#[derive(Clone)]
pub struct NewStaffAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub position: String,
    pub role: Role,
}

impl fmt::Debug for NewStaffAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewStaffAccount")
            .field("email", &self.email)
            .field("full_name", &self.full_name)
            .field("position", &self.position)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StaffAccountPatch {
    pub full_name: Option<String>,
    pub role: Option<Role>,
    pub position: Option<String>,
    pub active: Option<bool>,
}

/// Joined view of a staff member and their profile.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffAccount {
    pub profile: Profile,
    pub staff: StaffMember,
}

/// The caller's authentication state, passed explicitly into every operation that needs it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    user: Option<SessionUser>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub role: Role,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user: None }
    }

    pub fn signed_in(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            user: Some(SessionUser {
                id: id.into(),
                email: email.into(),
                role,
            }),
        }
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|user| user.id.as_str())
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_digest_depends_on_salt() {
        assert_eq!(digest_password("a", "secret"), digest_password("a", "secret"));
        assert_ne!(digest_password("a", "secret"), digest_password("b", "secret"));
        assert_eq!(digest_password("a", "secret").len(), 64);
    }

    #[test]
    fn debug_output_hides_passwords() {
        let create = IdentityCreate { email: "a@b.c".into(), password: "hunter2".into() };
        assert!(!format!("{:?}", create).contains("hunter2"));
    }

    #[test]
    fn anonymous_session_has_no_user() {
        let session = Session::anonymous();
        assert_eq!(session.user_id(), None);
        assert!(!session.is_admin());
        assert!(Session::signed_in("u1", "a@b.c", Role::Admin).is_admin());
    }
}
