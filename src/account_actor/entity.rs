use chrono::Utc;
use uuid::Uuid;

use crate::actor_framework::Entity;
use crate::domain::{
    digest_password, Identity, IdentityCreate, Profile, ProfileCreate, ProfilePatch, StaffCreate, StaffMember,
    StaffPatch,
};

const MIN_PASSWORD_LEN: usize = 6;

impl Entity for Identity {
    type Id = String;
    type CreateParams = IdentityCreate;
    type Patch = ();
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "identities";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: IdentityCreate) -> Result<Self, String> {
        let email = Identity::normalize_email(&params.email);
        if !email.contains('@') {
            return Err(format!("Invalid email: {}", email));
        }
        if params.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(format!("Password must be at least {} characters", MIN_PASSWORD_LEN));
        }
        let salt = Uuid::new_v4().simple().to_string();
        let password_digest = digest_password(&salt, &params.password);
        Ok(Self {
            id,
            email,
            salt,
            password_digest,
            created_at: Utc::now(),
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}

impl Entity for Profile {
    type Id = String;
    type CreateParams = ProfileCreate;
    type Patch = ProfilePatch;
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "profiles";

    fn id(&self) -> &String {
        &self.id
    }

    /// Profiles are keyed by their identity, so the generated ID is unused.
    fn from_create_params(_id: String, params: ProfileCreate) -> Result<Self, String> {
        let full_name = params.full_name.trim();
        if full_name.is_empty() {
            return Err("Full name is required".to_string());
        }
        Ok(Self {
            id: params.identity_id,
            full_name: full_name.to_string(),
            email: Identity::normalize_email(&params.email),
            role: params.role,
        })
    }

    fn on_update(&mut self, patch: ProfilePatch) -> Result<(), String> {
        if let Some(full_name) = patch.full_name {
            if full_name.trim().is_empty() {
                return Err("Full name is required".to_string());
            }
            self.full_name = full_name.trim().to_string();
        }
        if let Some(role) = patch.role {
            self.role = role;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}

impl Entity for StaffMember {
    type Id = String;
    type CreateParams = StaffCreate;
    type Patch = StaffPatch;
    type Action = ();
    type ActionResult = ();

    const TABLE: &'static str = "staff";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create_params(id: String, params: StaffCreate) -> Result<Self, String> {
        if params.position.trim().is_empty() {
            return Err("Position is required".to_string());
        }
        Ok(Self {
            id,
            profile_id: params.profile_id,
            position: params.position.trim().to_string(),
            active: true,
            hired_at: Utc::now(),
        })
    }

    // One staff row per profile.
    fn unique_key(&self) -> Option<String> {
        Some(self.profile_id.clone())
    }

    fn on_update(&mut self, patch: StaffPatch) -> Result<(), String> {
        if let Some(position) = patch.position {
            if position.trim().is_empty() {
                return Err("Position is required".to_string());
            }
            self.position = position.trim().to_string();
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}
