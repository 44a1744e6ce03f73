use std::collections::HashMap;

use tracing::{debug, error, info, instrument, warn};

use crate::account_actor::AccountError;
use crate::actor_framework::ResourceClient;
use crate::clients::AuthClient;
use crate::domain::{
    ActivityCreate, NewStaffAccount, ProfilePatch, Session, StaffAccount, StaffAccountPatch, StaffCreate, StaffMember,
    StaffPatch,
};
use crate::effects::{BackgroundEffect, EffectClient};

/// Privileged staff-account management. Every write requires an admin session and
/// leaves an activity-log entry.
#[derive(Clone)]
pub struct StaffClient {
    auth: AuthClient,
    staff: ResourceClient<StaffMember>,
    effects: EffectClient,
}

impl StaffClient {
    pub fn new(auth: AuthClient, staff: ResourceClient<StaffMember>, effects: EffectClient) -> Self {
        Self { auth, staff, effects }
    }

    /// Identity, then profile, then staff row. A failed step deletes whatever the
    /// earlier steps created.
    #[instrument(skip(self, session), fields(admin = ?session.user_id()))]
    pub async fn create_staff(&self, session: &Session, account: NewStaffAccount) -> Result<StaffAccount, AccountError> {
        require_admin(session)?;
        if !account.role.is_staff() {
            return Err(AccountError::ValidationError(format!(
                "Staff accounts need a staff or admin role, got {:?}",
                account.role
            )));
        }

        let (identity, profile) = self
            .auth
            .create_account(&account.email, &account.password, &account.full_name, account.role)
            .await?;

        let staff = match self
            .staff
            .create(StaffCreate {
                profile_id: profile.id.clone(),
                position: account.position,
            })
            .await
        {
            Ok(staff) => staff,
            Err(e) => {
                warn!(user_id = %identity.id, error = %e, "Staff insert failed, rolling back account");
                self.auth.remove_profile(&profile.id).await;
                self.auth.remove_identity(&identity.id).await;
                return Err(e.into());
            }
        };

        info!(staff_id = %staff.id, "Staff account created");
        self.log(session, "staff.create", format!("{} ({})", profile.full_name, staff.position))
            .await;
        Ok(StaffAccount { profile, staff })
    }

    #[instrument(skip(self, session), fields(admin = ?session.user_id()))]
    pub async fn update_staff(
        &self,
        session: &Session,
        staff_id: String,
        patch: StaffAccountPatch,
    ) -> Result<StaffAccount, AccountError> {
        require_admin(session)?;
        let current = self.find_staff(&staff_id).await?;

        let profile = if patch.full_name.is_some() || patch.role.is_some() {
            let profile_patch = ProfilePatch {
                full_name: patch.full_name,
                role: patch.role,
            };
            self.auth.profiles().update(current.profile_id.clone(), profile_patch).await?
        } else {
            self.auth
                .profiles()
                .get(current.profile_id.clone())
                .await?
                .ok_or_else(|| AccountError::NotFound(current.profile_id.clone()))?
        };

        let staff = if patch.position.is_some() || patch.active.is_some() {
            let staff_patch = StaffPatch {
                position: patch.position,
                active: patch.active,
            };
            self.staff.update(staff_id, staff_patch).await?
        } else {
            current
        };

        info!(staff_id = %staff.id, "Staff account updated");
        self.log(session, "staff.update", profile.full_name.clone()).await;
        Ok(StaffAccount { profile, staff })
    }

    /// Removes the staff row, the profile and the identity, in that order.
    #[instrument(skip(self, session), fields(admin = ?session.user_id()))]
    pub async fn delete_staff(&self, session: &Session, staff_id: String) -> Result<(), AccountError> {
        require_admin(session)?;
        let staff = self.find_staff(&staff_id).await?;
        if session.user_id() == Some(staff.profile_id.as_str()) {
            return Err(AccountError::Forbidden("Admins cannot delete themselves".to_string()));
        }
        self.staff.delete(staff_id).await?;
        if let Err(e) = self.auth.profiles().delete(staff.profile_id.clone()).await {
            error!(user_id = %staff.profile_id, error = %e, "Staff row removed but profile delete failed");
            return Err(e.into());
        }
        self.auth.remove_identity(&staff.profile_id).await;

        info!(staff_id = %staff.id, "Staff account deleted");
        self.log(session, "staff.delete", staff.profile_id).await;
        Ok(())
    }

    /// Staff rows joined with their profiles. Rows without a profile are skipped.
    #[instrument(skip(self))]
    pub async fn list_staff(&self) -> Result<Vec<StaffAccount>, AccountError> {
        debug!("Sending request");
        let rows = self.staff.list().await?;
        let mut profiles: HashMap<_, _> = self
            .auth
            .profiles()
            .query(|profile| profile.role.is_staff())
            .await?
            .into_iter()
            .map(|profile| (profile.id.clone(), profile))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|staff| {
                let profile = profiles.remove(&staff.profile_id);
                if profile.is_none() {
                    warn!(staff_id = %staff.id, "Staff row without a profile");
                }
                profile.map(|profile| StaffAccount { profile, staff })
            })
            .collect())
    }

    async fn find_staff(&self, staff_id: &str) -> Result<StaffMember, AccountError> {
        self.staff
            .get(staff_id.to_string())
            .await?
            .ok_or_else(|| AccountError::NotFound(staff_id.to_string()))
    }

    async fn log(&self, session: &Session, action: &str, detail: String) {
        self.effects
            .enqueue(BackgroundEffect::LogActivity(ActivityCreate::new(session.user_id(), action, detail)))
            .await;
    }
}

fn require_admin(session: &Session) -> Result<(), AccountError> {
    if !session.is_admin() {
        return Err(AccountError::Forbidden("Admin role required".to_string()));
    }
    Ok(())
}
