use tracing::{debug, error, info, instrument, warn};

use crate::account_actor::AccountError;
use crate::actor_framework::ResourceClient;
use crate::domain::{Identity, IdentityCreate, Profile, ProfileCreate, Role, Session};

/// Password sign-up and sign-in against the identity and profile tables.
#[derive(Clone)]
pub struct AuthClient {
    identities: ResourceClient<Identity>,
    profiles: ResourceClient<Profile>,
}

impl AuthClient {
    pub fn new(identities: ResourceClient<Identity>, profiles: ResourceClient<Profile>) -> Self {
        Self { identities, profiles }
    }

    /// Registers a customer account and returns its signed-in session.
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str, full_name: &str) -> Result<Session, AccountError> {
        let (identity, profile) = self.create_account(email, password, full_name, Role::Customer).await?;
        info!(user_id = %identity.id, "Customer signed up");
        Ok(Session::signed_in(identity.id, identity.email, profile.role))
    }

    /// Creates the first admin. Refused once any admin exists.
    #[instrument(skip(self, password))]
    pub async fn bootstrap_admin(&self, email: &str, password: &str, full_name: &str) -> Result<Session, AccountError> {
        let admins = self.profiles.query(|profile| profile.role == Role::Admin).await?;
        if !admins.is_empty() {
            warn!("Admin bootstrap refused, an admin already exists");
            return Err(AccountError::Forbidden("An admin account already exists".to_string()));
        }
        let (identity, profile) = self.create_account(email, password, full_name, Role::Admin).await?;
        info!(user_id = %identity.id, "Admin account created");
        Ok(Session::signed_in(identity.id, identity.email, profile.role))
    }

    /// An unknown email and a wrong password fail the same way.
    #[instrument(skip(self, password))]
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, AccountError> {
        debug!("Sending request");
        let wanted = Identity::normalize_email(email);
        let identity = self
            .identities
            .query(move |identity| identity.email == wanted)
            .await?
            .into_iter()
            .next()
            .filter(|identity| identity.verify_password(password))
            .ok_or(AccountError::InvalidCredentials)?;

        let profile = self
            .profiles
            .get(identity.id.clone())
            .await?
            .ok_or_else(|| AccountError::NotFound(identity.id.clone()))?;
        info!(user_id = %identity.id, role = ?profile.role, "Signed in");
        Ok(Session::signed_in(identity.id, identity.email, profile.role))
    }

    pub async fn profile(&self, session: &Session) -> Result<Option<Profile>, AccountError> {
        match session.user_id() {
            Some(id) => Ok(self.profiles.get(id.to_string()).await?),
            None => Ok(None),
        }
    }

    /// Identity plus profile. When the profile insert fails the identity is deleted again.
    pub(crate) async fn create_account(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
        role: Role,
    ) -> Result<(Identity, Profile), AccountError> {
        let identity = self
            .identities
            .create(IdentityCreate {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await?;

        let profile = ProfileCreate {
            identity_id: identity.id.clone(),
            full_name: full_name.to_string(),
            email: identity.email.clone(),
            role,
        };
        match self.profiles.create(profile).await {
            Ok(profile) => Ok((identity, profile)),
            Err(e) => {
                warn!(user_id = %identity.id, error = %e, "Profile insert failed, removing identity");
                self.remove_identity(&identity.id).await;
                Err(e.into())
            }
        }
    }

    /// Best-effort delete used for compensation; failures are logged.
    pub(crate) async fn remove_identity(&self, id: &str) {
        if let Err(e) = self.identities.delete(id.to_string()).await {
            error!(user_id = %id, error = %e, "Failed to delete identity");
        }
    }

    pub(crate) async fn remove_profile(&self, id: &str) {
        if let Err(e) = self.profiles.delete(id.to_string()).await {
            error!(user_id = %id, error = %e, "Failed to delete profile");
        }
    }

    pub(crate) fn profiles(&self) -> &ResourceClient<Profile> {
        &self.profiles
    }
}
