use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine,
    auth::{hash_password, verify_password},
    records,
    users::{User, UserProfile},
};

use super::{Engine, normalize_required};

/// A profile together with the credential issued for it.
#[derive(Clone, Debug)]
pub struct Registration {
    pub user: UserProfile,
    pub token: String,
}

/// What a valid credential says about its holder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl Engine {
    /// Create a profile and sign the caller in.
    ///
    /// The email is looked up first for a friendly conflict; the unique
    /// email index still rejects a concurrent duplicate.
    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ResultEngine<Registration> {
        let name = normalize_required(name, "name")?;
        let email = normalize_required(email, "email")?;
        if password.is_empty() {
            return Err(EngineError::Validation(
                "password must not be empty".to_string(),
            ));
        }

        if self.store.find_by_email(&email).await?.is_some() {
            return Err(EngineError::ExistingKey("user".to_string()));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            name,
            email,
            password_hash: hash_password(password)?,
            created_at: records::now_millis(),
        };
        self.store
            .put_if_absent(records::ActiveModel::from(&user), "user")
            .await?;
        tracing::info!(user_id = %user.id, "user registered");

        self.sign_in(&user)
    }

    pub async fn login(&self, email: &str, password: &str) -> ResultEngine<Registration> {
        let email = normalize_required(email, "email")?;
        let model = self
            .store
            .find_by_email(&email)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user".to_string()))?;
        let user = User::try_from(model)?;

        if !verify_password(password, &user.password_hash)? {
            tracing::info!(user_id = %user.id, "login refused");
            return Err(EngineError::Unauthorized("invalid password".to_string()));
        }
        self.sign_in(&user)
    }

    /// Decode a credential into its session, rejecting anything expired.
    pub fn session(&self, token: &str) -> ResultEngine<Session> {
        let now = Utc::now();
        let claims = self.tokens.verify(token, now)?;
        if claims.exp < now.timestamp() {
            return Err(EngineError::Unauthorized("token expired".to_string()));
        }
        let expires_at = Utc
            .timestamp_opt(claims.exp, 0)
            .single()
            .ok_or_else(|| EngineError::Unauthorized("invalid token expiry".to_string()))?;
        Ok(Session {
            user_id: claims.id,
            expires_at,
        })
    }

    /// Load the profile of `user_id`, failing with `KeyNotFound` when the
    /// user does not exist.
    pub async fn validate_user(&self, user_id: &str) -> ResultEngine<User> {
        let model = self
            .store
            .get(&records::user_pk(user_id), records::PROFILE_SK)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user".to_string()))?;
        User::try_from(model)
    }

    fn sign_in(&self, user: &User) -> ResultEngine<Registration> {
        let token = self.tokens.issue(&user.id, &user.email, Utc::now())?;
        Ok(Registration {
            user: UserProfile::from(user),
            token,
        })
    }
}
