use chrono::Utc;

use crate::{
    EngineError, ResultEngine,
    auth::{AccessPolicy, Identity},
};

use super::Engine;

impl Engine {
    /// Turn a presented credential into an allow or deny policy for `resource`.
    ///
    /// Every failure (missing, malformed, forged or expired credential) is a
    /// deny; the reason is only logged.
    pub fn authorize(&self, credential: Option<&str>, resource: &str) -> AccessPolicy {
        let Some(token) = credential.map(str::trim).filter(|t| !t.is_empty()) else {
            tracing::debug!(resource, "no credential presented");
            return AccessPolicy::deny(resource);
        };

        match self.tokens.verify(token, Utc::now()) {
            Ok(claims) => AccessPolicy::allow(Identity::from(claims), resource),
            Err(err) => {
                tracing::debug!(resource, "credential rejected: {err}");
                AccessPolicy::deny(resource)
            }
        }
    }

    /// Fail unless `identity` is acting on its own records.
    pub fn ensure_owner(&self, identity: &Identity, user_id: &str) -> ResultEngine<()> {
        if identity.user_id != user_id {
            tracing::warn!(
                principal = %identity.user_id,
                user_id,
                "cross-user access refused"
            );
            return Err(EngineError::Forbidden(
                "cannot act on another user's records".to_string(),
            ));
        }
        Ok(())
    }
}
