use super::token::Claims;

/// Principal recorded on every denied request.
pub const UNAUTHORIZED_PRINCIPAL: &str = "unauthorized";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    Allow,
    Deny,
}

/// Caller identity forwarded to handlers once a credential is accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub role: String,
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.id,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Outcome of guarding a single request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccessPolicy {
    pub principal_id: String,
    pub effect: Effect,
    pub resource: String,
    pub identity: Option<Identity>,
}

impl AccessPolicy {
    pub fn allow(identity: Identity, resource: &str) -> Self {
        Self {
            principal_id: identity.user_id.clone(),
            effect: Effect::Allow,
            resource: resource.to_string(),
            identity: Some(identity),
        }
    }

    pub fn deny(resource: &str) -> Self {
        Self {
            principal_id: UNAUTHORIZED_PRINCIPAL.to_string(),
            effect: Effect::Deny,
            resource: resource.to_string(),
            identity: None,
        }
    }

    pub fn is_allowed(&self) -> bool {
        self.effect == Effect::Allow
    }
}
