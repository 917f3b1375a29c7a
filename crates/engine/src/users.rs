//! User profiles, stored as `(USER#<id>, PROFILE)`.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue;
use serde::Serialize;

use crate::{
    EngineError,
    records::{self, format_timestamp, parse_timestamp, required},
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// The part of a profile that is safe to hand back to callers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

impl From<&User> for records::ActiveModel {
    fn from(user: &User) -> Self {
        Self {
            pk: ActiveValue::Set(records::user_pk(&user.id)),
            sk: ActiveValue::Set(records::PROFILE_SK.to_string()),
            user_id: ActiveValue::Set(None),
            created_at: ActiveValue::Set(Some(format_timestamp(user.created_at))),
            email: ActiveValue::Set(Some(user.email.clone())),
            name: ActiveValue::Set(Some(user.name.clone())),
            password_hash: ActiveValue::Set(Some(user.password_hash.clone())),
            transaction_id: ActiveValue::Set(None),
            kind: ActiveValue::Set(None),
            amount_minor: ActiveValue::Set(None),
            category: ActiveValue::Set(None),
            description: ActiveValue::Set(None),
            source_account: ActiveValue::Set(None),
            destination_account: ActiveValue::Set(None),
            monthly_limit_minor: ActiveValue::Set(None),
        }
    }
}

impl TryFrom<records::Model> for User {
    type Error = EngineError;

    fn try_from(model: records::Model) -> Result<Self, Self::Error> {
        let sk = model.sk;
        let id = model
            .pk
            .strip_prefix(records::USER_PREFIX)
            .map(ToString::to_string)
            .ok_or_else(|| EngineError::Internal(format!("profile key {} is malformed", model.pk)))?;
        let created_at = required(model.created_at, "created_at", &sk)?;
        Ok(Self {
            id,
            name: required(model.name, "name", &sk)?,
            email: required(model.email, "email", &sk)?,
            password_hash: required(model.password_hash, "password_hash", &sk)?,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}
