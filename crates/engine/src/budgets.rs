//! Budgets: one monthly spending limit per (user, expense category).

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, ResultEngine,
    records::{self, format_timestamp, parse_timestamp, required},
};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub user_id: String,
    pub category: String,
    pub monthly_limit_minor: i64,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A budget joined with what was spent in its category over the queried period.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetWithSpend {
    #[serde(flatten)]
    pub budget: Budget,
    pub total_spent_minor: i64,
}

impl From<&Budget> for records::ActiveModel {
    fn from(budget: &Budget) -> Self {
        Self {
            pk: ActiveValue::Set(records::user_pk(&budget.user_id)),
            sk: ActiveValue::Set(records::budget_sk(&budget.category)),
            user_id: ActiveValue::Set(Some(budget.user_id.clone())),
            created_at: ActiveValue::Set(Some(format_timestamp(budget.created_at))),
            email: ActiveValue::Set(None),
            name: ActiveValue::Set(None),
            password_hash: ActiveValue::Set(None),
            transaction_id: ActiveValue::Set(None),
            kind: ActiveValue::Set(None),
            amount_minor: ActiveValue::Set(None),
            category: ActiveValue::Set(Some(budget.category.clone())),
            description: ActiveValue::Set(budget.description.clone()),
            source_account: ActiveValue::Set(None),
            destination_account: ActiveValue::Set(None),
            monthly_limit_minor: ActiveValue::Set(Some(budget.monthly_limit_minor)),
        }
    }
}

impl TryFrom<records::Model> for Budget {
    type Error = EngineError;

    fn try_from(model: records::Model) -> ResultEngine<Self> {
        let sk = model.sk;
        let created_at = required(model.created_at, "created_at", &sk)?;
        Ok(Self {
            user_id: required(model.user_id, "user_id", &sk)?,
            category: required(model.category, "category", &sk)?,
            monthly_limit_minor: required(model.monthly_limit_minor, "monthly_limit_minor", &sk)?,
            description: model.description,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}
