//! Transaction primitives.
//!
//! A `Transaction` is a single money movement recorded under its owner's
//! partition as `#TRANSACTION#<id>`.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    EngineError,
    records::{self, format_timestamp, parse_timestamp, required},
};

pub const TRANSACTION_ID_PREFIX: &str = "txn-";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Income,
    Transfer,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Expense => "expense",
            Self::Income => "income",
            Self::Transfer => "transfer",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            "transfer" => Ok(Self::Transfer),
            other => Err(EngineError::Validation(format!(
                "invalid transaction type: {other}"
            ))),
        }
    }
}

pub fn new_transaction_id() -> String {
    format!("{TRANSACTION_ID_PREFIX}{}", Uuid::new_v4())
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    pub user_id: String,
    pub kind: TransactionKind,
    pub amount_minor: i64,
    pub category: String,
    pub description: String,
    pub source_account: Option<String>,
    pub destination_account: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for records::ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            pk: ActiveValue::Set(records::user_pk(&tx.user_id)),
            sk: ActiveValue::Set(records::transaction_sk(&tx.transaction_id)),
            user_id: ActiveValue::Set(Some(tx.user_id.clone())),
            created_at: ActiveValue::Set(Some(format_timestamp(tx.created_at))),
            email: ActiveValue::Set(None),
            name: ActiveValue::Set(None),
            password_hash: ActiveValue::Set(None),
            transaction_id: ActiveValue::Set(Some(tx.transaction_id.clone())),
            kind: ActiveValue::Set(Some(tx.kind.as_str().to_string())),
            amount_minor: ActiveValue::Set(Some(tx.amount_minor)),
            category: ActiveValue::Set(Some(tx.category.clone())),
            description: ActiveValue::Set(Some(tx.description.clone())),
            source_account: ActiveValue::Set(tx.source_account.clone()),
            destination_account: ActiveValue::Set(tx.destination_account.clone()),
            monthly_limit_minor: ActiveValue::Set(None),
        }
    }
}

impl TryFrom<records::Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: records::Model) -> Result<Self, Self::Error> {
        let sk = model.sk;
        let kind = required(model.kind, "kind", &sk)?;
        let created_at = required(model.created_at, "created_at", &sk)?;
        Ok(Self {
            transaction_id: required(model.transaction_id, "transaction_id", &sk)?,
            user_id: required(model.user_id, "user_id", &sk)?,
            kind: TransactionKind::try_from(kind.as_str())
                .map_err(|_| EngineError::Internal(format!("record {sk} has kind {kind}")))?,
            amount_minor: required(model.amount_minor, "amount_minor", &sk)?,
            category: required(model.category, "category", &sk)?,
            description: model.description.unwrap_or_default(),
            source_account: model.source_account,
            destination_account: model.destination_account,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::TryIntoModel;

    #[test]
    fn ids_carry_prefix() {
        let id = new_transaction_id();
        assert!(id.starts_with(TRANSACTION_ID_PREFIX));
        assert_ne!(id, new_transaction_id());
    }

    #[test]
    fn kind_parses_known_values_only() {
        assert_eq!(
            TransactionKind::try_from("transfer").unwrap(),
            TransactionKind::Transfer
        );
        assert!(TransactionKind::try_from("refund").is_err());
    }

    #[test]
    fn record_conversion_keeps_fields() {
        let tx = Transaction {
            transaction_id: "txn-1".to_string(),
            user_id: "u-1".to_string(),
            kind: TransactionKind::Expense,
            amount_minor: 1250,
            category: "Food".to_string(),
            description: "lunch".to_string(),
            source_account: Some("card".to_string()),
            destination_account: None,
            created_at: Utc.with_ymd_and_hms(2025, 4, 2, 12, 0, 0).unwrap(),
        };
        let active = records::ActiveModel::from(&tx);
        let model = active.try_into_model().unwrap();
        assert_eq!(model.sk, "#TRANSACTION#txn-1");
        assert_eq!(model.created_at.as_deref(), Some("2025-04-02T12:00:00.000Z"));
        assert_eq!(Transaction::try_from(model).unwrap(), tx);
    }
}
