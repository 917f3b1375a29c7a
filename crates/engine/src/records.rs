//! The single record table and its key layout.
//!
//! All entities share one table keyed by `(pk, sk)`. Attributes are sparse:
//! a profile row only fills the profile columns, a budget row only the budget
//! ones, and so on. Consumers tell rows apart by sort-key prefix.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use sea_orm::entity::prelude::*;

use crate::{EngineError, ResultEngine};

pub const USER_PREFIX: &str = "USER#";
pub const PROFILE_SK: &str = "PROFILE";
pub const TRANSACTION_PREFIX: &str = "#TRANSACTION#";
pub const BUDGET_PREFIX: &str = "BUDGET#";

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "records")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub pk: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub sk: String,
    pub user_id: Option<String>,
    pub created_at: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub password_hash: Option<String>,
    pub transaction_id: Option<String>,
    pub kind: Option<String>,
    pub amount_minor: Option<i64>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub source_account: Option<String>,
    pub destination_account: Option<String>,
    pub monthly_limit_minor: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_transaction(&self) -> bool {
        self.sk.starts_with(TRANSACTION_PREFIX)
    }

    pub fn is_budget(&self) -> bool {
        self.sk.starts_with(BUDGET_PREFIX)
    }
}

pub fn user_pk(user_id: &str) -> String {
    format!("{USER_PREFIX}{user_id}")
}

pub fn transaction_sk(transaction_id: &str) -> String {
    format!("{TRANSACTION_PREFIX}{transaction_id}")
}

pub fn budget_sk(category: &str) -> String {
    format!("{BUDGET_PREFIX}{category}")
}

/// The current instant at the precision it is stored with.
pub fn now_millis() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// Render an instant the way `created_at` is stored: UTC, millisecond
/// precision, `Z` suffix. Stored values sort in chronological order.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_timestamp(value: &str) -> ResultEngine<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| EngineError::Internal(format!("invalid stored timestamp: {value}")))
}

/// Fetch a required attribute of a stored row, reporting which one is missing.
pub(crate) fn required<T>(value: Option<T>, label: &str, sk: &str) -> ResultEngine<T> {
    value.ok_or_else(|| EngineError::Internal(format!("record {sk} is missing {label}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn keys_use_expected_prefixes() {
        assert_eq!(user_pk("42"), "USER#42");
        assert_eq!(transaction_sk("txn-1"), "#TRANSACTION#txn-1");
        assert_eq!(budget_sk("Food"), "BUDGET#Food");
    }

    #[test]
    fn timestamps_are_millisecond_zulu() {
        let instant = Utc.with_ymd_and_hms(2025, 3, 7, 9, 5, 1).unwrap();
        let formatted = format_timestamp(instant);
        assert_eq!(formatted, "2025-03-07T09:05:01.000Z");
        assert_eq!(parse_timestamp(&formatted).unwrap(), instant);
    }
}
