use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Plain confirmation body returned by most write endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterUser {
        pub name: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginUser {
        pub email: String,
        pub password: String,
    }

    /// Public view of a profile (never carries the password hash).
    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: String,
        pub name: String,
        pub email: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub message: String,
        pub user: UserView,
        /// Signed credential, also set as the `authToken` cookie.
        pub token: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionResponse {
        pub message: String,
        pub user_id: String,
        /// Expiry as seconds since the Unix epoch.
        pub expires_at: i64,
    }
}

pub mod transaction {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum TransactionKind {
        Expense,
        Income,
        Transfer,
    }

    /// Body of `POST /transactions`. Validated against the transaction schema
    /// before being decoded into this type.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub user_id: String,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub category: String,
        pub description: String,
        pub source_account: Option<String>,
        pub destination_account: Option<String>,
    }

    /// Body of `PATCH /transactions`.
    ///
    /// Only the listed fields can be patched; anything else is rejected.
    #[derive(Debug, Serialize, Deserialize)]
    #[serde(deny_unknown_fields)]
    pub struct TransactionPatch {
        pub user_id: String,
        pub transaction_id: String,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub amount_minor: Option<i64>,
        pub category: Option<String>,
        pub description: Option<String>,
        pub source_account: Option<String>,
        pub destination_account: Option<String>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionQuery {
        pub user_id: Option<String>,
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub year: Option<i32>,
        pub month: Option<u32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionDelete {
        pub user_id: Option<String>,
        pub transaction_id: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub transaction_id: String,
        pub user_id: String,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub amount_minor: i64,
        pub category: String,
        pub description: String,
        pub created_at: DateTime<Utc>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub source_account: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub destination_account: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
        /// Sum of `income` amounts in `transactions`.
        pub total_income_minor: i64,
        /// Sum of `expense` amounts in `transactions`.
        pub total_expense_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionCreated {
        pub message: String,
        pub transaction_id: String,
        pub created_at: DateTime<Utc>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub user_id: String,
        pub category: String,
        pub monthly_limit_minor: i64,
        pub description: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetUpdate {
        pub user_id: String,
        pub category: String,
        pub monthly_limit_minor: i64,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetQuery {
        pub user_id: Option<String>,
        pub year: Option<i32>,
        pub month: Option<u32>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct BudgetDelete {
        pub user_id: Option<String>,
        pub category: Option<String>,
    }

    /// A budget joined with what was spent in its category for the period.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub user_id: String,
        pub category: String,
        pub monthly_limit_minor: i64,
        pub description: Option<String>,
        pub created_at: DateTime<Utc>,
        pub total_spent_minor: i64,
    }
}

pub mod analytics {
    use super::*;
    use crate::transaction::TransactionKind;

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct AnalyticsQuery {
        pub user_id: Option<String>,
        /// Defaults to `expense`.
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
        pub year: Option<i32>,
        pub month: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryShare {
        pub name: String,
        pub amount_minor: i64,
        /// Share of the total, rounded to two decimals.
        pub percentage: f64,
        pub color: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AnalyticsResponse {
        pub categories: Vec<CategoryShare>,
        pub total_minor: i64,
    }
}
